//! Decode, dedup and forward behavior for individual events.

use super::harness::{epc, RecordingConnector};
use crate::error::DecodeError;
use crate::orchestrator::{Disposition, RelayStats};
use crate::scanner::ScanEvent;
use relay_link::SendOutcome;

#[tokio::test]
async fn first_read_is_forwarded() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    let result = relay.handle(ScanEvent::at(epc("0001"), 100.0)).await;

    assert_eq!(result, Disposition::Forwarded(SendOutcome::Sent { count: 1 }));
    assert_eq!(conn.sent(), vec!["0001"]);
    assert!(relay.link().is_connected());
}

#[tokio::test]
async fn repeat_inside_window_is_dropped() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    relay.handle(ScanEvent::at(epc("0001"), 100.0)).await;
    let result = relay.handle(ScanEvent::at(epc("0001"), 102.0)).await;

    assert_eq!(result, Disposition::Duplicate);
    assert_eq!(conn.sent_count(), 1);
}

#[tokio::test]
async fn malformed_payload_only_drops_that_event() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    let result = relay.handle(ScanEvent::at("303", 100.0)).await;
    assert_eq!(result, Disposition::Rejected(DecodeError::OddLength(3)));

    let result = relay.handle(ScanEvent::at("30G0", 100.5)).await;
    assert!(matches!(
        result,
        Disposition::Rejected(DecodeError::InvalidHex { offset: 2, .. })
    ));
    assert_eq!(conn.connects(), 0);

    let result = relay.handle(ScanEvent::at(epc("0001"), 101.0)).await;
    assert!(matches!(result, Disposition::Forwarded(_)));
    assert_eq!(conn.sent(), vec!["0001"]);
}

#[tokio::test]
async fn distinct_tags_have_independent_windows() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    for (label, t) in [("0001", 0.0), ("0002", 0.5), ("0001", 1.0), ("0003", 1.5), ("0002", 2.0)] {
        relay.handle(ScanEvent::at(epc(label), t)).await;
    }

    assert_eq!(conn.sent(), vec!["0001", "0002", "0003"]);
    assert_eq!(relay.filter().len(), 3);
}

/// 100 reads of one tag spread over 0..=12 s, 5 s window: forwarded at 0, 6, 12.
#[tokio::test]
async fn steady_reads_forward_once_per_window() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    let mut forwarded_at = Vec::new();
    for i in 0..100u32 {
        let t = f64::from(i * 13 / 100);
        if let Disposition::Forwarded(_) = relay.handle(ScanEvent::at(epc("0001"), t)).await {
            forwarded_at.push(t);
        }
    }

    assert_eq!(forwarded_at, vec![0.0, 6.0, 12.0]);
    assert_eq!(conn.sent(), vec!["0001", "0001", "0001"]);
    assert_eq!(
        relay.stats(),
        RelayStats {
            events: 100,
            forwarded: 3,
            duplicates: 97,
            rejected: 0,
        }
    );
}

#[tokio::test]
async fn non_printable_ids_are_forwarded_byte_for_byte() {
    let conn = RecordingConnector::new();
    let mut relay = conn.relay(5.0);

    relay.handle(ScanEvent::at("00FF2C80", 10.0)).await;

    let sent = conn.sent();
    assert_eq!(sent.len(), 1);
    let bytes: Vec<u8> = sent[0].chars().map(|c| c as u32 as u8).collect();
    assert_eq!(bytes, vec![0x00, 0xff, 0x2c, 0x80]);
}
