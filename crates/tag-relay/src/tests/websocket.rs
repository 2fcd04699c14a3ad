//! End to end through a real WebSocket listener.

use super::harness::epc;
use crate::config::RelayConfig;
use crate::orchestrator::Disposition;
use crate::scanner::ScanEvent;
use crate::Relay;
use futures_util::StreamExt;
use relay_link::{SendOutcome, WsConnector};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Lap listener stand-in. Accepts clients one after another and forwards
/// every text frame. The first connection is closed after `close_first_after`
/// frames, when set.
async fn spawn_listener(close_first_after: Option<usize>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut close_after = close_first_after;
        while let Ok((stream, _)) = listener.accept().await {
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                continue;
            };
            let limit = close_after.take();
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut seen = 0;
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        let _ = tx.send(text.to_string());
                        seen += 1;
                        if Some(seen) == limit {
                            let _ = ws.close(None).await;
                            break;
                        }
                    }
                }
            });
        }
    });

    (format!("ws://{}/laps", addr), rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("listener received nothing")
        .expect("listener went away")
}

#[tokio::test]
async fn deduplicated_reads_reach_the_listener() {
    let (url, mut rx) = spawn_listener(None).await;
    let mut relay = Relay::new(&RelayConfig::default(), WsConnector::new(url));

    relay.handle(ScanEvent::at(epc("0001"), 0.0)).await;
    relay.handle(ScanEvent::at(epc("0001"), 2.0)).await;
    relay.handle(ScanEvent::at(epc("0002"), 2.5)).await;
    relay.handle(ScanEvent::at(epc("0001"), 5.5)).await;

    assert_eq!(recv(&mut rx).await, "0001");
    assert_eq!(recv(&mut rx).await, "0002");
    assert_eq!(recv(&mut rx).await, "0001");
    assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv())
        .await
        .is_err());
    assert_eq!(relay.stats().duplicates, 1);
}

#[tokio::test]
async fn reconnects_after_listener_closes() {
    let (url, mut rx) = spawn_listener(Some(1)).await;
    let mut relay = Relay::new(&RelayConfig::default(), WsConnector::new(url));

    relay.handle(ScanEvent::at(epc("0001"), 0.0)).await;
    assert_eq!(recv(&mut rx).await, "0001");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while relay.link().is_connected() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!relay.link().is_connected());

    let result = relay.handle(ScanEvent::at(epc("0002"), 1.0)).await;
    assert_eq!(result, Disposition::Forwarded(SendOutcome::Sent { count: 1 }));
    assert_eq!(recv(&mut rx).await, "0002");
}

#[tokio::test]
async fn unreachable_listener_buffers_then_delivers_backlog() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut relay = Relay::new(
        &RelayConfig::default(),
        WsConnector::new(format!("ws://{}/laps", addr)),
    );
    let result = relay.handle(ScanEvent::at(epc("0001"), 0.0)).await;
    assert_eq!(result, Disposition::Forwarded(SendOutcome::Buffered { pending: 1 }));
    relay.handle(ScanEvent::at(epc("0002"), 0.5)).await;
    assert_eq!(relay.link().pending_len(), 2);

    // Bring the listener up on the same port.
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let _ = tx.send(text.to_string());
            }
        }
    });

    relay.handle(ScanEvent::at(epc("0003"), 1.0)).await;
    assert_eq!(recv(&mut rx).await, "0001,0002,0003");
    assert_eq!(relay.link().pending_len(), 0);
}
