//! Seams to the reader hardware.
//!
//! The driver calls back on a thread it owns. Its callback only pushes a
//! `ScanEvent` into a `ScanSink`; the relay drains the other end of the
//! channel one event at a time.

use crate::error::RelayResult;
use tokio::sync::mpsc;

/// One raw detection from the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    /// EPC as reported by the driver, hex digit pairs.
    pub epc: String,
    /// Wall-clock time of the read, in seconds since the Unix epoch.
    pub seen_at: f64,
}

impl ScanEvent {
    /// Stamp a read with the current wall-clock time.
    pub fn new(epc: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self::at(epc, now.timestamp_millis() as f64 / 1000.0)
    }

    pub fn at(epc: impl Into<String>, seen_at: f64) -> Self {
        Self {
            epc: epc.into(),
            seen_at,
        }
    }
}

/// Reader duty cycle, handed to the driver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    pub on_time_ms: u32,
    pub off_time_ms: u32,
}

impl Default for DutyCycle {
    fn default() -> Self {
        Self {
            on_time_ms: 250,
            off_time_ms: 250,
        }
    }
}

/// Sending half of the scan channel. Cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct ScanSink {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ScanSink {
    /// Hand one read to the relay. Returns false once the relay has gone away.
    pub fn submit(&self, event: ScanEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Create a connected sink/receiver pair.
pub fn scan_channel() -> (ScanSink, mpsc::UnboundedReceiver<ScanEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScanSink { tx }, rx)
}

/// A reader that reports tags as it sees them.
pub trait ScanSource: Send {
    /// Begin reading. Each detected tag becomes one `submit` on `sink`.
    ///
    /// An error here is a driver initialisation failure.
    fn start(&mut self, sink: ScanSink, duty: DutyCycle) -> RelayResult<()>;

    /// Stop reading. Safe to call when not started.
    fn stop(&mut self);
}

/// A reader that can program a label into the tag in its field.
pub trait TagWriter: Send {
    fn write_label(&mut self, label: &str) -> RelayResult<()>;
}
