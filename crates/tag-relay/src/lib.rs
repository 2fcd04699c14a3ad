//! Tag relay: RFID reads in, deduplicated lap ids out.
//!
//! The relay takes every tag the reader reports, decodes its EPC into a
//! `TagId`, drops repeats of the same tag inside the dedup window, and
//! forwards the rest to the lap listener over a single WebSocket.
//!
//! # Invariants
//!
//! 1. **One event at a time**: reads arrive on the driver's thread but are
//!    processed by a single consumer of the scan channel
//! 2. **Windowed**: a tag is forwarded at most once per dedup window, and
//!    only forwarded reads move the window
//! 3. **Ordered backlog**: ids that could not be sent are retried in arrival
//!    order on the next send, all or nothing
//! 4. **Soft failure**: bad payloads, connect and send failures are logged
//!    and never stop the process
//!
//! # Architecture
//!
//! ```text
//! reader thread -> ScanSink -> Relay -> decode -> DuplicateFilter -> OutboundLink -> listener
//! ```

pub mod batch;
pub mod config;
pub mod console;
pub mod decoder;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod scanner;

#[cfg(test)]
mod tests;

pub use batch::{run_batch_write, WriteRange, WRITE_INTERVAL};
pub use config::{ReaderSettings, RelayConfig, DEFAULT_HOST};
pub use console::ConsoleReader;
pub use decoder::{decode, TagId};
pub use dedup::{DuplicateFilter, DEFAULT_DEDUP_THRESHOLD_SECS};
pub use error::{DecodeError, RelayError, RelayResult};
pub use orchestrator::{Disposition, Relay, RelayStats};
pub use scanner::{scan_channel, DutyCycle, ScanEvent, ScanSink, ScanSource, TagWriter};
