//! Batch tag programming.
//!
//! Writes sequential labels ("0001", "0002", ...) to tags placed on the
//! reader one at a time, pausing before each write so the operator can
//! swap tags.

use crate::error::{RelayError, RelayResult};
use crate::scanner::TagWriter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Pause before each write.
pub const WRITE_INTERVAL: Duration = Duration::from_secs(5);

/// Inclusive range of label numbers, parsed from `"<start>-<end>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRange {
    start: u32,
    end: u32,
}

impl WriteRange {
    pub fn new(start: u32, end: u32) -> RelayResult<Self> {
        if start > end {
            return Err(RelayError::Config(format!(
                "write range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of tags in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Labels in write order.
    pub fn labels(&self) -> impl Iterator<Item = String> {
        (self.start..=self.end).map(label)
    }
}

impl FromStr for WriteRange {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RelayError::Config(format!("write range must look like 1-20, got {:?}", s));

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        Self::new(start, end)
    }
}

impl fmt::Display for WriteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Label text for tag number `n`, zero padded to four digits.
pub fn label(n: u32) -> String {
    format!("{:04}", n)
}

/// Write every label in `range`, waiting `interval` before each one.
///
/// Stops at the first failed write. Returns how many tags were written.
pub async fn run_batch_write(
    writer: &mut dyn TagWriter,
    range: WriteRange,
    interval: Duration,
) -> RelayResult<usize> {
    info!(range = %range, count = range.len(), "batch write starting");

    let mut written = 0;
    for n in range.start..=range.end {
        tokio::time::sleep(interval).await;
        writer.write_label(&label(n))?;
        info!("wrote {}", n);
        written += 1;
    }
    Ok(written)
}
