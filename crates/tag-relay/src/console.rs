//! Line-oriented stand-in for the reader hardware.
//!
//! Reads one hex EPC per line from an input stream (stdin by default) on a
//! dedicated thread, the way a driver would call back on its own thread.
//! Tag writes are printed as the hex EPC the tag would then report.

use crate::config::ReaderSettings;
use crate::error::{RelayError, RelayResult};
use crate::scanner::{DutyCycle, ScanEvent, ScanSink, ScanSource, TagWriter};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

pub struct ConsoleReader {
    settings: ReaderSettings,
    input: Option<Box<dyn BufRead + Send>>,
    output: Box<dyn Write + Send>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ConsoleReader {
    /// Reader fed from stdin, writing to stdout.
    pub fn stdio(settings: ReaderSettings) -> Self {
        Self::new(
            settings,
            io::BufReader::new(io::stdin()),
            io::stdout(),
        )
    }

    pub fn new(
        settings: ReaderSettings,
        input: impl BufRead + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        info!(
            uri = %settings.uri,
            region = %settings.region,
            protocol = %settings.protocol,
            antennas = ?settings.antennas,
            read_power_cdbm = settings.read_power_cdbm,
            "reader configured"
        );
        Self {
            settings,
            input: Some(Box::new(input)),
            output: Box::new(output),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }
}

impl ScanSource for ConsoleReader {
    fn start(&mut self, sink: ScanSink, duty: DutyCycle) -> RelayResult<()> {
        let input = self
            .input
            .take()
            .ok_or_else(|| RelayError::DriverInit("reader already started".to_string()))?;

        debug!(
            on_time_ms = duty.on_time_ms,
            off_time_ms = duty.off_time_ms,
            "start_reading"
        );

        let stop = self.stop.clone();
        let worker = std::thread::Builder::new()
            .name("console-reader".to_string())
            .spawn(move || read_lines(input, sink, stop))
            .map_err(|e| RelayError::DriverInit(e.to_string()))?;
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        debug!("stop_reading");
        self.stop.store(true, Ordering::SeqCst);
        // A blocked stdin read cannot be interrupted, so only join a worker
        // that has already finished.
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            }
        }
    }
}

impl TagWriter for ConsoleReader {
    fn write_label(&mut self, label: &str) -> RelayResult<()> {
        writeln!(self.output, "{}", hex::encode_upper(label))
            .and_then(|_| self.output.flush())
            .map_err(|e| RelayError::Write(e.to_string()))
    }
}

fn read_lines(input: Box<dyn BufRead + Send>, sink: ScanSink, stop: Arc<AtomicBool>) {
    for line in input.lines() {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "reader input failed");
                break;
            }
        };
        let epc = line.trim();
        if epc.is_empty() {
            continue;
        }
        if !sink.submit(ScanEvent::new(epc)) {
            break;
        }
    }
    debug!("reader input finished");
}
