//! Log file output.
//!
//! Appends JSON lines to a single file, flushing after every line so the
//! file can be tailed while the relay runs.

use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Append-mode writer shared by every log line.
#[derive(Clone)]
pub struct LogFileWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let result = guard.write(buf);
        guard.flush()?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// JSON-lines layer writing flattened events with an RFC 3339 UTC timestamp.
pub(crate) fn json_file_layer<S>(writer: LogFileWriter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(true)
        .with_writer(writer)
}

/// Install the JSON file layer, plus a compact stderr layer if requested.
pub(crate) fn init_file_subscriber(config: &LogConfig, writer: LogFileWriter) {
    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(json_file_layer(writer).with_filter(crate::env_filter(&config.default_level)))
        .with(stderr_layer.map(|l| l.with_filter(crate::env_filter(&config.default_level))))
        .try_init();

    if let Some(path) = &config.log_path {
        tracing::info!(
            service = %config.service_name,
            pid = std::process::id(),
            log_path = %path.display(),
            "file logging initialized"
        );
    }
}
