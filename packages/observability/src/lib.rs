//! # Observability
//!
//! Log setup for the tag relay.
//!
//! The relay is a log producer only. `main` calls [`init_with_config`] once
//! and every other module uses the plain `tracing` macros. Where the lines
//! end up is decided here:
//!
//! - With a `log_path`, every event is written as one flat JSON object per
//!   line (timestamp, level, target, message, fields) to a file opened in
//!   append mode. The first line records the service name and pid.
//! - Without one, events go to stderr in the compact human format.
//! - `also_stderr` mirrors file output to stderr for foreground runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "tag-relay".into(),
//!         default_level: "debug".into(),
//!         log_path: Some("tag-relay.log".into()),
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("starting");
//! }
//! ```

mod file;

use file::LogFileWriter;
use std::path::PathBuf;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, recorded when file logging starts.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Append JSON lines to this file. `None` logs to stderr only.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr when writing to a file.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with custom configuration.
///
/// If the log file cannot be opened the error is reported on stderr and
/// logging falls back to stderr; the caller keeps running.
pub fn init_with_config(config: LogConfig) {
    match &config.log_path {
        Some(path) => match LogFileWriter::new(path) {
            Ok(writer) => file::init_file_subscriber(&config, writer),
            Err(e) => {
                eprintln!("failed to open log file {}: {}", path.display(), e);
                init_stderr_subscriber(&config);
            }
        },
        None => init_stderr_subscriber(&config),
    }
}

fn init_stderr_subscriber(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.default_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Build an env filter from RUST_LOG, falling back to `default_level`.
pub(crate) fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}
