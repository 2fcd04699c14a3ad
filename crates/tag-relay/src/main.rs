//! Tag relay binary entry point.
//!
//! Usage: tag-relay [--host <name>] [--write-range <start>-<end>]
//!
//! Without `--write-range` the relay reads tags and forwards them to
//! `ws://<host>:8080/laps` until SIGINT or SIGTERM. With it, the reader
//! programs labels `<start>` through `<end>` and exits.

use clap::Parser;
use relay_link::WsConnector;
use std::path::PathBuf;
use std::time::Duration;
use tag_relay::config::{DEFAULT_READER_URI, DEFAULT_REGION};
use tag_relay::{
    run_batch_write, ConsoleReader, DutyCycle, ReaderSettings, Relay, RelayConfig, WriteRange,
    DEFAULT_DEDUP_THRESHOLD_SECS, DEFAULT_HOST, WRITE_INTERVAL,
};
use tracing::{error, info, warn};

/// Relay RFID reader/writer.
#[derive(Parser, Debug)]
#[command(name = "tag-relay")]
#[command(about = "Relay RFID reader/writer")]
#[command(version)]
struct Args {
    /// Host name of the relay server.
    #[arg(long, env = "TAG_RELAY_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Batch write tags, e.g. "1-20", instead of relaying reads.
    #[arg(long)]
    write_range: Option<WriteRange>,

    /// Seconds before the same tag is forwarded again.
    #[arg(long, env = "TAG_RELAY_DEDUP_SECS", default_value_t = DEFAULT_DEDUP_THRESHOLD_SECS)]
    dedup_secs: f64,

    /// Connect timeout in seconds.
    #[arg(long, default_value = "3")]
    connect_timeout_secs: u64,

    /// Cap on unsent tags held while the server is unreachable (oldest dropped).
    #[arg(long)]
    max_pending: Option<usize>,

    /// Reader on-time per duty cycle, in milliseconds.
    #[arg(long, default_value = "250")]
    on_time_ms: u32,

    /// Reader off-time per duty cycle, in milliseconds.
    #[arg(long, default_value = "250")]
    off_time_ms: u32,

    /// Reader device URI.
    #[arg(long, env = "TAG_RELAY_READER", default_value = DEFAULT_READER_URI)]
    reader_uri: String,

    /// Reader regulatory region.
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file (JSON lines, appended).
    #[arg(long, env = "TAG_RELAY_LOG", default_value = "tag-relay.log")]
    log_file: PathBuf,

    /// Mirror logs to stderr.
    #[arg(long)]
    stderr: bool,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            host: self.host.clone(),
            dedup_threshold_secs: self.dedup_secs,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_pending: self.max_pending,
            duty_cycle: DutyCycle {
                on_time_ms: self.on_time_ms,
                off_time_ms: self.off_time_ms,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "tag-relay".into(),
        default_level: args.log_level.clone(),
        log_path: Some(args.log_file.clone()),
        also_stderr: args.stderr,
    });

    info!("starting");

    match args.write_range {
        Some(range) => run_write_mode(&args, range).await,
        None => run_relay_mode(&args).await,
    }

    info!("clean shutdown");
}

async fn run_relay_mode(args: &Args) {
    let config = args.relay_config();
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration, idling until shutdown");
        shutdown_signal().await;
        return;
    }

    info!(
        url = %config.url(),
        dedup_secs = config.dedup_threshold_secs,
        connect_timeout_ms = config.connect_timeout.as_millis() as u64,
        max_pending = ?config.max_pending,
        "configuration loaded"
    );

    let settings = ReaderSettings::for_reading(args.reader_uri.clone(), args.region.clone());
    let mut reader = ConsoleReader::stdio(settings);
    let mut relay = Relay::new(&config, WsConnector::new(config.url()));

    relay
        .run(&mut reader, config.duty_cycle, shutdown_signal())
        .await;
}

async fn run_write_mode(args: &Args, range: WriteRange) {
    let settings = ReaderSettings::for_writing(args.reader_uri.clone(), args.region.clone());
    let mut writer = ConsoleReader::stdio(settings);

    tokio::select! {
        result = run_batch_write(&mut writer, range, WRITE_INTERVAL) => match result {
            Ok(written) => info!(written, "batch write finished"),
            Err(e) => error!(error = %e, "batch write failed"),
        },
        _ = shutdown_signal() => warn!("batch write interrupted"),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("caught signal SIGINT"),
                    _ = term.recv() => info!("caught signal SIGTERM"),
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM, waiting for SIGINT only");
                let _ = tokio::signal::ctrl_c().await;
                info!("caught signal SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("caught ctrl-c");
    }
}
