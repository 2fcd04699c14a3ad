//! Relay loop: scan events in, deduplicated tag ids out.

use crate::config::RelayConfig;
use crate::decoder::decode;
use crate::dedup::DuplicateFilter;
use crate::error::DecodeError;
use crate::scanner::{scan_channel, DutyCycle, ScanEvent, ScanSource};
use relay_link::{Connector, OutboundLink, SendOutcome};
use std::future::Future;
use tracing::{debug, error, info, warn};

/// What happened to one scan event.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Passed the filter and was handed to the link.
    Forwarded(SendOutcome),
    /// Seen too recently.
    Duplicate,
    /// The payload did not decode.
    Rejected(DecodeError),
}

/// Running counters, logged at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub events: u64,
    pub forwarded: u64,
    pub duplicates: u64,
    pub rejected: u64,
}

/// Owns the duplicate filter and the outbound link for the life of the process.
pub struct Relay {
    filter: DuplicateFilter,
    link: OutboundLink,
    stats: RelayStats,
}

impl Relay {
    /// Build a relay that sends through `connector`.
    pub fn new(config: &RelayConfig, connector: impl Connector + 'static) -> Self {
        Self::from_parts(
            DuplicateFilter::new(config.dedup_threshold_secs),
            OutboundLink::new(connector, config.link_config()),
        )
    }

    pub fn from_parts(filter: DuplicateFilter, link: OutboundLink) -> Self {
        Self {
            filter,
            link,
            stats: RelayStats::default(),
        }
    }

    pub fn link(&self) -> &OutboundLink {
        &self.link
    }

    pub fn filter(&self) -> &DuplicateFilter {
        &self.filter
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Decode, filter and forward one event.
    pub async fn handle(&mut self, event: ScanEvent) -> Disposition {
        self.stats.events += 1;

        let id = match decode(&event.epc) {
            Ok(id) => id,
            Err(e) => {
                warn!(epc = %event.epc, error = %e, "dropping malformed scan");
                self.stats.rejected += 1;
                return Disposition::Rejected(e);
            }
        };

        if !self.filter.should_forward(&id, event.seen_at) {
            self.stats.duplicates += 1;
            return Disposition::Duplicate;
        }

        debug!(tag = %id, "forwarding");
        self.stats.forwarded += 1;
        Disposition::Forwarded(self.link.send(id).await)
    }

    /// Start `source`, relay its events until `shutdown` resolves, then stop
    /// the source and close the link.
    ///
    /// A source that fails to start, or that stops on its own, leaves the
    /// relay idle until shutdown rather than ending the process early.
    pub async fn run<F>(&mut self, source: &mut dyn ScanSource, duty: DutyCycle, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let (sink, mut events) = scan_channel();

        match source.start(sink, duty) {
            Ok(()) => {
                info!(
                    on_time_ms = duty.on_time_ms,
                    off_time_ms = duty.off_time_ms,
                    endpoint = %self.link.endpoint(),
                    "reading started"
                );
                loop {
                    tokio::select! {
                        _ = shutdown.as_mut() => break,
                        event = events.recv() => match event {
                            Some(event) => {
                                self.handle(event).await;
                            }
                            None => {
                                warn!("scan source stopped delivering, idling until shutdown");
                                shutdown.as_mut().await;
                                break;
                            }
                        },
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "reader failed to start, idling until shutdown");
                shutdown.as_mut().await;
            }
        }

        self.shutdown(source).await;
    }

    async fn shutdown(&mut self, source: &mut dyn ScanSource) {
        info!("exiting");
        source.stop();
        let dropped = self.link.pending_len();
        if dropped > 0 {
            warn!(dropped, "discarding unsent tags");
        }
        self.link.close().await;
        info!(
            events = self.stats.events,
            forwarded = self.stats.forwarded,
            duplicates = self.stats.duplicates,
            rejected = self.stats.rejected,
            "relay stopped"
        );
    }
}
