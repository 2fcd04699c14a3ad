//! Buffered outbound link.

use crate::{Connection, Connector, LinkError, LinkResult};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Separator between ids in one outbound message.
pub const MESSAGE_DELIMITER: &str = ",";

/// Link configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Upper bound on a single connect attempt.
    pub connect_timeout: Duration,
    /// Cap on the backlog while disconnected. `None` keeps everything;
    /// with a cap the oldest ids are dropped first.
    pub max_pending: Option<usize>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            max_pending: None,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// What a call to [`OutboundLink::send`] did with the backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The whole backlog went out as one message.
    Sent { count: usize },
    /// Connect failed; the id was queued behind `pending - 1` others.
    Buffered { pending: usize },
    /// The write failed; the connection was dropped and the backlog kept.
    Retained { pending: usize },
}

/// Single logical connection with a FIFO backlog.
///
/// There is no background retry. Every `send` that finds the link down
/// tries to connect again, so recovery happens on the next id.
pub struct OutboundLink {
    config: LinkConfig,
    connector: Box<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    pending: VecDeque<String>,
}

impl OutboundLink {
    /// Create a disconnected link. Nothing is opened until the first send.
    pub fn new(connector: impl Connector + 'static, config: LinkConfig) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            connection: None,
            pending: VecDeque::new(),
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> LinkState {
        match &self.connection {
            Some(conn) if !conn.is_closed() => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Snapshot of the ids waiting to be sent, oldest first.
    pub fn pending(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    /// Queue `id` and try to push the whole backlog out.
    ///
    /// Failures are logged and reported through the returned outcome; they
    /// never escape as errors.
    pub async fn send(&mut self, id: impl Into<String>) -> SendOutcome {
        self.enqueue(id.into());
        self.drop_if_remote_closed();

        if self.connection.is_none() {
            if let Err(e) = self.connect().await {
                error!(
                    endpoint = %self.connector.endpoint(),
                    error = %e,
                    pending = self.pending.len(),
                    "connect failed"
                );
                return SendOutcome::Buffered {
                    pending: self.pending.len(),
                };
            }
        }

        self.flush().await
    }

    /// Close the connection if there is one. Safe to call repeatedly.
    ///
    /// The backlog is left as is; callers shutting down simply drop it.
    pub async fn close(&mut self) {
        debug!("close");
        if let Some(mut conn) = self.connection.take() {
            if let Err(e) = conn.close().await {
                debug!(error = %e, "close handshake failed");
            }
            info!(endpoint = %self.connector.endpoint(), "link closed");
        }
    }

    fn enqueue(&mut self, id: String) {
        self.pending.push_back(id);

        if let Some(max) = self.config.max_pending {
            let max = max.max(1);
            while self.pending.len() > max {
                if let Some(dropped) = self.pending.pop_front() {
                    warn!(dropped = ?dropped, max_pending = max, "backlog full, dropping oldest id");
                }
            }
        }
    }

    fn drop_if_remote_closed(&mut self) {
        if self.connection.as_ref().is_some_and(|c| c.is_closed()) {
            debug!("on_close");
            self.connection = None;
        }
    }

    async fn connect(&mut self) -> LinkResult<()> {
        info!(endpoint = %self.connector.endpoint(), "connecting");

        let limit = self.config.connect_timeout;
        let conn = tokio::time::timeout(limit, self.connector.connect())
            .await
            .map_err(|_| LinkError::ConnectTimeout(limit.as_millis() as u64))??;

        self.connection = Some(conn);
        info!(endpoint = %self.connector.endpoint(), "connected");
        Ok(())
    }

    async fn flush(&mut self) -> SendOutcome {
        let count = self.pending.len();
        let Some(conn) = self.connection.as_mut() else {
            return SendOutcome::Buffered { pending: count };
        };

        if count > 1 {
            debug!(count, "sending tags");
        }
        let message = self
            .pending
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(MESSAGE_DELIMITER);

        match conn.send_text(message).await {
            Ok(()) => {
                self.pending.clear();
                SendOutcome::Sent { count }
            }
            Err(e) => {
                error!(error = %e, pending = count, "send failed");
                self.connection = None;
                SendOutcome::Retained { pending: count }
            }
        }
    }
}
