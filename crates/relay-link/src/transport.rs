//! Transport seam for the outbound link.
//!
//! `OutboundLink` only knows about `Connector` and `Connection`. The
//! production implementation speaks WebSocket text frames.

use crate::{LinkError, LinkResult};
use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Opens connections to one fixed endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a new connection.
    async fn connect(&self) -> LinkResult<Box<dyn Connection>>;

    /// Endpoint description used in logs.
    fn endpoint(&self) -> &str;
}

/// An established connection.
#[async_trait]
pub trait Connection: Send {
    /// Write one text message.
    async fn send_text(&mut self, text: String) -> LinkResult<()>;

    /// Ask the remote side to close.
    async fn close(&mut self) -> LinkResult<()>;

    /// True once the remote side has closed or the read half failed.
    fn is_closed(&self) -> bool;
}

/// WebSocket connector.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> LinkResult<Box<dyn Connection>> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| LinkError::Connect(e.to_string()))?;
        let (write, mut read) = ws_stream.split();

        // The read half only exists to notice the remote close.
        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = closed.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Close(frame)) => {
                        debug!(frame = ?frame, "on_close");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "read half failed");
                        break;
                    }
                }
            }
            closed_flag.store(true, Ordering::SeqCst);
        });

        Ok(Box::new(WsConnection {
            write,
            closed,
            reader,
        }))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Write half of a WebSocket plus the close-notification task.
pub struct WsConnection {
    write: WsSink,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: String) -> LinkResult<()> {
        if self.is_closed() {
            return Err(LinkError::Closed);
        }
        self.write
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| LinkError::Send(e.to_string()))
    }

    async fn close(&mut self) -> LinkResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        let result = self.write.close().await;
        self.reader.abort();
        result.map_err(LinkError::from)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
