//! Outbound link to the lap listener.
//!
//! This crate provides:
//! - A single logical connection that is opened lazily on the first send
//! - A FIFO backlog of ids that survives connect and write failures
//! - Reconnect on the next send after the remote side closes
//! - A WebSocket transport, plus the `Connector` seam for other transports

mod client;
mod error;
mod transport;

pub use client::{LinkConfig, LinkState, OutboundLink, SendOutcome, MESSAGE_DELIMITER};
pub use error::{LinkError, LinkResult};
pub use transport::{Connection, Connector, WsConnection, WsConnector};
