//! Integration tests for the relay pipeline.
//!
//! - `harness.rs`   - Recording connector and scripted scan source
//! - `pipeline.rs`  - Decode, dedup and forward for single events
//! - `backlog.rs`   - Buffering, ordering and recovery across link failures
//! - `lifecycle.rs` - Start, idle and shutdown behavior of `Relay::run`
//! - `websocket.rs` - End to end against a real WebSocket listener

mod pipeline;
mod websocket;
