//! Event delivery implementations.
//!
//! - `websocket`: pushes encoded frames onto each connection's outbound channel

pub mod websocket;

pub use websocket::WebSocketEventPusher;
