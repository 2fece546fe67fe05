//! Code shared by the Hibiki relay server and CLI client.
//!
//! - `protocol`: JSON events exchanged over the WebSocket
//! - `trigger`: trigger-marker detection and question extraction
//! - `time`: clock abstraction and timestamp formatting
//! - `logger`: tracing subscriber setup for the binaries

pub mod logger;
pub mod protocol;
pub mod time;
pub mod trigger;
