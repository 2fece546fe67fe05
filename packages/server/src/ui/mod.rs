//! Relay server UI layer: HTTP and WebSocket endpoints.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
