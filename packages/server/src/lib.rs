//! Hibiki relay server library.
//!
//! Accepts chat messages over WebSocket, fans them out to the room and, when a
//! message carries the trigger marker, relays a generation backend's streamed
//! reply as an ordered sequence of chunks.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
