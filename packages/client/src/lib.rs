//! Hibiki CLI chat client library.
//!
//! Sends typed lines to the relay server and plays streamed replies back with
//! a typing effect, one turn at a time.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod gate;
pub mod input;
pub mod playback;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::run_client;
pub use session::SessionConfig;
