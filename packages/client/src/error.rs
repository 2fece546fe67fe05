//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The initial connection could not be established
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The session ended while waiting for a turn
    #[error("Session closed")]
    Closed,

    /// The line editor failed
    #[error("Input error: {0}")]
    InputError(String),

    /// The playback task panicked or was cancelled
    #[error("Playback error: {0}")]
    PlaybackError(String),
}
