//! Domain errors.

use std::time::Duration;

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("display name is too long ({actual} > {max} characters)")]
    DisplayNameTooLong { max: usize, actual: usize },

    #[error("room name is too long ({actual} > {max} characters)")]
    RoomNameTooLong { max: usize, actual: usize },

    #[error("participant id must not be empty")]
    EmptyParticipantId,
}

/// Generation backend failures. The message is what recipients see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("generation backend error: {0}")]
    Backend(String),

    #[error("generation stream interrupted: {0}")]
    Interrupted(String),

    #[error("generation backend timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivery failures for a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("participant '{0}' is not connected")]
    ParticipantNotFound(String),

    #[error("failed to push event: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// Session registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("participant '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),
}
