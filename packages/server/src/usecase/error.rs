//! UseCase errors.

use thiserror::Error;

use crate::domain::RegistryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("failed to register participant: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("participant '{0}' is not connected")]
    NotConnected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("sender '{0}' is not connected")]
    UnknownSender(String),
}
