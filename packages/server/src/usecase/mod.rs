//! UseCase layer: application flows built on the domain ports.

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_rooms;
pub mod relay_engine;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, DisconnectError, RelayError};
pub use get_rooms::GetRoomsUseCase;
pub use relay_engine::{DeliveryScope, RejectReason, RelayConfig, RelayEngine, RelayOutcome};
