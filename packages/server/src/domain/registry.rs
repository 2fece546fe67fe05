//! Session registry port.
//!
//! The registry owns every connected participant and answers the membership
//! questions the relay needs: who is in a room, and who is a given sender.

use async_trait::async_trait;

use super::{
    entity::Participant,
    error::RegistryError,
    value_object::{ParticipantId, RoomName},
};

#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Add a participant on connect
    async fn register(&self, participant: Participant) -> Result<(), RegistryError>;

    /// Remove a participant on disconnect, returning what was registered
    async fn unregister(&self, id: &ParticipantId) -> Result<Participant, RegistryError>;

    async fn get(&self, id: &ParticipantId) -> Option<Participant>;

    /// Members of `room`, ordered by join time
    async fn room_members(&self, room: &RoomName) -> Vec<Participant>;

    /// Every non-empty room with its members, ordered by room name
    async fn rooms(&self) -> Vec<(RoomName, Vec<Participant>)>;

    async fn count(&self) -> usize;
}
