//! In-memory session registry.
//!
//! Participants live in a `HashMap` keyed by connection id. Nothing survives
//! a restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Participant, ParticipantId, RegistryError, RoomName, SessionRegistry};

#[derive(Default)]
pub struct InMemorySessionRegistry {
    participants: Mutex<HashMap<ParticipantId, Participant>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_join_order(members: &mut [Participant]) {
    members.sort_by(|a, b| {
        a.connected_at
            .cmp(&b.connected_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(&self, participant: Participant) -> Result<(), RegistryError> {
        let mut participants = self.participants.lock().await;
        if participants.contains_key(&participant.id) {
            return Err(RegistryError::AlreadyRegistered(participant.id.to_string()));
        }
        tracing::debug!(
            "Participant '{}' ({}) registered in room '{}'",
            participant.name,
            participant.id,
            participant.room
        );
        participants.insert(participant.id.clone(), participant);
        Ok(())
    }

    async fn unregister(&self, id: &ParticipantId) -> Result<Participant, RegistryError> {
        let mut participants = self.participants.lock().await;
        let removed = participants
            .remove(id)
            .ok_or_else(|| RegistryError::ParticipantNotFound(id.to_string()))?;
        tracing::debug!("Participant '{}' unregistered", id);
        Ok(removed)
    }

    async fn get(&self, id: &ParticipantId) -> Option<Participant> {
        self.participants.lock().await.get(id).cloned()
    }

    async fn room_members(&self, room: &RoomName) -> Vec<Participant> {
        let participants = self.participants.lock().await;
        let mut members: Vec<Participant> = participants
            .values()
            .filter(|p| &p.room == room)
            .cloned()
            .collect();
        by_join_order(&mut members);
        members
    }

    async fn rooms(&self) -> Vec<(RoomName, Vec<Participant>)> {
        let participants = self.participants.lock().await;
        let mut rooms: BTreeMap<RoomName, Vec<Participant>> = BTreeMap::new();
        for participant in participants.values() {
            rooms
                .entry(participant.room.clone())
                .or_default()
                .push(participant.clone());
        }
        rooms
            .into_iter()
            .map(|(room, mut members)| {
                by_join_order(&mut members);
                (room, members)
            })
            .collect()
    }

    async fn count(&self) -> usize {
        self.participants.lock().await.len()
    }
}
