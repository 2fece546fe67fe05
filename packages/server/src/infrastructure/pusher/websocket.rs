//! WebSocket event pusher.
//!
//! The UI layer owns the sockets. Each connection hands this pusher the
//! sending half of an unbounded channel; a per-connection push loop drains
//! the channel into the socket. Encoding to JSON happens here, so everything
//! above this layer deals only in domain events.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hibiki_shared::protocol::ServerEvent;
use tokio::sync::Mutex;

use crate::domain::{EventPusher, OutboundEvent, ParticipantId, PushError, PusherChannel};

#[derive(Default)]
pub struct WebSocketEventPusher {
    /// Outbound channel per connected participant
    clients: Arc<Mutex<HashMap<ParticipantId, PusherChannel>>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register_client(&self, id: ParticipantId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Participant '{}' registered to pusher", id);
        clients.insert(id, sender);
    }

    async fn unregister_client(&self, id: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        clients.remove(id);
        tracing::debug!("Participant '{}' unregistered from pusher", id);
    }

    async fn push_to(&self, id: &ParticipantId, event: &OutboundEvent) -> Result<(), PushError> {
        let frame = ServerEvent::from(event)
            .to_json()
            .map_err(|e| PushError::Encode(e.to_string()))?;

        let clients = self.clients.lock().await;
        let sender = clients
            .get(id)
            .ok_or_else(|| PushError::ParticipantNotFound(id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| PushError::PushFailed(e.to_string()))?;
        tracing::trace!("Pushed event to '{}'", id);
        Ok(())
    }
}
