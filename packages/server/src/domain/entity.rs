//! Entities and relay events.

use serde::Serialize;

use super::value_object::{DisplayName, ParticipantId, RoomName, Timestamp};

/// A connected participant. Owned by the session registry for the lifetime
/// of its connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub room: RoomName,
    pub connected_at: Timestamp,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        name: DisplayName,
        room: RoomName,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            room,
            connected_at,
        }
    }
}

/// A chat message as received from a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: ParticipantId,
    pub text: String,
    pub room: RoomName,
    /// Client-chosen id echoed on the requester's stream end
    pub request_id: Option<u64>,
}

/// Events emitted by the server towards participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    Broadcast { sender: DisplayName, text: String },
    StreamChunk { text: String },
    /// `request_id` is set only on the requester's copy
    StreamEnd { request_id: Option<u64> },
    StreamError {
        reason: String,
        request_id: Option<u64>,
    },
    ParticipantJoined { name: DisplayName },
    ParticipantLeft { name: DisplayName },
}

impl OutboundEvent {
    /// Whether the event belongs to a trigger's chunk stream
    pub fn is_stream_event(&self) -> bool {
        matches!(
            self,
            Self::StreamChunk { .. } | Self::StreamEnd { .. } | Self::StreamError { .. }
        )
    }

    /// Whether the event closes a trigger's chunk stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::StreamEnd { .. } | Self::StreamError { .. })
    }
}
