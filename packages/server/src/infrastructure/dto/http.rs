//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One participant in a room listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummaryDto {
    pub name: String,
    /// RFC 3339
    pub connected_at: String,
}

/// Response item of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub name: String,
    pub participants: Vec<ParticipantSummaryDto>,
}
