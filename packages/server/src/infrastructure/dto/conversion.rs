//! Conversion logic between domain models and DTOs.

use hibiki_shared::{protocol::ServerEvent, time::timestamp_to_rfc3339};

use crate::domain::{OutboundEvent, Participant, RoomName};

use super::http::{ParticipantSummaryDto, RoomSummaryDto};

// ========================================
// Domain → WebSocket DTO
// ========================================

impl From<&OutboundEvent> for ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::Broadcast { sender, text } => ServerEvent::BroadcastMessage {
                sender: sender.as_str().to_string(),
                text: text.clone(),
            },
            OutboundEvent::StreamChunk { text } => ServerEvent::GeminiStream { data: text.clone() },
            OutboundEvent::StreamEnd { request_id } => ServerEvent::StreamFinished {
                request_id: *request_id,
            },
            OutboundEvent::StreamError { reason, request_id } => ServerEvent::GeminiError {
                error: reason.clone(),
                request_id: *request_id,
            },
            OutboundEvent::ParticipantJoined { name } => ServerEvent::ParticipantJoined {
                name: name.as_str().to_string(),
            },
            OutboundEvent::ParticipantLeft { name } => ServerEvent::ParticipantLeft {
                name: name.as_str().to_string(),
            },
        }
    }
}

// ========================================
// Domain → HTTP DTO
// ========================================

impl From<&Participant> for ParticipantSummaryDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(participant.connected_at.value()),
        }
    }
}

impl From<(RoomName, Vec<Participant>)> for RoomSummaryDto {
    fn from((room, members): (RoomName, Vec<Participant>)) -> Self {
        Self {
            name: room.as_str().to_string(),
            participants: members.iter().map(ParticipantSummaryDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, ParticipantId, Timestamp};

    #[test]
    fn test_stream_events_map_to_wire_events() {
        // テスト項目: ストリーム系のドメインイベントが対応するワイヤーイベントに変換される
        // given (前提条件):
        let chunk = OutboundEvent::StreamChunk {
            text: "4".to_string(),
        };
        let error = OutboundEvent::StreamError {
            reason: "quota".to_string(),
            request_id: None,
        };
        let end = OutboundEvent::StreamEnd {
            request_id: Some(3),
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            ServerEvent::from(&chunk),
            ServerEvent::GeminiStream {
                data: "4".to_string()
            }
        );
        assert_eq!(
            ServerEvent::from(&end),
            ServerEvent::StreamFinished {
                request_id: Some(3)
            }
        );
        assert_eq!(
            ServerEvent::from(&error),
            ServerEvent::GeminiError {
                error: "quota".to_string(),
                request_id: None
            }
        );
    }

    #[test]
    fn test_broadcast_carries_sender_display_name() {
        // テスト項目: ブロードキャストには送信者の表示名が含まれる
        // given (前提条件):
        let event = OutboundEvent::Broadcast {
            sender: DisplayName::parse(Some("alice")).unwrap(),
            text: "hello".to_string(),
        };

        // when (操作):
        let dto = ServerEvent::from(&event);

        // then (期待する結果):
        assert_eq!(
            dto,
            ServerEvent::BroadcastMessage {
                sender: "alice".to_string(),
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_room_summary_from_members() {
        // テスト項目: ルームとメンバーからルーム概要 DTO が生成される
        // given (前提条件):
        let room = RoomName::new("lobby").unwrap();
        let alice = Participant::new(
            ParticipantId::new("p1".to_string()).unwrap(),
            DisplayName::parse(Some("alice")).unwrap(),
            room.clone(),
            Timestamp::new(1672531200000),
        );

        // when (操作):
        let dto = RoomSummaryDto::from((room, vec![alice]));

        // then (期待する結果):
        assert_eq!(dto.name, "lobby");
        assert_eq!(dto.participants.len(), 1);
        assert_eq!(dto.participants[0].name, "alice");
        assert!(dto.participants[0].connected_at.starts_with("2023-01-01T00:00:00"));
    }
}
