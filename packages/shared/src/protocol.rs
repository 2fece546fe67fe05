//! WebSocket wire events.
//!
//! Every frame is a JSON text frame tagged by `type`. Event names follow the
//! relay's public protocol (`chat_message`, `broadcast_message`,
//! `gemini_stream`, `stream_finished`, `gemini_error`).
//!
//! A chat message may carry a client-chosen `request_id`. The server echoes
//! it on the requester's copy of the event that closes the reply stream, so
//! a client can tell its own reply's end from another participant's.

use serde::{Deserialize, Serialize};

/// Client → server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    ChatMessage {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
}

impl ClientEvent {
    /// Decode a text frame. A frame that is not a valid event is taken as
    /// plain chat text.
    pub fn from_frame(frame: &str) -> Self {
        match serde_json::from_str::<ClientEvent>(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("Frame is not a client event ({}), treating as chat text", e);
                ClientEvent::ChatMessage {
                    text: frame.to_string(),
                    request_id: None,
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Server → client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A chat message from another participant of the room
    BroadcastMessage { sender: String, text: String },
    /// One chunk of generated text
    GeminiStream { data: String },
    /// The current generation stream completed normally
    StreamFinished {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    /// The current generation stream failed or could not be opened
    GeminiError {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    ParticipantJoined { name: String },
    ParticipantLeft { name: String },
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_format() {
        // テスト項目: chat_message が type タグ付きの JSON にシリアライズされる
        // given (前提条件):
        let event = ClientEvent::ChatMessage {
            text: "hello".to_string(),
            request_id: None,
        };

        // when (操作):
        let json = event.to_json().unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"chat_message","text":"hello"}"#);
    }

    #[test]
    fn test_request_id_is_carried_when_present() {
        // テスト項目: request_id は指定された場合のみ送られ、無い場合も受信できる
        // given (前提条件):
        let ask = ClientEvent::ChatMessage {
            text: "@gemini hi".to_string(),
            request_id: Some(7),
        };

        // when (操作):
        let json = ask.to_json().unwrap();
        let finished = ServerEvent::from_json(r#"{"type":"stream_finished","request_id":7}"#);
        let untagged = ServerEvent::from_json(r#"{"type":"gemini_error","error":"boom"}"#);

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"chat_message","text":"@gemini hi","request_id":7}"#);
        assert_eq!(finished.unwrap(), ServerEvent::StreamFinished { request_id: Some(7) });
        assert_eq!(
            untagged.unwrap(),
            ServerEvent::GeminiError {
                error: "boom".to_string(),
                request_id: None
            }
        );
    }

    #[test]
    fn test_from_frame_falls_back_to_plain_text() {
        // テスト項目: JSON でないフレームはチャットテキストとして扱われる
        // given (前提条件):
        let frame = "just some text";

        // when (操作):
        let event = ClientEvent::from_frame(frame);

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::ChatMessage {
                text: "just some text".to_string(),
                request_id: None
            }
        );
    }

    #[test]
    fn test_stream_finished_has_no_payload() {
        // テスト項目: request_id の無い stream_finished はペイロードを持たない
        // given (前提条件):
        let event = ServerEvent::StreamFinished { request_id: None };

        // when (操作):
        let json = event.to_json().unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"stream_finished"}"#);
    }

    #[test]
    fn test_server_event_wire_names() {
        // テスト項目: サーバーイベントが既定のイベント名とフィールド名で送られる
        // given (前提条件):
        let chunk = ServerEvent::GeminiStream {
            data: "4".to_string(),
        };
        let error = ServerEvent::GeminiError {
            error: "boom".to_string(),
            request_id: None,
        };
        let broadcast = ServerEvent::BroadcastMessage {
            sender: "alice".to_string(),
            text: "hi".to_string(),
        };

        // when (操作) / then (期待する結果):
        assert_eq!(chunk.to_json().unwrap(), r#"{"type":"gemini_stream","data":"4"}"#);
        assert_eq!(error.to_json().unwrap(), r#"{"type":"gemini_error","error":"boom"}"#);
        assert_eq!(
            broadcast.to_json().unwrap(),
            r#"{"type":"broadcast_message","sender":"alice","text":"hi"}"#
        );
    }

    #[test]
    fn test_server_event_rejects_unknown_type() {
        // テスト項目: 未知の type を持つフレームはエラーになる
        // given (前提条件):
        let frame = r#"{"type":"unknown"}"#;

        // when (操作):
        let result = ServerEvent::from_json(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
