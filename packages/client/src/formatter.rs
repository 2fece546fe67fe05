//! Message formatting utilities for client display.
//!
//! Every formatter returns a single line without a trailing newline; the
//! playback queue places it on a line of its own.

use hibiki_shared::time::format_local_clock;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner shown once the connection is established
    pub fn format_connected(name: &str, room: Option<&str>, exit_command: &str) -> String {
        let room = match room {
            Some(room) => format!("room '{}'", room),
            None => "the default room".to_string(),
        };
        format!(
            "Connected as '{}' in {}. Type a message and press Enter ('{}' to quit).",
            name, room, exit_command
        )
    }

    /// Format a chat message relayed from another participant
    ///
    /// # Arguments
    ///
    /// * `sender` - Display name of the sender
    /// * `text` - The message text
    /// * `received_at` - Unix timestamp when the message arrived (milliseconds)
    pub fn format_broadcast(sender: &str, text: &str, received_at: i64) -> String {
        format!("[{}] {}: {}", format_local_clock(received_at), sender, text)
    }

    pub fn format_participant_joined(name: &str, at: i64) -> String {
        format!("[{}] + {} entered the room", format_local_clock(at), name)
    }

    pub fn format_participant_left(name: &str, at: i64) -> String {
        format!("[{}] - {} left the room", format_local_clock(at), name)
    }

    /// Error indicator for a failed or rejected reply
    pub fn format_error(error: &str) -> String {
        format!("error: {}", error)
    }

    pub fn format_disconnected() -> String {
        "Disconnected from server".to_string()
    }

    pub fn prompt(name: &str) -> String {
        format!("{}> ", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: i64 = 1672498800000;

    #[test]
    fn test_format_broadcast() {
        // テスト項目: ブロードキャストが時刻・送信者・本文の 1 行にフォーマットされる
        // given (前提条件):
        let expected_clock = format_local_clock(AT);

        // when (操作):
        let result = MessageFormatter::format_broadcast("alice", "Hello, world!", AT);

        // then (期待する結果):
        assert_eq!(result, format!("[{}] alice: Hello, world!", expected_clock));
        assert!(!result.contains('\n'));
    }

    #[test]
    fn test_format_participant_joined() {
        // テスト項目: 入室通知が正しくフォーマットされる
        // given (前提条件):
        let name = "bob";

        // when (操作):
        let result = MessageFormatter::format_participant_joined(name, AT);

        // then (期待する結果):
        assert!(result.ends_with("+ bob entered the room"));
    }

    #[test]
    fn test_format_participant_left() {
        // テスト項目: 退出通知が正しくフォーマットされる
        // given (前提条件):
        let name = "charlie";

        // when (操作):
        let result = MessageFormatter::format_participant_left(name, AT);

        // then (期待する結果):
        assert!(result.ends_with("- charlie left the room"));
    }

    #[test]
    fn test_format_error() {
        // テスト項目: エラー表示に "error:" の接頭辞が付く
        // given (前提条件) / when (操作):
        let result = MessageFormatter::format_error("generation backend timed out after 30s");

        // then (期待する結果):
        assert_eq!(result, "error: generation backend timed out after 30s");
    }

    #[test]
    fn test_format_connected_mentions_exit_command() {
        // テスト項目: 接続バナーに名前・ルーム・終了コマンドが含まれる
        // given (前提条件) / when (操作):
        let result = MessageFormatter::format_connected("alice", Some("lobby"), "exit");
        let default_room = MessageFormatter::format_connected("bob", None, "quit");

        // then (期待する結果):
        assert!(result.contains("'alice'"));
        assert!(result.contains("room 'lobby'"));
        assert!(result.contains("'exit' to quit"));
        assert!(default_room.contains("the default room"));
        assert!(default_room.contains("'quit' to quit"));
    }
}
