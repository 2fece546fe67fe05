//! Turn-taking state machine for the interactive prompt.
//!
//! A turn starts when the prompt is issued and ends once the reply (if any)
//! has been fully played back. Transitions are pure so the rules can be
//! tested without a runtime.
//!
//! ```text
//! Idle --PromptIssued--> AwaitingInput
//! AwaitingInput --SubmittedTrigger(n)--> StreamingReply(n) --StreamEnded(n)--> Draining
//! AwaitingInput --SubmittedPlain--> Draining
//! Draining --DisplayDrained--> Idle
//! * --Disconnected--> Closed
//! ```
//!
//! A stream end carrying another request id (or none, as sent for another
//! participant's reply) leaves `StreamingReply` untouched.

/// Where the client is within the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ready to prompt
    Idle,
    /// Prompt shown, waiting for the user
    AwaitingInput,
    /// Trigger sent with this request id, waiting for the end of its reply
    StreamingReply(u64),
    /// Reply complete on the wire, playback still draining
    Draining,
    /// Session over
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    PromptIssued,
    SubmittedTrigger(u64),
    SubmittedPlain,
    StreamEnded(Option<u64>),
    DisplayDrained,
    Disconnected,
}

impl TurnState {
    /// Apply `event`. Events that do not apply to the current state leave it
    /// unchanged.
    pub fn next(self, event: TurnEvent) -> TurnState {
        use TurnEvent::*;
        use TurnState::*;

        match (self, event) {
            (Closed, _) | (_, Disconnected) => Closed,
            (Idle, PromptIssued) => AwaitingInput,
            (AwaitingInput, SubmittedTrigger(request)) => StreamingReply(request),
            (AwaitingInput, SubmittedPlain) => Draining,
            (StreamingReply(pending), StreamEnded(Some(request))) if request == pending => Draining,
            (Draining, DisplayDrained) => Idle,
            (state, _) => state,
        }
    }

    /// The reply stream of the current turn has ended (or none was expected)
    pub fn stream_finished(self) -> bool {
        matches!(self, TurnState::Idle | TurnState::Draining)
    }

    /// Playback has caught up and a new prompt may be issued
    pub fn input_ready(self) -> bool {
        self == TurnState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[TurnEvent]) -> TurnState {
        events
            .iter()
            .fold(TurnState::Idle, |state, event| state.next(*event))
    }

    #[test]
    fn test_triggered_turn_cycle() {
        // テスト項目: トリガー付きの入力では、ストリーム終了と表示完了の両方を経て Idle に戻る
        // given (前提条件):
        let events = [
            TurnEvent::PromptIssued,
            TurnEvent::SubmittedTrigger(1),
            TurnEvent::StreamEnded(Some(1)),
        ];

        // when (操作):
        let draining = run(&events);
        let idle = draining.next(TurnEvent::DisplayDrained);

        // then (期待する結果):
        assert_eq!(draining, TurnState::Draining);
        assert!(draining.stream_finished());
        assert!(!draining.input_ready());
        assert_eq!(idle, TurnState::Idle);
    }

    #[test]
    fn test_plain_turn_skips_streaming() {
        // テスト項目: トリガーなしの入力ではストリームを待たずに Draining へ進む
        // given (前提条件):
        let events = [TurnEvent::PromptIssued, TurnEvent::SubmittedPlain];

        // when (操作):
        let state = run(&events);

        // then (期待する結果):
        assert_eq!(state, TurnState::Draining);
        assert_eq!(state.next(TurnEvent::DisplayDrained), TurnState::Idle);
    }

    #[test]
    fn test_display_drained_does_not_skip_stream_end() {
        // テスト項目: ストリーム受信中に表示完了が来ても状態は変わらない
        // given (前提条件):
        let state = run(&[TurnEvent::PromptIssued, TurnEvent::SubmittedTrigger(1)]);

        // when (操作):
        let next = state.next(TurnEvent::DisplayDrained);

        // then (期待する結果):
        assert_eq!(next, TurnState::StreamingReply(1));
        assert!(!next.stream_finished());
    }

    #[test]
    fn test_other_stream_end_does_not_finish_own_reply() {
        // テスト項目: 他の参加者のストリーム終了や別の要求の終了では、自分の応答待ちは終わらない
        // given (前提条件):
        let state = run(&[TurnEvent::PromptIssued, TurnEvent::SubmittedTrigger(2)]);

        // when (操作):
        let after_untagged = state.next(TurnEvent::StreamEnded(None));
        let after_stale = after_untagged.next(TurnEvent::StreamEnded(Some(1)));
        let after_own = after_stale.next(TurnEvent::StreamEnded(Some(2)));

        // then (期待する結果):
        assert_eq!(after_untagged, TurnState::StreamingReply(2));
        assert_eq!(after_stale, TurnState::StreamingReply(2));
        assert_eq!(after_own, TurnState::Draining);
    }

    #[test]
    fn test_stray_events_are_ignored_while_awaiting_input() {
        // テスト項目: 入力待ち中に届いた無関係なイベントは無視される
        // given (前提条件):
        let state = run(&[TurnEvent::PromptIssued]);

        // when (操作):
        let next = state
            .next(TurnEvent::StreamEnded(Some(1)))
            .next(TurnEvent::DisplayDrained)
            .next(TurnEvent::PromptIssued);

        // then (期待する結果):
        assert_eq!(next, TurnState::AwaitingInput);
    }

    #[test]
    fn test_disconnect_is_terminal_from_every_state() {
        // テスト項目: どの状態からでも切断で Closed になり、その後のイベントは無視される
        // given (前提条件):
        let states = [
            TurnState::Idle,
            TurnState::AwaitingInput,
            TurnState::StreamingReply(1),
            TurnState::Draining,
        ];

        for state in states {
            // when (操作):
            let closed = state.next(TurnEvent::Disconnected);

            // then (期待する結果):
            assert_eq!(closed, TurnState::Closed);
            assert_eq!(closed.next(TurnEvent::PromptIssued), TurnState::Closed);
            assert_eq!(closed.next(TurnEvent::DisplayDrained), TurnState::Closed);
        }
    }
}
