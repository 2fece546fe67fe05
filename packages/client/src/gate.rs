//! Shared handle on the turn state.
//!
//! The input loop, the inbound event handler and the playback consumer all
//! drive the same [`TurnState`]; waiting happens on a `watch` channel so no
//! transition is missed.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;

use crate::{
    domain::{TurnEvent, TurnState},
    error::ClientError,
};

#[derive(Clone)]
pub struct TurnGate {
    state: Arc<watch::Sender<TurnState>>,
    last_request: Arc<AtomicU64>,
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnGate {
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(TurnState::Idle)),
            last_request: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> TurnState {
        *self.state.borrow()
    }

    fn apply(&self, event: TurnEvent) -> TurnState {
        let mut after = TurnState::Closed;
        self.state.send_modify(|state| {
            let next = state.next(event);
            if next != *state {
                tracing::trace!("Turn state {:?} -> {:?} on {:?}", state, next, event);
            }
            *state = next;
            after = next;
        });
        after
    }

    /// Wait until a new prompt may be issued, then start the turn.
    ///
    /// Returns [`ClientError::Closed`] once the session is over.
    pub async fn acquire(&self) -> Result<(), ClientError> {
        let mut rx = self.state.subscribe();
        let ready = *rx
            .wait_for(|state| state.input_ready() || *state == TurnState::Closed)
            .await
            .map_err(|_| ClientError::Closed)?;
        if ready == TurnState::Closed {
            return Err(ClientError::Closed);
        }

        match self.apply(TurnEvent::PromptIssued) {
            TurnState::AwaitingInput => Ok(()),
            _ => Err(ClientError::Closed),
        }
    }

    /// Resolves once the session is closed
    pub async fn closed(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == TurnState::Closed).await;
    }

    /// Record the submitted line and return the request id to send with it
    pub fn submitted(&self, triggered: bool) -> u64 {
        let request = self.last_request.fetch_add(1, Ordering::Relaxed) + 1;
        self.apply(if triggered {
            TurnEvent::SubmittedTrigger(request)
        } else {
            TurnEvent::SubmittedPlain
        });
        request
    }

    /// A reply stream closed; `request_id` is set only when it was ours
    pub fn stream_ended(&self, request_id: Option<u64>) {
        self.apply(TurnEvent::StreamEnded(request_id));
    }

    pub fn display_drained(&self) {
        self.apply(TurnEvent::DisplayDrained);
    }

    pub fn close(&self) {
        self.apply(TurnEvent::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_acquire_waits_for_playback_to_drain() {
        // テスト項目: 前のターンの表示が完了するまで次のプロンプトは発行されない
        // given (前提条件):
        let gate = TurnGate::new();
        gate.acquire().await.unwrap();
        let request = gate.submitted(true);

        // when (操作):
        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.acquire().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let finished_early = waiter.is_finished();
        gate.stream_ended(Some(request));
        tokio::time::sleep(Duration::from_millis(20)).await;
        let finished_before_drain = waiter.is_finished();
        gate.display_drained();

        // then (期待する結果):
        assert!(!finished_early);
        assert!(!finished_before_drain);
        assert!(waiter.await.unwrap().is_ok());
        assert_eq!(gate.state(), TurnState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_close_releases_waiters() {
        // テスト項目: 切断すると待機中の acquire と closed が解放される
        // given (前提条件):
        let gate = TurnGate::new();
        gate.acquire().await.unwrap();
        gate.submitted(true);
        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.acquire().await }
        });

        // when (操作):
        gate.close();

        // then (期待する結果):
        assert!(matches!(waiter.await.unwrap(), Err(ClientError::Closed)));
        tokio::time::timeout(Duration::from_secs(1), gate.closed())
            .await
            .unwrap();
        assert!(gate.acquire().await.is_err());
    }

    #[tokio::test]
    async fn test_plain_submission_waits_for_release_only() {
        // テスト項目: トリガーなしの送信後は表示完了の通知だけで次のターンに進める
        // given (前提条件):
        let gate = TurnGate::new();
        gate.acquire().await.unwrap();

        // when (操作):
        gate.submitted(false);
        gate.display_drained();

        // then (期待する結果):
        assert_eq!(gate.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_request_ids_are_unique_per_submission() {
        // テスト項目: 送信ごとに異なる request_id が割り当てられる
        // given (前提条件):
        let gate = TurnGate::new();

        // when (操作):
        gate.acquire().await.unwrap();
        let first = gate.submitted(false);
        gate.display_drained();
        gate.acquire().await.unwrap();
        let second = gate.submitted(true);

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(gate.state(), TurnState::StreamingReply(second));
    }
}
