//! UseCase: チャットメッセージの中継とストリーム配信
//!
//! 1 件の受信メッセージを次の順序で処理する。
//!
//! 1. 空白のみのメッセージは何も送らずに破棄
//! 2. 同じルームの他の参加者へ `Broadcast`（トリガーの有無に関係なく必ず送る）
//! 3. トリガーマーカーが無ければ終了
//! 4. 質問が空、またはバックエンド未設定なら `StreamError` を 1 件だけ送って終了
//! 5. バックエンドのチャンクを到着順に `StreamChunk` として送り、最後に
//!    `StreamEnd` か `StreamError` のどちらか 1 件だけを送る。終端イベントの
//!    `request_id` は要求元の参加者宛てにだけ付ける
//!
//! 個々の送信失敗はログに残して続行する。`room` スコープでは、ルームごとの
//! ストリームレーンを保持している間だけチャンクを送るため、同じ受信者から
//! 見て 2 つのトリガーのストリームが混ざることはない。
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：通常メッセージ、トリガー付きメッセージ（sender / room スコープ）
//! - 異常系：空の質問、バックエンド未設定、ストリーム途中の失敗、タイムアウト
//! - エッジケース：一部受信者への送信失敗、同一ルームでの同時トリガー

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc, time::Duration};

use futures_util::StreamExt;
use hibiki_shared::trigger::TriggerMarker;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    EventPusher, InboundMessage, OutboundEvent, Participant, ParticipantId, RoomName,
    SessionRegistry, TextGenerator, deliver, with_pull_timeout,
};

use super::error::RelayError;

/// Who receives a trigger's chunk stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryScope {
    /// Only the participant who sent the trigger
    #[default]
    Sender,
    /// Every member of the sender's room, sender included
    Room,
}

impl FromStr for DeliveryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sender" => Ok(Self::Sender),
            "room" => Ok(Self::Room),
            other => Err(format!(
                "unknown delivery scope '{}' (expected 'sender' or 'room')",
                other
            )),
        }
    }
}

impl fmt::Display for DeliveryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => f.write_str("sender"),
            Self::Room => f.write_str("room"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub trigger: TriggerMarker,
    pub scope: DeliveryScope,
    /// Upper bound for a single backend pull
    pub pull_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerMarker::default(),
            scope: DeliveryScope::default(),
            pull_timeout: Duration::from_secs(30),
        }
    }
}

/// Why a trigger did not open a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyQuestion,
    BackendUnavailable,
}

impl RejectReason {
    fn message(&self, trigger: &TriggerMarker) -> String {
        match self {
            Self::EmptyQuestion => format!("no question found after '{}'", trigger.as_str()),
            Self::BackendUnavailable => "generation backend is not configured".to_string(),
        }
    }
}

/// The participant a stream answers, with the id their client attached
#[derive(Clone, Copy)]
struct Requester<'a> {
    id: &'a ParticipantId,
    request_id: Option<u64>,
}

/// What happened to one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Blank message, nothing emitted
    Dropped,
    /// Broadcast only, no trigger
    Broadcast { recipients: usize },
    /// Trigger without a stream; one `StreamError` was emitted
    Rejected { reason: RejectReason },
    /// Stream completed with `StreamEnd`
    Streamed { chunks: usize },
    /// Stream ended with `StreamError`
    Failed { chunks: usize, reason: String },
}

pub struct RelayEngine {
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn EventPusher>,
    generator: Option<Arc<dyn TextGenerator>>,
    config: RelayConfig,
    /// One lane per room, held while a room-scoped stream is emitted
    lanes: Mutex<HashMap<RoomName, Arc<Mutex<()>>>>,
}

impl RelayEngine {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        pusher: Arc<dyn EventPusher>,
        generator: Option<Arc<dyn TextGenerator>>,
        config: RelayConfig,
    ) -> Self {
        Self {
            registry,
            pusher,
            generator,
            config,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Relay one inbound message to completion, including its full stream.
    ///
    /// Callers must not start the same sender's next message before this
    /// returns.
    pub async fn execute(&self, message: InboundMessage) -> Result<RelayOutcome, RelayError> {
        if message.text.trim().is_empty() {
            tracing::debug!("Dropping blank message from '{}'", message.sender);
            return Ok(RelayOutcome::Dropped);
        }

        let sender = self
            .registry
            .get(&message.sender)
            .await
            .ok_or_else(|| RelayError::UnknownSender(message.sender.to_string()))?;

        // 1. Broadcast to the rest of the room
        let others: Vec<ParticipantId> = self
            .registry
            .room_members(&message.room)
            .await
            .into_iter()
            .map(|member| member.id)
            .filter(|id| id != &sender.id)
            .collect();
        deliver(
            self.pusher.as_ref(),
            &others,
            &OutboundEvent::Broadcast {
                sender: sender.name.clone(),
                text: message.text.clone(),
            },
        )
        .await;

        // 2. Trigger detection
        let Some(question) = self.config.trigger.extract_question(&message.text) else {
            return Ok(RelayOutcome::Broadcast {
                recipients: others.len(),
            });
        };
        tracing::info!(
            "Trigger from '{}' ({}) in room '{}'",
            sender.name,
            sender.id,
            message.room
        );

        // 3. Stream to the target set
        let lane = self.acquire_lane(&message.room).await;
        let requester = Requester {
            id: &sender.id,
            request_id: message.request_id,
        };
        let outcome = self.answer(&sender, &message.room, question, requester).await;
        if let Some(guard) = lane {
            drop(guard);
            self.release_lane(&message.room).await;
        }
        Ok(outcome)
    }

    async fn answer(
        &self,
        sender: &Participant,
        room: &RoomName,
        question: &str,
        requester: Requester<'_>,
    ) -> RelayOutcome {
        let targets = self.stream_targets(sender, room).await;

        match (question.is_empty(), &self.generator) {
            (true, _) => {
                self.reject(&targets, requester, RejectReason::EmptyQuestion)
                    .await
            }
            (false, None) => {
                self.reject(&targets, requester, RejectReason::BackendUnavailable)
                    .await
            }
            (false, Some(generator)) => {
                self.stream(generator.as_ref(), question, &targets, requester)
                    .await
            }
        }
    }

    async fn acquire_lane(&self, room: &RoomName) -> Option<OwnedMutexGuard<()>> {
        if self.config.scope != DeliveryScope::Room {
            return None;
        }
        let lane = {
            let mut lanes = self.lanes.lock().await;
            lanes.entry(room.clone()).or_default().clone()
        };
        Some(lane.lock_owned().await)
    }

    /// Forget the room's lane once no other trigger holds or waits for it.
    ///
    /// Waiters clone the lane while holding the map lock, so the count read
    /// here cannot race with a new waiter.
    async fn release_lane(&self, room: &RoomName) {
        let mut lanes = self.lanes.lock().await;
        if lanes
            .get(room)
            .is_some_and(|lane| Arc::strong_count(lane) == 1)
        {
            lanes.remove(room);
        }
    }

    async fn stream_targets(&self, sender: &Participant, room: &RoomName) -> Vec<ParticipantId> {
        match self.config.scope {
            DeliveryScope::Sender => vec![sender.id.clone()],
            DeliveryScope::Room => self
                .registry
                .room_members(room)
                .await
                .into_iter()
                .map(|member| member.id)
                .collect(),
        }
    }

    async fn reject(
        &self,
        targets: &[ParticipantId],
        requester: Requester<'_>,
        reason: RejectReason,
    ) -> RelayOutcome {
        let message = reason.message(&self.config.trigger);
        tracing::info!("Trigger rejected: {}", message);
        self.close_stream(targets, requester, |request_id| {
            OutboundEvent::StreamError {
                reason: message.clone(),
                request_id,
            }
        })
        .await;
        RelayOutcome::Rejected { reason }
    }

    /// Deliver the event that closes a stream. Only the requester's copy
    /// carries its request id.
    async fn close_stream(
        &self,
        targets: &[ParticipantId],
        requester: Requester<'_>,
        event: impl Fn(Option<u64>) -> OutboundEvent,
    ) {
        let (own, others): (Vec<ParticipantId>, Vec<ParticipantId>) =
            targets.iter().cloned().partition(|id| id == requester.id);
        deliver(self.pusher.as_ref(), &own, &event(requester.request_id)).await;
        deliver(self.pusher.as_ref(), &others, &event(None)).await;
    }

    async fn stream(
        &self,
        generator: &dyn TextGenerator,
        question: &str,
        targets: &[ParticipantId],
        requester: Requester<'_>,
    ) -> RelayOutcome {
        let mut chunks = with_pull_timeout(generator.generate(question), self.config.pull_timeout);
        let mut emitted = 0;

        while let Some(item) = chunks.next().await {
            match item {
                Ok(text) if text.is_empty() => {}
                Ok(text) => {
                    deliver(
                        self.pusher.as_ref(),
                        targets,
                        &OutboundEvent::StreamChunk { text },
                    )
                    .await;
                    emitted += 1;
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::warn!("Generation failed after {} chunks: {}", emitted, reason);
                    self.close_stream(targets, requester, |request_id| {
                        OutboundEvent::StreamError {
                            reason: reason.clone(),
                            request_id,
                        }
                    })
                    .await;
                    return RelayOutcome::Failed {
                        chunks: emitted,
                        reason,
                    };
                }
            }
        }

        self.close_stream(targets, requester, |request_id| {
            OutboundEvent::StreamEnd { request_id }
        })
        .await;
        tracing::info!("Stream finished after {} chunks", emitted);
        RelayOutcome::Streamed { chunks: emitted }
    }
}
