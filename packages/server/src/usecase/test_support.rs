//! Test doubles shared by the usecase tests.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{
        ChunkStream, DisplayName, EventPusher, GenerationError, OutboundEvent, Participant,
        ParticipantId, PushError, PusherChannel, RoomName, SessionRegistry, TextGenerator,
        Timestamp,
    },
    infrastructure::registry::InMemorySessionRegistry,
};

/// Records every pushed event in order. Pushes to ids in `failing` fail.
#[derive(Default)]
pub struct RecordingPusher {
    events: Mutex<Vec<(ParticipantId, OutboundEvent)>>,
    registered: Mutex<Vec<ParticipantId>>,
    failing: HashSet<ParticipantId>,
}

impl RecordingPusher {
    pub fn failing_for(ids: &[&ParticipantId]) -> Self {
        Self {
            failing: ids.iter().map(|id| (*id).clone()).collect(),
            ..Self::default()
        }
    }

    /// Events received by `id`, in order
    pub fn events_for(&self, id: &ParticipantId) -> Vec<OutboundEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| target == id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn registered(&self) -> Vec<ParticipantId> {
        self.registered.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPusher for RecordingPusher {
    async fn register_client(&self, id: ParticipantId, _sender: PusherChannel) {
        self.registered.lock().unwrap().push(id);
    }

    async fn unregister_client(&self, id: &ParticipantId) {
        self.registered.lock().unwrap().retain(|registered| registered != id);
    }

    async fn push_to(&self, id: &ParticipantId, event: &OutboundEvent) -> Result<(), PushError> {
        if self.failing.contains(id) {
            return Err(PushError::PushFailed(format!("{} is gone", id)));
        }
        self.events.lock().unwrap().push((id.clone(), event.clone()));
        Ok(())
    }
}

/// Replays a fixed script of chunks for every question
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Vec<Result<String, GenerationError>>,
    delay: Option<Duration>,
    stall_at_end: bool,
    questions: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| Ok(c.to_string())).collect())
    }

    /// Sleep before every chunk
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Never finish after the script is exhausted
    pub fn stalling(mut self) -> Self {
        self.stall_at_end = true;
        self
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, question: &str) -> ChunkStream {
        self.questions.lock().unwrap().push(question.to_string());
        let script = self.script.clone();
        let delay = self.delay;
        let stall_at_end = self.stall_at_end;
        Box::pin(async_stream::stream! {
            for item in script {
                match delay {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => tokio::task::yield_now().await,
                }
                yield item;
            }
            if stall_at_end {
                futures_util::future::pending::<()>().await;
            }
        })
    }
}

pub fn participant_id(raw: &str) -> ParticipantId {
    ParticipantId::new(raw.to_string()).unwrap()
}

/// Register `(id, name)` pairs in `room`, joined in the given order
pub async fn registry_with(room: &str, members: &[(&str, &str)]) -> Arc<InMemorySessionRegistry> {
    let registry = Arc::new(InMemorySessionRegistry::new());
    for (order, (id, name)) in members.iter().enumerate() {
        registry
            .register(Participant::new(
                participant_id(id),
                DisplayName::parse(Some(name)).unwrap(),
                RoomName::new(room).unwrap(),
                Timestamp::new(1000 + order as i64),
            ))
            .await
            .unwrap();
    }
    registry
}
