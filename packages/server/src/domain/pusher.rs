//! Event delivery port.
//!
//! Delivery is per recipient: a failure for one participant never prevents
//! delivery to the others.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{entity::OutboundEvent, error::PushError, value_object::ParticipantId};

/// Outbound channel of one connection. Carries encoded frames.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPusher: Send + Sync {
    async fn register_client(&self, id: ParticipantId, sender: PusherChannel);

    async fn unregister_client(&self, id: &ParticipantId);

    async fn push_to(&self, id: &ParticipantId, event: &OutboundEvent) -> Result<(), PushError>;
}

/// Result of pushing one event to a set of recipients
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: Vec<ParticipantId>,
}

/// Push `event` to every target, logging and skipping failed recipients.
pub async fn deliver(
    pusher: &dyn EventPusher,
    targets: &[ParticipantId],
    event: &OutboundEvent,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for target in targets {
        match pusher.push_to(target, event).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!("Failed to deliver event to '{}': {}", target, e);
                report.failed.push(target.clone());
            }
        }
    }
    report
}
