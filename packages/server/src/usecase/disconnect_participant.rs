//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の切断処理（レジストリ削除、退室通知）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と同じルームへの通知
//! - 異常系：存在しない参加者の切断試行

use std::sync::Arc;

use crate::domain::{
    EventPusher, OutboundEvent, Participant, ParticipantId, SessionRegistry, deliver,
};

use super::error::DisconnectError;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 切断した参加者
    /// * `Err(DisconnectError)` - 参加者が接続していない場合
    pub async fn execute(&self, id: &ParticipantId) -> Result<Participant, DisconnectError> {
        // 1. レジストリから削除
        let participant = self
            .registry
            .unregister(id)
            .await
            .map_err(|_| DisconnectError::NotConnected(id.to_string()))?;

        // 2. Pusher から登録解除
        self.pusher.unregister_client(id).await;

        // 3. 残りのルーム参加者に退室を通知
        let remaining: Vec<ParticipantId> = self
            .registry
            .room_members(&participant.room)
            .await
            .into_iter()
            .map(|member| member.id)
            .collect();
        deliver(
            self.pusher.as_ref(),
            &remaining,
            &OutboundEvent::ParticipantLeft {
                name: participant.name.clone(),
            },
        )
        .await;

        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayName;
    use crate::usecase::test_support::{RecordingPusher, participant_id, registry_with};

    #[tokio::test]
    async fn test_disconnect_removes_and_notifies() {
        // テスト項目: 切断した参加者が削除され、残りの参加者に退室が通知される
        // given (前提条件):
        let registry = registry_with("lobby", &[("alice", "alice"), ("bob", "bob")]).await;
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), pusher.clone());

        // when (操作):
        let left = usecase.execute(&participant_id("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(left.name.as_str(), "alice");
        assert!(registry.get(&participant_id("alice")).await.is_none());
        assert_eq!(
            pusher.events_for(&participant_id("bob")),
            vec![OutboundEvent::ParticipantLeft {
                name: DisplayName::parse(Some("alice")).unwrap()
            }]
        );
        assert!(pusher.events_for(&participant_id("alice")).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_participant() {
        // テスト項目: 接続していない参加者の切断はエラーになり、通知も送られない
        // given (前提条件):
        let registry = registry_with("lobby", &[("bob", "bob")]).await;
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = DisconnectParticipantUseCase::new(registry, pusher.clone());

        // when (操作):
        let result = usecase.execute(&participant_id("ghost")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DisconnectError::NotConnected("ghost".to_string()))
        );
        assert_eq!(pusher.total(), 0);
    }
}
