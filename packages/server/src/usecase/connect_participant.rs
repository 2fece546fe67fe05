//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の接続処理（ID 採番、レジストリ登録、入室通知）
//!
//! ### なぜこのテストが必要か
//! - 接続ごとに一意の ID が割り当てられることを保証
//! - 同じルームの既存参加者にのみ入室が通知されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の接続
//! - エッジケース：別ルームの参加者には通知しない

use std::sync::Arc;

use hibiki_shared::time::Clock;

use crate::domain::{
    DisplayName, EventPusher, OutboundEvent, Participant, ParticipantId, PusherChannel, RoomName,
    SessionRegistry, Timestamp, deliver,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn EventPusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        pusher: Arc<dyn EventPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            pusher,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `name` - 表示名（Domain Model）
    /// * `room` - 入室するルーム（Domain Model）
    /// * `sender` - クライアントへのイベント送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 接続成功（採番された ID を含む参加者）
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        name: DisplayName,
        room: RoomName,
        sender: PusherChannel,
    ) -> Result<Participant, ConnectError> {
        let participant = Participant::new(
            ParticipantId::generate(),
            name,
            room,
            Timestamp::new(self.clock.now_millis()),
        );

        // 1. レジストリに登録
        self.registry.register(participant.clone()).await?;

        // 2. Pusher に送信チャンネルを登録
        self.pusher
            .register_client(participant.id.clone(), sender)
            .await;

        // 3. 同じルームの既存参加者に入室を通知
        let others: Vec<ParticipantId> = self
            .registry
            .room_members(&participant.room)
            .await
            .into_iter()
            .map(|member| member.id)
            .filter(|id| id != &participant.id)
            .collect();
        deliver(
            self.pusher.as_ref(),
            &others,
            &OutboundEvent::ParticipantJoined {
                name: participant.name.clone(),
            },
        )
        .await;

        Ok(participant)
    }
}
