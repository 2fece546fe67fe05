//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{Participant, RoomName, SessionRegistry};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者のいるルームをルーム名順に返す
    pub async fn execute(&self) -> Vec<(RoomName, Vec<Participant>)> {
        self.registry.rooms().await
    }
}
