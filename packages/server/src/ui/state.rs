//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::RoomName,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomsUseCase, RelayEngine,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// RelayEngine（メッセージ中継とストリーム配信）
    pub relay_engine: Arc<RelayEngine>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// Room joined when the client does not name one
    pub default_room: RoomName,
}
