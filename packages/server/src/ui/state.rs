//! Server state shared by every handler.

use crate::usecase::{
    ConnectViewerUseCase, DisconnectViewerUseCase, IngestUseCase, RoomAdminUseCase,
    SendMessageUseCase,
};
use std::sync::Arc;

/// Values the handlers need besides the usecases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Expected value of the `x-admin-token` header
    pub admin_token: String,
    /// HLS playlist base, without a trailing slash
    pub hls_base_url: String,
}

/// Shared application state
pub struct AppState {
    /// ConnectViewerUseCase（視聴者接続のユースケース）
    pub connect_viewer_usecase: Arc<ConnectViewerUseCase>,
    /// SendMessageUseCase（チャット送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectViewerUseCase（視聴者切断のユースケース）
    pub disconnect_viewer_usecase: Arc<DisconnectViewerUseCase>,
    /// IngestUseCase（配信開始・終了 webhook のユースケース）
    pub ingest_usecase: Arc<IngestUseCase>,
    /// RoomAdminUseCase（ルーム管理のユースケース）
    pub room_admin_usecase: Arc<RoomAdminUseCase>,
    pub settings: ServerSettings,
}
