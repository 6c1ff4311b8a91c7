//! UseCase: Ingest webhook 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - IngestUseCase::on_publish() / on_unpublish() メソッド
//! - isLive の更新と RoomStatusEvent の発行
//!
//! ### なぜこのテストが必要か
//! - 未知の stream key で publish されたときにルームが変化しないことを保証
//! - unpublish は常に成功し、メディアサーバーの切断処理を妨げないことを保証
//! - 実際に状態が変化したときだけイベントが発行されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：offline → live → offline の遷移
//! - 異常系：未知・欠落した stream key、ストア障害
//! - エッジケース：既に live のルームへの publish、offline のルームへの unpublish

use std::sync::Arc;

use crate::domain::{RoomRepository, StatusEventBus, StreamKey};

use super::{error::IngestError, sequencer::RoomSequencer};

/// publish webhook の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// offline から live に遷移した
    WentLive,
    /// 既に live だった
    AlreadyLive,
}

/// unpublish webhook の結果（常に成功として扱う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpublishOutcome {
    WentOffline,
    AlreadyOffline,
    UnknownStreamKey,
    /// ストア障害。ログに記録して破棄した
    Dropped,
}

/// Ingest webhook のユースケース
pub struct IngestUseCase {
    rooms: Arc<dyn RoomRepository>,
    status_bus: Arc<dyn StatusEventBus>,
    sequencer: Arc<RoomSequencer>,
}

impl IngestUseCase {
    /// 新しい IngestUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        status_bus: Arc<dyn StatusEventBus>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            rooms,
            status_bus,
            sequencer,
        }
    }

    /// 配信開始の通知
    ///
    /// 未知の stream key は拒否する（メディアサーバーはストリームを受け付けない）。
    pub async fn on_publish(
        &self,
        stream_key: Option<String>,
    ) -> Result<PublishOutcome, IngestError> {
        let raw = non_empty(stream_key).ok_or(IngestError::MissingStreamKey)?;
        let key = StreamKey::new(raw).map_err(|_| IngestError::UnknownStreamKey)?;

        let room = self
            .rooms
            .find_by_stream_key(&key)
            .await?
            .ok_or(IngestError::UnknownStreamKey)?;

        // 状態の更新とイベントの発行をルーム単位で直列化する
        let _guard = self.sequencer.lock(&room.id).await;
        if !self.rooms.set_live(&room.id, true).await? {
            tracing::debug!("Room '{}' is already live", room.slug);
            return Ok(PublishOutcome::AlreadyLive);
        }

        tracing::info!("Stream started for room '{}'", room.slug);
        self.status_bus.publish(room.status_event(true));
        Ok(PublishOutcome::WentLive)
    }

    /// 配信終了の通知
    ///
    /// 未知の stream key やストア障害でも失敗を返さない。
    /// ストア障害はログに記録し、再試行はしない。
    pub async fn on_unpublish(&self, stream_key: Option<String>) -> UnpublishOutcome {
        let Some(key) = non_empty(stream_key).and_then(|raw| StreamKey::new(raw).ok()) else {
            tracing::debug!("Unpublish without a recognizable stream key ignored");
            return UnpublishOutcome::UnknownStreamKey;
        };

        let room = match self.rooms.find_by_stream_key(&key).await {
            Ok(Some(room)) => room,
            Ok(None) => {
                tracing::debug!("Unpublish for unknown stream key ignored");
                return UnpublishOutcome::UnknownStreamKey;
            }
            Err(e) => {
                tracing::error!("Failed to look up room on unpublish: {}", e);
                return UnpublishOutcome::Dropped;
            }
        };

        let _guard = self.sequencer.lock(&room.id).await;
        match self.rooms.set_live(&room.id, false).await {
            Ok(true) => {
                tracing::info!("Stream ended for room '{}'", room.slug);
                self.status_bus.publish(room.status_event(false));
                UnpublishOutcome::WentOffline
            }
            Ok(false) => UnpublishOutcome::AlreadyOffline,
            Err(e) => {
                tracing::error!("Failed to mark room '{}' offline: {}", room.slug, e);
                UnpublishOutcome::Dropped
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
