//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセス（ルームディレクトリとメッセージ履歴）の
//! インターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatMessage, NewChatMessage, PlaybackKey, RepositoryError, Room, RoomId, Slug, StreamKey,
};

/// Room Repository trait
///
/// ルームの永続化を担うディレクトリへのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを新規作成（slug / stream key の重複は `Conflict`）
    async fn create_room(&self, room: Room) -> Result<Room, RepositoryError>;

    /// 全ルームを作成日時の降順で取得
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError>;

    /// slug でルームを検索
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Room>, RepositoryError>;

    /// stream key でルームを検索
    async fn find_by_stream_key(&self, key: &StreamKey) -> Result<Option<Room>, RepositoryError>;

    /// isLive を更新
    ///
    /// 値が実際に変化した場合のみ `Ok(true)` を返す（compare-and-set）。
    async fn set_live(&self, id: &RoomId, is_live: bool) -> Result<bool, RepositoryError>;

    /// stream key と playback key を差し替え、同時に isLive を false に戻す
    async fn rotate_keys(
        &self,
        id: &RoomId,
        stream_key: StreamKey,
        playback_key: PlaybackKey,
    ) -> Result<Room, RepositoryError>;
}

/// Message Repository trait
///
/// チャット履歴の永続化インターフェース。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存し、ID とサーバー時刻が付与されたメッセージを返す
    async fn insert_message(&self, message: NewChatMessage)
    -> Result<ChatMessage, RepositoryError>;

    /// ルームの直近 `limit` 件を時系列順（古い順）で取得
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
