//! UseCase: ルームディレクトリの管理（作成・一覧・参加情報・キーのローテーション）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RoomAdminUseCase の各メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成されたルームの slug とキーの形式を保証
//! - ローテーションで isLive が false に戻り、古いキーが無効になることを保証
//! - 入力エラーと存在しないルームが区別されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成 → 一覧 → 参加 → ローテーション
//! - 異常系：短すぎる名前、存在しない slug、ストア障害

use std::sync::Arc;

use streamcircle_shared::time::Clock;

use crate::domain::{
    ChatMessage, DisplayName, HISTORY_LIMIT, MessageRepository, RepositoryError, Room,
    RoomKeyFactory, RoomName, RoomRepository, Slug, SlugFactory, Timestamp,
};

use super::error::RoomAdminError;

/// slug / stream key の衝突時に作り直す回数
const CREATE_ATTEMPTS: usize = 3;

/// ルーム参加の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub room: Room,
    pub display_name: DisplayName,
}

/// ルーム管理のユースケース
pub struct RoomAdminUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
}

impl RoomAdminUseCase {
    /// 新しい RoomAdminUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            messages,
            clock,
        }
    }

    /// ルームを作成し、stream key と playback key を発行する
    pub async fn create_room(&self, name: String) -> Result<Room, RoomAdminError> {
        let name = RoomName::new(name)?;

        let mut attempt = 1;
        loop {
            let room = Room::new(
                name.clone(),
                SlugFactory::from_name(&name)?,
                RoomKeyFactory::stream_key()?,
                RoomKeyFactory::playback_key()?,
                Timestamp::new(self.clock.now_millis()),
            );
            match self.rooms.create_room(room).await {
                Ok(room) => {
                    tracing::info!("Room '{}' created ({})", room.slug, room.id);
                    return Ok(room);
                }
                Err(RepositoryError::Conflict(reason)) if attempt < CREATE_ATTEMPTS => {
                    tracing::warn!("Generated room collided ({}), retrying", reason);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 全ルームを新しい順に取得
    pub async fn list_rooms(&self) -> Result<Vec<Room>, RoomAdminError> {
        Ok(self.rooms.list_rooms().await?)
    }

    /// slug でルームを取得
    pub async fn get_room(&self, slug: String) -> Result<Room, RoomAdminError> {
        // 形式が不正な slug のルームは存在し得ない
        let slug = Slug::new(slug).map_err(|_| RoomAdminError::NotFound)?;
        self.rooms
            .find_by_slug(&slug)
            .await?
            .ok_or(RoomAdminError::NotFound)
    }

    /// 参加に必要なチャット資格情報（現在の playback key）を返す
    pub async fn join_room(
        &self,
        slug: String,
        display_name: String,
    ) -> Result<JoinedRoom, RoomAdminError> {
        let room = self.get_room(slug).await?;
        let display_name = DisplayName::new(display_name)?;
        Ok(JoinedRoom { room, display_name })
    }

    /// stream key と playback key を再発行する
    ///
    /// isLive は false に戻る。ステータスイベントは発行せず、接続中の
    /// セッションも切断しない。
    pub async fn rotate_keys(&self, slug: String) -> Result<Room, RoomAdminError> {
        let room = self.get_room(slug).await?;
        let rotated = self
            .rooms
            .rotate_keys(
                &room.id,
                RoomKeyFactory::stream_key()?,
                RoomKeyFactory::playback_key()?,
            )
            .await?;
        tracing::info!("Keys rotated for room '{}'", rotated.slug);
        Ok(rotated)
    }

    /// 直近のメッセージ（最大 50 件、古い順）
    pub async fn recent_messages(&self, slug: String) -> Result<Vec<ChatMessage>, RoomAdminError> {
        let room = self.get_room(slug).await?;
        Ok(self
            .messages
            .recent_messages(&room.id, HISTORY_LIMIT)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessageRepository, MockRoomRepository, NewChatMessage, MessageContent},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use streamcircle_shared::time::FixedClock;

    fn create_usecase() -> (RoomAdminUseCase, Arc<InMemoryRoomRepository>) {
        let clock = Arc::new(FixedClock::new(1_700_000_000_000));
        let repository = Arc::new(InMemoryRoomRepository::with_clock(clock.clone()));
        let usecase = RoomAdminUseCase::new(repository.clone(), repository.clone(), clock);
        (usecase, repository)
    }

    #[tokio::test]
    async fn test_create_room_generates_slug_and_keys() {
        // テスト項目: 作成されたルームは offline で、slug とキーが生成されている
        // given (前提条件):
        let (usecase, _repository) = create_usecase();

        // when (操作):
        let room = usecase.create_room("Jam Night".to_string()).await.unwrap();

        // then (期待する結果):
        assert!(!room.is_live);
        assert!(room.slug.as_str().starts_with("jam-night-"));
        assert_eq!(room.stream_key.as_str().len(), 36);
        assert_eq!(room.playback_key.as_str().len(), 36);
        assert_ne!(room.stream_key.as_str(), room.playback_key.as_str());
        assert_eq!(room.created_at, Timestamp::new(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_create_room_rejects_short_name() {
        // テスト項目: 3 文字未満の名前ではルームを作成できない
        // given (前提条件):
        let (usecase, repository) = create_usecase();

        // when (操作):
        let result = usecase.create_room("  ab ".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomAdminError::InvalidInput(_))));
        assert!(repository.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_room_retries_on_conflict() {
        // テスト項目: 生成した slug が衝突した場合は作り直し、上限を超えると Conflict
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_create_room()
            .times(CREATE_ATTEMPTS)
            .returning(|_| Err(RepositoryError::Conflict("slug".to_string())));
        let usecase = RoomAdminUseCase::new(
            Arc::new(rooms),
            Arc::new(MockMessageRepository::new()),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase.create_room("Jam Night".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomAdminError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_room_by_unknown_or_malformed_slug() {
        // テスト項目: 存在しない slug や形式が不正な slug は NotFound
        // given (前提条件):
        let (usecase, _repository) = create_usecase();

        // when (操作):
        let unknown = usecase.get_room("no-such-room".to_string()).await;
        let malformed = usecase.get_room("x".to_string()).await;

        // then (期待する結果):
        assert_eq!(unknown, Err(RoomAdminError::NotFound));
        assert_eq!(malformed, Err(RoomAdminError::NotFound));
    }

    #[tokio::test]
    async fn test_join_room_validates_display_name() {
        // テスト項目: 参加時に表示名が検証され、正しければ現在の playback key が得られる
        // given (前提条件):
        let (usecase, _repository) = create_usecase();
        let room = usecase.create_room("Jam Night".to_string()).await.unwrap();

        // when (操作):
        let joined = usecase
            .join_room(room.slug.as_str().to_string(), " Alex ".to_string())
            .await
            .unwrap();
        let blank = usecase
            .join_room(room.slug.as_str().to_string(), "   ".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(joined.display_name.as_str(), "Alex");
        assert_eq!(joined.room.playback_key, room.playback_key);
        assert!(matches!(blank, Err(RoomAdminError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rotate_keys_resets_liveness() {
        // テスト項目: ローテーションで両方のキーが変わり、isLive が false に戻る
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let room = usecase.create_room("Jam Night".to_string()).await.unwrap();
        repository.set_live(&room.id, true).await.unwrap();

        // when (操作):
        let rotated = usecase
            .rotate_keys(room.slug.as_str().to_string())
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!rotated.is_live);
        assert_ne!(rotated.stream_key, room.stream_key);
        assert_ne!(rotated.playback_key, room.playback_key);
        assert_eq!(rotated.slug, room.slug);
    }

    #[tokio::test]
    async fn test_recent_messages_for_room() {
        // テスト項目: ルームの直近のメッセージが古い順で返る
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let room = usecase.create_room("Jam Night".to_string()).await.unwrap();
        for content in ["first", "second"] {
            repository
                .insert_message(NewChatMessage {
                    room_id: room.id,
                    author: DisplayName::new("Sam".to_string()).unwrap(),
                    content: MessageContent::new(content.to_string()).unwrap(),
                })
                .await
                .unwrap();
        }

        // when (操作):
        let messages = usecase
            .recent_messages(room.slug.as_str().to_string())
            .await
            .unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_list_rooms_store_failure() {
        // テスト項目: ストア障害は Persistence として返る
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_list_rooms()
            .returning(|| Err(RepositoryError::Unavailable("db down".to_string())));
        let usecase = RoomAdminUseCase::new(
            Arc::new(rooms),
            Arc::new(MockMessageRepository::new()),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase.list_rooms().await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomAdminError::Persistence(_))));
    }
}
