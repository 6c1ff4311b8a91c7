//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する `RoomRepository` / `MessageRepository` trait の具体的な実装。
//! Vec をインメモリ DB として使用します。プロセス終了とともにデータは失われます。

use std::sync::Arc;

use async_trait::async_trait;
use streamcircle_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageId, MessageRepository, NewChatMessage, PlaybackKey, RepositoryError, Room,
    RoomId, RoomRepository, Slug, StreamKey, Timestamp,
};

#[derive(Default)]
struct Store {
    rooms: Vec<Room>,
    /// 挿入順（＝時系列順）
    messages: Vec<ChatMessage>,
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// システム時計を使う InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 保存済みメッセージの総数
    pub async fn count_messages(&self) -> usize {
        self.store.lock().await.messages.len()
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, room: Room) -> Result<Room, RepositoryError> {
        let mut store = self.store.lock().await;
        if store.rooms.iter().any(|r| r.slug == room.slug) {
            return Err(RepositoryError::Conflict(format!(
                "slug '{}' already exists",
                room.slug
            )));
        }
        if store.rooms.iter().any(|r| r.stream_key == room.stream_key) {
            return Err(RepositoryError::Conflict(
                "stream key already exists".to_string(),
            ));
        }
        store.rooms.push(room.clone());
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let store = self.store.lock().await;
        // 新しく作成されたものが先（同時刻は後から追加されたものが先）
        let mut rooms: Vec<Room> = store.rooms.iter().rev().cloned().collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.rooms.iter().find(|r| &r.slug == slug).cloned())
    }

    async fn find_by_stream_key(&self, key: &StreamKey) -> Result<Option<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.rooms.iter().find(|r| &r.stream_key == key).cloned())
    }

    async fn set_live(&self, id: &RoomId, is_live: bool) -> Result<bool, RepositoryError> {
        let now = self.now();
        let mut store = self.store.lock().await;
        let room = store
            .rooms
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if room.is_live == is_live {
            return Ok(false);
        }
        room.is_live = is_live;
        room.updated_at = now;
        Ok(true)
    }

    async fn rotate_keys(
        &self,
        id: &RoomId,
        stream_key: StreamKey,
        playback_key: PlaybackKey,
    ) -> Result<Room, RepositoryError> {
        let now = self.now();
        let mut store = self.store.lock().await;
        if store
            .rooms
            .iter()
            .any(|r| &r.id != id && r.stream_key == stream_key)
        {
            return Err(RepositoryError::Conflict(
                "stream key already exists".to_string(),
            ));
        }

        let room = store
            .rooms
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        room.rotate_keys(stream_key, playback_key, now);
        Ok(room.clone())
    }
}

#[async_trait]
impl MessageRepository for InMemoryRoomRepository {
    async fn insert_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let now = self.now();
        let mut store = self.store.lock().await;
        if !store.rooms.iter().any(|r| r.id == message.room_id) {
            return Err(RepositoryError::NotFound);
        }

        let stored = ChatMessage {
            id: MessageId::generate(),
            room_id: message.room_id,
            author: message.author,
            content: message.content,
            created_at: now,
        };
        store.messages.push(stored.clone());
        Ok(stored)
    }

    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let store = self.store.lock().await;
        let mut recent: Vec<ChatMessage> = store
            .messages
            .iter()
            .rev()
            .filter(|m| &m.room_id == room_id)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MessageContent, RoomName};
    use streamcircle_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルームの作成・検索・一意性制約
    // - isLive の compare-and-set
    // - キーのローテーションと isLive のリセット
    // - メッセージ履歴の件数制限と時系列順
    //
    // 【なぜこのテストが必要か】
    // - SQLite 実装と同じ契約をテストと開発用サーバーで満たす必要がある
    // ========================================

    fn create_test_repository() -> InMemoryRoomRepository {
        InMemoryRoomRepository::with_clock(Arc::new(FixedClock::new(1000)))
    }

    fn create_test_room(slug: &str, stream_key: &str) -> Room {
        Room::new(
            RoomName::new("Jam Night".to_string()).unwrap(),
            Slug::new(slug.to_string()).unwrap(),
            StreamKey::new(stream_key.to_string()).unwrap(),
            PlaybackKey::new("ABC1234567".to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn new_message(room_id: RoomId, content: &str) -> NewChatMessage {
        NewChatMessage {
            room_id,
            author: DisplayName::new("Alex".to_string()).unwrap(),
            content: MessageContent::new(content.to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_room() {
        // テスト項目: 作成したルームを slug と stream key で検索できる
        // given (前提条件):
        let repo = create_test_repository();
        let room = create_test_room("jam-night", "stream-1");

        // when (操作):
        repo.create_room(room.clone()).await.unwrap();

        // then (期待する結果):
        let by_slug = repo.find_by_slug(&room.slug).await.unwrap();
        let by_key = repo.find_by_stream_key(&room.stream_key).await.unwrap();
        assert_eq!(by_slug, Some(room.clone()));
        assert_eq!(by_key, Some(room));
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicates() {
        // テスト項目: slug または stream key が重複するルームは作成できない
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_room(create_test_room("jam-night", "stream-1"))
            .await
            .unwrap();

        // when (操作):
        let same_slug = repo
            .create_room(create_test_room("jam-night", "stream-2"))
            .await;
        let same_key = repo
            .create_room(create_test_room("other-room", "stream-1"))
            .await;

        // then (期待する結果):
        assert!(matches!(same_slug, Err(RepositoryError::Conflict(_))));
        assert!(matches!(same_key, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_live_reports_transitions_only() {
        // テスト項目: isLive が実際に変化したときのみ true が返る
        // given (前提条件):
        let repo = create_test_repository();
        let room = repo
            .create_room(create_test_room("jam-night", "stream-1"))
            .await
            .unwrap();

        // when (操作):
        let first = repo.set_live(&room.id, true).await.unwrap();
        let second = repo.set_live(&room.id, true).await.unwrap();
        let third = repo.set_live(&room.id, false).await.unwrap();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(third);
    }

    #[tokio::test]
    async fn test_set_live_on_unknown_room() {
        // テスト項目: 存在しないルームの isLive 更新は NotFound
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo.set_live(&RoomId::generate(), true).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_rotate_keys_resets_liveness() {
        // テスト項目: キーのローテーションで新しいキーが保存され isLive が false になる
        // given (前提条件):
        let repo = create_test_repository();
        let room = repo
            .create_room(create_test_room("jam-night", "stream-1"))
            .await
            .unwrap();
        repo.set_live(&room.id, true).await.unwrap();

        // when (操作):
        let rotated = repo
            .rotate_keys(
                &room.id,
                StreamKey::new("stream-2".to_string()).unwrap(),
                PlaybackKey::new("NEW1234567".to_string()).unwrap(),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!rotated.is_live);
        assert_eq!(rotated.stream_key.as_str(), "stream-2");
        assert!(
            repo.find_by_stream_key(&room.stream_key)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_recent_messages_are_capped_and_chronological() {
        // テスト項目: 履歴は直近 limit 件が古い順で返り、他のルームのメッセージは含まれない
        // given (前提条件):
        let repo = create_test_repository();
        let room = repo
            .create_room(create_test_room("jam-night", "stream-1"))
            .await
            .unwrap();
        let other = repo
            .create_room(create_test_room("other-room", "stream-2"))
            .await
            .unwrap();
        for i in 0..5 {
            repo.insert_message(new_message(room.id, &format!("message {}", i)))
                .await
                .unwrap();
        }
        repo.insert_message(new_message(other.id, "elsewhere"))
            .await
            .unwrap();

        // when (操作):
        let recent = repo.recent_messages(&room.id, 3).await.unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    }

    #[tokio::test]
    async fn test_insert_message_for_unknown_room() {
        // テスト項目: 存在しないルームへのメッセージ保存は NotFound
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo
            .insert_message(new_message(RoomId::generate(), "hi"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::NotFound));
        assert_eq!(repo.count_messages().await, 0);
    }
}
