//! SQLite Room Repository 実装
//!
//! `sqlx` の SqlitePool を使ってルームとメッセージ履歴を永続化します。
//! スキーマは起動時に `CREATE TABLE IF NOT EXISTS` で用意します。

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use streamcircle_shared::time::Clock;

use crate::domain::{
    ChatMessage, DisplayName, MessageContent, MessageId, MessageRepository, NewChatMessage,
    PlaybackKey, RepositoryError, Room, RoomId, RoomName, RoomRepository, Slug, StreamKey,
    Timestamp, ValueObjectError,
};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        stream_key TEXT NOT NULL UNIQUE,
        playback_key TEXT NOT NULL,
        is_live INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY NOT NULL,
        room_id TEXT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
        author TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS messages_room_id_idx ON messages (room_id)",
];

const ROOM_COLUMNS: &str =
    "id,slug,name,stream_key,playback_key,is_live,created_at,updated_at";

type RoomRow = (String, String, String, String, String, bool, i64, i64);
type MessageRow = (String, String, String, String, i64);

/// SQLite Room Repository 実装
pub struct SqliteRoomRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteRoomRepository {
    /// `database_url` に接続し、スキーマを用意する
    ///
    /// ファイルが存在しない場合は作成します。
    pub async fn connect(database_url: &str, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        // `sqlite::memory:` は接続ごとに別 DB になるため 1 接続に固定する
        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        Self::from_pool(pool, clock).await
    }

    /// 既存のプールから作成し、スキーマを用意する
    pub async fn from_pool(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        tracing::debug!("SQLite schema ready");
        Ok(Self { pool, clock })
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id=?", ROOM_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        row.map(room_from_row).transpose()
    }
}

/// sqlx のエラーをリポジトリエラーに変換
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(db_err.message().to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            RepositoryError::NotFound
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        _ => RepositoryError::Unavailable(err.to_string()),
    }
}

fn corrupt_row(err: ValueObjectError) -> RepositoryError {
    RepositoryError::Unavailable(format!("corrupt row: {}", err))
}

fn room_from_row(row: RoomRow) -> Result<Room, RepositoryError> {
    let (id, slug, name, stream_key, playback_key, is_live, created_at, updated_at) = row;
    Ok(Room {
        id: RoomId::parse(&id).map_err(corrupt_row)?,
        slug: Slug::new(slug).map_err(corrupt_row)?,
        name: RoomName::new(name).map_err(corrupt_row)?,
        stream_key: StreamKey::new(stream_key).map_err(corrupt_row)?,
        playback_key: PlaybackKey::new(playback_key).map_err(corrupt_row)?,
        is_live,
        created_at: Timestamp::new(created_at),
        updated_at: Timestamp::new(updated_at),
    })
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, RepositoryError> {
    let (id, room_id, author, content, created_at) = row;
    Ok(ChatMessage {
        id: MessageId::parse(&id).map_err(corrupt_row)?,
        room_id: RoomId::parse(&room_id).map_err(corrupt_row)?,
        author: DisplayName::new(author).map_err(corrupt_row)?,
        content: MessageContent::new(content).map_err(corrupt_row)?,
        created_at: Timestamp::new(created_at),
    })
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn create_room(&self, room: Room) -> Result<Room, RepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO rooms ({}) VALUES (?,?,?,?,?,?,?,?)",
            ROOM_COLUMNS
        ))
        .bind(room.id.to_string())
        .bind(room.slug.as_str())
        .bind(room.name.as_str())
        .bind(room.stream_key.as_str())
        .bind(room.playback_key.as_str())
        .bind(room.is_live)
        .bind(room.created_at.value())
        .bind(room.updated_at.value())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let rows: Vec<RoomRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rooms ORDER BY created_at DESC, rowid DESC",
            ROOM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.into_iter().map(room_from_row).collect()
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Room>, RepositoryError> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {} FROM rooms WHERE slug=?", ROOM_COLUMNS))
                .bind(slug.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        row.map(room_from_row).transpose()
    }

    async fn find_by_stream_key(&self, key: &StreamKey) -> Result<Option<Room>, RepositoryError> {
        let row: Option<RoomRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rooms WHERE stream_key=?",
            ROOM_COLUMNS
        ))
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.map(room_from_row).transpose()
    }

    async fn set_live(&self, id: &RoomId, is_live: bool) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE rooms SET is_live=?, updated_at=? WHERE id=? AND is_live<>?")
                .bind(is_live)
                .bind(self.now().value())
                .bind(id.to_string())
                .bind(is_live)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn rotate_keys(
        &self,
        id: &RoomId,
        stream_key: StreamKey,
        playback_key: PlaybackKey,
    ) -> Result<Room, RepositoryError> {
        let result = sqlx::query(
            "UPDATE rooms SET stream_key=?, playback_key=?, is_live=0, updated_at=? WHERE id=?",
        )
        .bind(stream_key.as_str())
        .bind(playback_key.as_str())
        .bind(self.now().value())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl MessageRepository for SqliteRoomRepository {
    async fn insert_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let stored = ChatMessage {
            id: MessageId::generate(),
            room_id: message.room_id,
            author: message.author,
            content: message.content,
            created_at: self.now(),
        };

        sqlx::query(
            "INSERT INTO messages (id,room_id,author,content,created_at) VALUES (?,?,?,?,?)",
        )
        .bind(stored.id.to_string())
        .bind(stored.room_id.to_string())
        .bind(stored.author.as_str())
        .bind(stored.content.as_str())
        .bind(stored.created_at.value())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(stored)
    }

    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"SELECT id,room_id,author,content,created_at FROM (
                SELECT rowid AS seq,id,room_id,author,content,created_at
                FROM messages WHERE room_id=? ORDER BY rowid DESC LIMIT ?
            ) ORDER BY seq ASC"#,
        )
        .bind(room_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.into_iter().map(message_from_row).collect()
    }
}
