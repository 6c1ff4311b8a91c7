//! Domain entities.

use super::value_object::{
    DisplayName, MessageContent, MessageId, PlaybackKey, RoomId, RoomName, SessionId, Slug,
    StreamKey, Timestamp,
};

/// A watch-party room.
///
/// Pairs one ingest secret (`stream_key`) with one viewer-access secret
/// (`playback_key`). `slug` and `stream_key` are globally unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub slug: Slug,
    pub name: RoomName,
    pub stream_key: StreamKey,
    pub playback_key: PlaybackKey,
    pub is_live: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    /// Create a new, offline room.
    pub fn new(
        name: RoomName,
        slug: Slug,
        stream_key: StreamKey,
        playback_key: PlaybackKey,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RoomId::generate(),
            slug,
            name,
            stream_key,
            playback_key,
            is_live: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `token` is the room's current playback capability.
    pub fn authorizes_playback(&self, token: &PlaybackKey) -> bool {
        &self.playback_key == token
    }

    /// Replace both secrets. A rotated room is never live until re-published.
    pub fn rotate_keys(&mut self, stream_key: StreamKey, playback_key: PlaybackKey, now: Timestamp) {
        self.stream_key = stream_key;
        self.playback_key = playback_key;
        self.is_live = false;
        self.updated_at = now;
    }

    pub fn status_event(&self, is_live: bool) -> RoomStatusEvent {
        RoomStatusEvent {
            room_id: self.id,
            slug: self.slug.clone(),
            is_live,
        }
    }
}

/// A persisted chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author: DisplayName,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

/// A chat message that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub room_id: RoomId,
    pub author: DisplayName,
    pub content: MessageContent,
}

/// Liveness transition of a room, carried on the status bus. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStatusEvent {
    pub room_id: RoomId,
    pub slug: Slug,
    pub is_live: bool,
}

/// One authenticated viewer connection.
///
/// Created once at successful authentication and dropped on disconnect.
/// Channel membership is tracked by the message pusher, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    pub id: SessionId,
    pub room_id: RoomId,
    pub slug: Slug,
    pub display_name: DisplayName,
    pub playback_token: PlaybackKey,
}
