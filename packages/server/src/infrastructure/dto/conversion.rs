//! Conversion logic between domain entities and DTOs.

use streamcircle_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Room, SendAck, ViewerEvent};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&ChatMessage> for ws::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.to_string(),
            author: model.author.as_str().to_string(),
            content: model.content.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&SendAck> for ws::AckDto {
    fn from(ack: &SendAck) -> Self {
        Self {
            ack_id: ack.ack_id,
            success: ack.success,
            error: ack.error.clone(),
        }
    }
}

impl From<&ViewerEvent> for ws::ServerEvent {
    fn from(event: &ViewerEvent) -> Self {
        match event {
            ViewerEvent::History(messages) => {
                ws::ServerEvent::History(messages.iter().map(Into::into).collect())
            }
            ViewerEvent::Status { is_live } => ws::ServerEvent::Status(ws::StreamStatusDto {
                is_live: *is_live,
            }),
            ViewerEvent::Chat(message) => ws::ServerEvent::Chat(message.into()),
            ViewerEvent::Ack(ack) => ws::ServerEvent::Ack(ack.into()),
        }
    }
}

/// Encode a viewer event into one text frame.
pub fn encode_viewer_event(event: &ViewerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ws::ServerEvent::from(event))
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl http::PublicRoomDto {
    /// `hls_base_url` must not carry a trailing slash.
    pub fn from_room(room: &Room, hls_base_url: &str) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name.as_str().to_string(),
            slug: room.slug.as_str().to_string(),
            is_live: room.is_live,
            hls_url: format!("{}/{}/index.m3u8", hls_base_url, room.stream_key.as_str()),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            updated_at: timestamp_to_rfc3339(room.updated_at.value()),
        }
    }
}

impl From<&Room> for http::AdminKeysDto {
    fn from(room: &Room) -> Self {
        Self {
            stream_key: room.stream_key.as_str().to_string(),
            playback_key: room.playback_key.as_str().to_string(),
        }
    }
}
