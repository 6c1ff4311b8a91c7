//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ChatMessageDto;

/// Room as exposed to anyone (no secrets besides the HLS path).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicRoomDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub is_live: bool,
    pub hls_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomResponseDto {
    pub room: PublicRoomDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomListResponseDto {
    pub rooms: Vec<PublicRoomDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminKeysDto {
    pub stream_key: String,
    pub playback_key: String,
}

/// Returned by room creation and key rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminRoomResponseDto {
    pub room: PublicRoomDto,
    pub admin: AdminKeysDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatCredentialsDto {
    pub token: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinRoomResponseDto {
    pub room: PublicRoomDto,
    pub chat: ChatCredentialsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageListResponseDto {
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRoomRequestDto {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequestDto {
    pub display_name: String,
}

/// Ingest webhook parameters. Media servers send more fields; only `name`
/// (the stream key) is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamKeyParamsDto {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponseDto {
    pub error: String,
    pub status: u16,
}
