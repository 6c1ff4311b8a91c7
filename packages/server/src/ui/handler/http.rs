//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::Room,
    infrastructure::dto::http::{
        AdminKeysDto, AdminRoomResponseDto, ChatCredentialsDto, CreateRoomRequestDto,
        JoinRoomRequestDto, JoinRoomResponseDto, MessageListResponseDto, PublicRoomDto,
        RoomListResponseDto, RoomResponseDto,
    },
    ui::{error::ApiError, extract::AdminAccess, state::AppState},
};

fn public_room(state: &AppState, room: &Room) -> PublicRoomDto {
    PublicRoomDto::from_room(room, &state.settings.hls_base_url)
}

fn admin_room(state: &AppState, room: &Room) -> AdminRoomResponseDto {
    AdminRoomResponseDto {
        room: public_room(state, room),
        admin: AdminKeysDto::from(room),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms, newest first
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomListResponseDto>, ApiError> {
    let rooms = state.room_admin_usecase.list_rooms().await?;

    // Domain Model から DTO への変換
    let rooms = rooms
        .iter()
        .map(|room| public_room(&state, room))
        .collect();
    Ok(Json(RoomListResponseDto { rooms }))
}

/// Create a room (admin only)
pub async fn create_room(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRoomRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<AdminRoomResponseDto>), ApiError> {
    let Json(request) = payload?;
    let room = state.room_admin_usecase.create_room(request.name).await?;
    Ok((StatusCode::CREATED, Json(admin_room(&state, &room))))
}

/// Get room detail by slug
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<RoomResponseDto>, ApiError> {
    let room = state.room_admin_usecase.get_room(slug).await?;
    Ok(Json(RoomResponseDto {
        room: public_room(&state, &room),
    }))
}

/// Hand out chat credentials (the current playback key) for a room
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    payload: Result<Json<JoinRoomRequestDto>, JsonRejection>,
) -> Result<Json<JoinRoomResponseDto>, ApiError> {
    let Json(request) = payload?;
    let joined = state
        .room_admin_usecase
        .join_room(slug, request.display_name)
        .await?;

    Ok(Json(JoinRoomResponseDto {
        room: public_room(&state, &joined.room),
        chat: ChatCredentialsDto {
            token: joined.room.playback_key.as_str().to_string(),
            display_name: joined.display_name.into_string(),
        },
    }))
}

/// Rotate both keys of a room (admin only)
pub async fn rotate_keys(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<AdminRoomResponseDto>, ApiError> {
    let room = state.room_admin_usecase.rotate_keys(slug).await?;
    Ok(Json(admin_room(&state, &room)))
}

/// Recent chat history of a room
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<MessageListResponseDto>, ApiError> {
    let messages = state.room_admin_usecase.recent_messages(slug).await?;
    Ok(Json(MessageListResponseDto {
        messages: messages.iter().map(Into::into).collect(),
    }))
}

/// Unknown routes
pub async fn fallback() -> ApiError {
    ApiError::not_found("not found")
}
