//! JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    infrastructure::dto::http::ErrorResponseDto,
    usecase::{ConnectError, IngestError, RoomAdminError},
};

/// Error returned by HTTP handlers, rendered as `{error, status}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponseDto {
            error: self.message,
            status: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<RoomAdminError> for ApiError {
    fn from(err: RoomAdminError) -> Self {
        match err {
            RoomAdminError::InvalidInput(e) => Self::bad_request(e.to_string()),
            RoomAdminError::NotFound => Self::not_found("room not found"),
            RoomAdminError::Conflict(reason) => {
                tracing::warn!("Room conflict: {}", reason);
                Self::new(StatusCode::CONFLICT, "room already exists")
            }
            RoomAdminError::Persistence(reason) => {
                tracing::error!("Room store failure: {}", reason);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
            }
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::InvalidHandshake(_) | ConnectError::Unauthorized => Self::unauthorized(),
            ConnectError::Persistence(reason) => {
                tracing::error!("Handshake aborted by store failure: {}", reason);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
            }
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingStreamKey => Self::bad_request("missing stream key"),
            IngestError::UnknownStreamKey => Self::new(StatusCode::FORBIDDEN, "unknown stream key"),
            IngestError::Persistence(reason) => {
                tracing::error!("Publish webhook failed: {}", reason);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
            }
        }
    }
}
