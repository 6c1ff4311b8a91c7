//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// 視聴者接続（ハンドシェイク）のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectError {
    /// slug / token / displayName が不正
    #[error("invalid handshake: {0}")]
    InvalidHandshake(#[from] ValueObjectError),

    /// ルームが存在しない、または playback token が一致しない
    ///
    /// 両者は区別しない（ルームの存在を漏らさないため）。
    #[error("unauthorized")]
    Unauthorized,

    #[error("persistence unavailable: {0}")]
    Persistence(String),
}

/// チャット送信のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SendMessageError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("persistence unavailable: {0}")]
    Persistence(String),
}

impl SendMessageError {
    /// ack に載せるエラー文字列
    pub fn ack_reason(&self) -> &'static str {
        match self {
            SendMessageError::InvalidPayload(_) => "invalid payload",
            SendMessageError::Persistence(_) => "failed to persist message",
        }
    }
}

/// Ingest webhook のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("missing stream key")]
    MissingStreamKey,

    #[error("unknown stream key")]
    UnknownStreamKey,

    #[error("persistence unavailable: {0}")]
    Persistence(String),
}

/// ルーム管理 API のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomAdminError {
    #[error("{0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("room not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("persistence unavailable: {0}")]
    Persistence(String),
}

impl From<RepositoryError> for RoomAdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => RoomAdminError::NotFound,
            RepositoryError::Conflict(reason) => RoomAdminError::Conflict(reason),
            RepositoryError::Unavailable(reason) => RoomAdminError::Persistence(reason),
        }
    }
}

impl From<RepositoryError> for ConnectError {
    fn from(err: RepositoryError) -> Self {
        ConnectError::Persistence(err.to_string())
    }
}

impl From<RepositoryError> for IngestError {
    fn from(err: RepositoryError) -> Self {
        IngestError::Persistence(err.to_string())
    }
}
