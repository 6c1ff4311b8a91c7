//! Value objects.
//!
//! 文字列や数値をそのまま扱わず、検証済みの型としてドメイン層に持ち込むための
//! ニュータイプ群。生成時に長さなどの制約を検証し、不正な値は
//! `ValueObjectError` として拒否する。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Validate that `value` has between `min` and `max` characters (inclusive).
///
/// Lengths are counted in Unicode scalar values, not bytes.
fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValueObjectError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValueObjectError::Empty { field });
    }
    if len < min {
        return Err(ValueObjectError::TooShort { field, min });
    }
    if len > max {
        return Err(ValueObjectError::TooLong { field, max });
    }
    Ok(())
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, ValueObjectError> {
    Uuid::parse_str(value).map_err(|e| ValueObjectError::InvalidFormat {
        field,
        reason: e.to_string(),
    })
}

// ========================================
// Identifiers
// ========================================

/// Room identifier (UUID v7, time ordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(Uuid);

impl RoomId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        parse_uuid("room id", value).map(Self)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chat message identifier (UUID v7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        parse_uuid("message id", value).map(Self)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of one viewer connection. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ========================================
// Bounded strings
// ========================================

/// Human readable, unique room identifier used in URLs and channel keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 128;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        check_length("slug", &value, Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a room, as chosen by the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 100;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        check_length("room name", &value, Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Capability token authorizing RTMP ingest for one room.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StreamKey(String);

impl StreamKey {
    pub const MAX_LENGTH: usize = 128;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        check_length("stream key", &value, 1, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Secrets never show up in logs.
impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamKey(***)")
    }
}

/// Capability token authorizing viewer sessions for one room.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PlaybackKey(String);

impl PlaybackKey {
    pub const MIN_LENGTH: usize = 10;
    pub const MAX_LENGTH: usize = 128;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        check_length("token", &value, Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlaybackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaybackKey(***)")
    }
}

/// Per-connection author name. Not unique, not tied to any identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub const MAX_LENGTH: usize = 32;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        check_length("displayName", &value, 1, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Chat message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub const MAX_LENGTH: usize = 500;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        check_length("content", &value, 1, Self::MAX_LENGTH)?;
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty { field: "content" });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ========================================
// Time
// ========================================

/// Unix timestamp in UTC milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
