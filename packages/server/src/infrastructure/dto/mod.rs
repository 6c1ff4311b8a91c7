//! Data Transfer Objects (DTOs) for the watch-party server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: realtime relay events
//! - `http`: REST API and webhook payloads

pub mod conversion;
pub mod http;
pub mod websocket;
