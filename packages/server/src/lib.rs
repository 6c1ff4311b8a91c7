//! Streamcircle watch-party server.
//!
//! Room directory, RTMP ingest webhooks and a WebSocket presence & chat relay.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
