//! Infrastructure layer.
//!
//! Concrete implementations of the domain interfaces: room directory stores,
//! the WebSocket channel registry, the in-process status bus, and the DTOs
//! that define the wire formats.

pub mod dto;
pub mod event_bus;
pub mod message_pusher;
pub mod repository;
