//! Route handlers.

mod hooks;
mod http;
mod websocket;

pub use hooks::{on_publish, on_unpublish};
pub use http::{
    create_room, fallback, get_room, health_check, join_room, list_messages, list_rooms,
    rotate_keys,
};
pub use websocket::websocket_handler;
