//! Domain layer.
//!
//! Value objects, entities and the interfaces (repositories, message pusher,
//! status bus) that the usecase layer depends on. Concrete implementations
//! live in the infrastructure layer.

pub mod entity;
pub mod error;
pub mod event_bus;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, NewChatMessage, Room, RoomStatusEvent, ViewerSession};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event_bus::{StatusEventBus, StatusEventHandler};
pub use factory::{RoomKeyFactory, SlugFactory};
pub use message_pusher::{MessagePusher, PusherChannel, SendAck, ViewerEvent};
pub use repository::{MessageRepository, RoomRepository};
#[cfg(test)]
pub use repository::{MockMessageRepository, MockRoomRepository};
pub use value_object::{
    DisplayName, MessageContent, MessageId, PlaybackKey, RoomId, RoomName, SessionId, Slug,
    StreamKey, Timestamp,
};

/// Number of messages replayed to a viewer on join.
pub const HISTORY_LIMIT: usize = 50;
