//! UseCase layer.
//!
//! Orchestrates the domain interfaces for each operation the server exposes:
//! viewer connect / send / disconnect, the status relay, ingest webhooks and
//! room administration.

mod connect_viewer;
mod disconnect_viewer;
mod error;
mod ingest;
mod room_admin;
mod send_message;
mod sequencer;
mod status_relay;

pub use connect_viewer::{ConnectViewerUseCase, HandshakeRequest};
pub use disconnect_viewer::DisconnectViewerUseCase;
pub use error::{ConnectError, IngestError, RoomAdminError, SendMessageError};
pub use ingest::{IngestUseCase, PublishOutcome, UnpublishOutcome};
pub use room_admin::{JoinedRoom, RoomAdminUseCase};
pub use send_message::SendMessageUseCase;
pub use sequencer::RoomSequencer;
pub use status_relay::StatusRelay;
