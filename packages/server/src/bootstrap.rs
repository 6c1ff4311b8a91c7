//! Dependency wiring.

use std::sync::Arc;

use streamcircle_shared::time::{Clock, SystemClock};

use crate::{
    config::Config,
    domain::{MessagePusher, MessageRepository, RepositoryError, RoomRepository, StatusEventBus},
    infrastructure::{
        event_bus::InProcessStatusBus,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryRoomRepository, SqliteRoomRepository},
    },
    ui::{AppState, Server, ServerSettings},
    usecase::{
        ConnectViewerUseCase, DisconnectViewerUseCase, IngestUseCase, RoomAdminUseCase,
        RoomSequencer, SendMessageUseCase, StatusRelay,
    },
};

/// Build the server with the store selected by `config`.
pub async fn build_app(config: &Config) -> Result<Server, RepositoryError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Repository (SQLite when a database URL is configured, otherwise in-memory)
    match &config.database_url {
        Some(url) => {
            let repository = Arc::new(SqliteRoomRepository::connect(url, clock.clone()).await?);
            tracing::info!("Using SQLite store at {}", url);
            Ok(build_app_with(config, repository.clone(), repository, clock))
        }
        None => {
            let repository = Arc::new(InMemoryRoomRepository::with_clock(clock.clone()));
            tracing::warn!("DATABASE_URL not set, rooms and messages are kept in memory only");
            Ok(build_app_with(config, repository.clone(), repository, clock))
        }
    }
}

/// Build the server on top of the given stores.
pub fn build_app_with(
    config: &Config,
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
) -> Server {
    // Initialize dependencies in order:
    // 2. MessagePusher and status bus
    // 3. UseCases
    // 4. Status relay subscription
    // 5. Server

    // 2. Create MessagePusher (WebSocket implementation) and the status bus
    let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
    let status_bus: Arc<dyn StatusEventBus> = Arc::new(InProcessStatusBus::new());
    let sequencer = Arc::new(RoomSequencer::new());

    // 3. Create UseCases
    let connect_viewer_usecase = Arc::new(ConnectViewerUseCase::new(
        rooms.clone(),
        messages.clone(),
        message_pusher.clone(),
        sequencer.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        messages.clone(),
        message_pusher.clone(),
        sequencer.clone(),
    ));
    let disconnect_viewer_usecase =
        Arc::new(DisconnectViewerUseCase::new(message_pusher.clone()));
    let ingest_usecase = Arc::new(IngestUseCase::new(
        rooms.clone(),
        status_bus.clone(),
        sequencer,
    ));
    let room_admin_usecase = Arc::new(RoomAdminUseCase::new(rooms, messages, clock));

    // 4. Forward liveness transitions to connected viewers
    status_bus.subscribe(Arc::new(StatusRelay::new(message_pusher)));

    // 5. Create the server
    Server::new(AppState {
        connect_viewer_usecase,
        send_message_usecase,
        disconnect_viewer_usecase,
        ingest_usecase,
        room_admin_usecase,
        settings: ServerSettings {
            admin_token: config.admin_token.clone(),
            hls_base_url: config.hls_base_url(),
        },
    })
}
