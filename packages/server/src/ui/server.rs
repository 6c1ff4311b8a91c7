//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handler::{
        create_room, fallback, get_room, health_check, join_room, list_messages, list_rooms,
        on_publish, on_unpublish, rotate_keys, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Watch-party server
///
/// This struct owns the shared application state and provides methods to
/// build the router and run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state);
/// server.run("127.0.0.1".to_string(), 4000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router with every route and layer attached
    pub fn router(&self) -> Router {
        // Cookies / credentials are allowed from any origin that asks
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // Ingest webhook
            .route("/hooks/rtmp/publish", post(on_publish))
            .route("/hooks/rtmp/done", post(on_unpublish))
            // HTTP エンドポイント
            .route("/healthz", get(health_check))
            .route("/api/rooms", get(list_rooms).post(create_room))
            .route("/api/rooms/{slug}", get(get_room))
            .route("/api/rooms/{slug}/join", post(join_room))
            .route("/api/rooms/{slug}/rotate", post(rotate_keys))
            .route("/api/rooms/{slug}/messages", get(list_messages))
            .fallback(fallback)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 4000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!("Watch-party server listening on {}", listener.local_addr()?);
        tracing::info!("Viewers connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
