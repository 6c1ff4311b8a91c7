//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        rejection::QueryRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{SendAck, ViewerSession},
    infrastructure::dto::websocket::{ClientEvent, SendChatDto},
    ui::{error::ApiError, state::AppState},
    usecase::HandshakeRequest,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandshakeQuery {
    pub slug: String,
    pub token: String,
    pub display_name: String,
}

impl From<HandshakeQuery> for HandshakeRequest {
    fn from(query: HandshakeQuery) -> Self {
        Self {
            slug: query.slug,
            token: query.token,
            display_name: query.display_name,
        }
    }
}

/// `GET /ws?slug=&token=&displayName=`
///
/// The viewer is authenticated and joined to the room channel before the
/// upgrade, so a rejected handshake never becomes a WebSocket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    query: Result<Query<HandshakeQuery>, QueryRejection>,
) -> Response {
    let request: HandshakeRequest = query.map(|Query(q)| q).unwrap_or_default().into();
    let slug = request.slug.clone();

    let session = match state.connect_viewer_usecase.authenticate(request).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Rejected handshake for room '{}': {}", slug, e);
            return ApiError::from(e).into_response();
        }
    };

    // Create a channel for this viewer to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state.connect_viewer_usecase.join(&session, tx).await {
        tracing::warn!("Failed to join room '{}': {}", slug, e);
        return ApiError::from(e).into_response();
    }

    let failed_state = state.clone();
    let failed_session = session.clone();
    ws.on_failed_upgrade(move |e| {
        tracing::warn!("WebSocket upgrade failed for session {}: {}", failed_session.id, e);
        failed_state
            .disconnect_viewer_usecase
            .execute(&failed_session);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, session, rx))
}

/// Spawns a task that receives events from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound flow: the history snapshot, status
/// events, chat broadcasts and acks queued by the message pusher are written
/// to this viewer's WebSocket connection in queue order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session: ViewerSession,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    // Spawn a task to forward queued events to this viewer
    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_session = session.clone();

    // Spawn a task to receive frames from this viewer
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on session {}: {}", recv_session.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_frame(&recv_state, &recv_session, text.as_str()).await;
                }
                Message::Binary(_) => {
                    recv_state
                        .send_message_usecase
                        .acknowledge(&recv_session, SendAck::failed(None, "invalid payload"));
                }
                Message::Close(_) => {
                    tracing::debug!("Session {} requested close", recv_session.id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_viewer_usecase.execute(&session);
}

/// Handle one text frame from a viewer
async fn handle_client_frame(state: &AppState, session: &ViewerSession, text: &str) {
    tracing::debug!("Received frame from session {}: {}", session.id, text);

    let ack = match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::SendChat(SendChatDto { content, ack_id })) => {
            match state.send_message_usecase.execute(session, content).await {
                Ok(message) => {
                    tracing::debug!("Message {} sent by session {}", message.id, session.id);
                    SendAck::ok(ack_id)
                }
                Err(e) => {
                    tracing::warn!("Chat send from session {} rejected: {}", session.id, e);
                    SendAck::failed(ack_id, e.ack_reason())
                }
            }
        }
        Err(e) => {
            tracing::warn!("Undecodable frame from session {}: {}", session.id, e);
            SendAck::failed(salvage_ack_id(text), "invalid payload")
        }
    };

    state.send_message_usecase.acknowledge(session, ack);
}

/// Pick `data.ackId` out of a frame that did not decode as a client event.
fn salvage_ack_id(text: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()?
        .get("data")?
        .get("ackId")?
        .as_u64()
}
