//! HTTP / WebSocket surface of the watch-party server.

mod error;
mod extract;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ApiError;
pub use server::Server;
pub use state::{AppState, ServerSettings};
