//! Command line / environment configuration.

use clap::Parser;

/// Watch-party backend: room directory, RTMP ingest webhooks and a WebSocket chat relay
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "streamcircle-server")]
#[command(about = "Watch-party backend with a WebSocket presence & chat relay", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "4000")]
    pub port: u16,

    /// SQLite database URL (e.g. `sqlite://streamcircle.db`). In-memory store when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Token expected in the `x-admin-token` header of admin requests
    #[arg(long, env = "SERVER_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: String,

    /// Base URL of the media server
    #[arg(long, env = "STREAM_HOST", default_value = "http://localhost:8080")]
    pub stream_host: String,

    /// Base URL of the HLS playlists. Defaults to `<stream-host>/hls`
    #[arg(long, env = "PLAYBACK_BASE_URL")]
    pub playback_base_url: Option<String>,

    /// Default log level when `RUST_LOG` is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// HLS base URL without a trailing slash
    pub fn hls_base_url(&self) -> String {
        match &self.playback_base_url {
            Some(url) if !url.trim().is_empty() => trim_trailing_slash(url),
            _ => format!("{}/hls", trim_trailing_slash(&self.stream_host)),
        }
    }
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
