//! Request extractors.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{error::ApiError, state::AppState};

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Proof that the request carried the configured admin token.
///
/// Add it to a handler's arguments to make the route admin-only.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<Arc<AppState>> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(token) if token == state.settings.admin_token => Ok(AdminAccess),
            _ => {
                tracing::warn!("Rejected admin request to {}", parts.uri.path());
                Err(ApiError::unauthorized())
            }
        }
    }
}
