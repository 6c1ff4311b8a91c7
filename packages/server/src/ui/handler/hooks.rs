//! Ingest webhook handlers called by the media server.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request, State},
    http::header::CONTENT_TYPE,
};

use crate::{
    infrastructure::dto::http::StreamKeyParamsDto,
    ui::{error::ApiError, state::AppState},
    usecase::UnpublishOutcome,
};

/// Read the stream key from the body `name` field, falling back to the
/// `name` query parameter. Empty values are skipped.
async fn stream_key(request: Request) -> Option<String> {
    let from_query = Query::<StreamKeyParamsDto>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.name);

    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    let from_body = if is_json {
        Json::<StreamKeyParamsDto>::from_request(request, &())
            .await
            .ok()
            .and_then(|Json(params)| params.name)
    } else {
        Form::<StreamKeyParamsDto>::from_request(request, &())
            .await
            .ok()
            .and_then(|Form(params)| params.name)
    };

    [from_body, from_query]
        .into_iter()
        .flatten()
        .find(|key| !key.trim().is_empty())
}

/// Stream started
pub async fn on_publish(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<&'static str, ApiError> {
    let key = stream_key(request).await;
    match state.ingest_usecase.on_publish(key).await {
        Ok(outcome) => {
            tracing::debug!("Publish accepted: {:?}", outcome);
            Ok("ok")
        }
        Err(e) => {
            tracing::warn!("Publish rejected: {}", e);
            Err(e.into())
        }
    }
}

/// Stream ended. Always answers 200.
pub async fn on_unpublish(State(state): State<Arc<AppState>>, request: Request) -> &'static str {
    let key = stream_key(request).await;
    let outcome = state.ingest_usecase.on_unpublish(key).await;
    if outcome == UnpublishOutcome::Dropped {
        tracing::warn!("Unpublish acknowledged despite a store failure");
    }
    "ok"
}
