use axum::{
    extract::State,
    http::{HeaderMap, HeaderName},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sitesync_core::prompt::build_system_prompt;
use sitesync_core::sync::{fetch_published, SnapshotSource};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::bearer_token;
use crate::state::AppState;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Voice-agent prompt built from the published snapshot.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/retell", get(prompt).post(prompt))
}

async fn prompt(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    if let Some(secret) = state.config().retell_secret.as_deref() {
        let bearer = bearer_token(&headers);
        let api_key = headers.get(&API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if bearer != Some(secret) && api_key != Some(secret) {
            tracing::warn!("rejected voice-agent prompt request");
            return Err(ApiError::Unauthorized("Invalid API key".to_string()));
        }
    }

    let store = state
        .store()
        .ok_or_else(|| ApiError::Internal("prompt requested but storage is not configured".to_string()))?;
    let published = fetch_published(store.as_ref())
        .await
        .ok_or_else(|| ApiError::Internal("no published snapshot could be read".to_string()))?;

    let version = match published.source {
        SnapshotSource::Pointer(version) => Some(version),
        SnapshotSource::Legacy => None,
    };
    Ok(Json(json!({
        "prompt": build_system_prompt(&published.content),
        "updatedAt": published.content.updated_at,
        "version": version,
    })))
}
