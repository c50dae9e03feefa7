use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use sitesync_core::storage::{CachePolicy, ObjectMeta};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Log drain for the hosting platform's analytics events.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/drain", post(drain))
}

async fn drain(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Json<Value>> {
    let store = state
        .store()
        .ok_or_else(|| ApiError::Internal("log drain received events but storage is not configured".to_string()))?;

    let path = format!(
        "analytics/logs/{}_{}.json",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    );
    let body = serde_json::to_vec(&payload)
        .map_err(|e| ApiError::Internal(format!("serialize drain payload: {e}")))?;
    store
        .put(&path, body, ObjectMeta::json(CachePolicy::NoCache))
        .await
        .map_err(|e| ApiError::Internal(format!("write {path}: {e}")))?;

    tracing::debug!(path = %path, "drained analytics payload");
    Ok(Json(json!({ "success": true })))
}
