use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sitesync_core::storage::validate_object_path;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Only published content and gallery media are readable over HTTP.
const PUBLIC_PREFIXES: &[&str] = &["config/", "gallery/"];

/// Serves objects from the configured store for the disk and memory backends.
pub fn routes() -> Router<AppState> {
    Router::new().route("/storage/{*path}", get(serve_object))
}

async fn serve_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    let not_found = || ApiError::NotFound(format!("No object at {path}"));

    if !PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return Err(not_found());
    }
    validate_object_path(&path).map_err(|_| not_found())?;
    let store = state.store().ok_or_else(not_found)?;
    let object = store.get(&path).await?.ok_or_else(not_found)?;

    let header_value = |value: &str| {
        HeaderValue::from_str(value)
            .map_err(|e| ApiError::Internal(format!("bad stored header for {path}: {e}")))
    };
    let headers = [
        (header::CONTENT_TYPE, header_value(&object.meta.content_type)?),
        (header::CACHE_CONTROL, header_value(&object.meta.cache_control)?),
    ];
    Ok((headers, object.bytes).into_response())
}
