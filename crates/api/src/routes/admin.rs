use axum::{
    extract::State,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Password check for the admin login form.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/admin/login", post(login))
}

/// Credential management, behind admin auth.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/admin/password", put(change_password))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let credentials = state.credentials().clone();
    let verified = tokio::task::spawn_blocking(move || credentials.verify(&req.password))
        .await
        .map_err(|e| ApiError::Internal(format!("credential check panicked: {e}")))?;

    if !verified {
        tracing::warn!("failed admin login");
        return Err(ApiError::Unauthorized("Invalid admin password".to_string()));
    }
    tracing::info!("admin logged in");
    Ok(Json(json!({ "authenticated": true })))
}

async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .credentials()
        .change(&req.current_password, &req.new_password)
        .await?;
    tracing::info!("admin password changed");
    Ok(Json(json!({ "changed": true })))
}
