use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject requests that do not carry the admin password as a bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?
        .to_string();

    // Argon2 verification is CPU-bound.
    let credentials = state.credentials().clone();
    let verified = tokio::task::spawn_blocking(move || credentials.verify(&token))
        .await
        .map_err(|e| ApiError::Internal(format!("credential check panicked: {e}")))?;

    if !verified {
        tracing::warn!(path = %request.uri().path(), "rejected admin request");
        return Err(ApiError::Unauthorized("Invalid admin password".to_string()));
    }
    Ok(next.run(request).await)
}
