use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sitesync_core::error::{AuthError, StorageError, SyncError};
use sitesync_media::MediaError;

/// API error type, rendered as `{ "error": <kind>, "message": <text> }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("bad gateway: {0}")]
    BadGateway(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "serviceUnavailable",
                msg.clone(),
            ),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "upstreamError", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Sync(err) => match err {
                SyncError::StorageNotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storageNotConfigured",
                    err.to_string(),
                ),
                // Shown verbatim so the admin can see what the transport said.
                SyncError::Publish { .. } => (StatusCode::BAD_GATEWAY, "publishFailed", err.to_string()),
                SyncError::Validation(_) => (StatusCode::BAD_REQUEST, "invalidMutation", err.to_string()),
                SyncError::Serialize(_) => {
                    tracing::error!("Serialization error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internalError",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            ApiError::Storage(err) => match err {
                StorageError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "badRequest", err.to_string()),
                _ => (StatusCode::BAD_GATEWAY, "storageError", err.to_string()),
            },
            ApiError::Media(err) => match err {
                MediaError::Encode(_) => {
                    tracing::error!("Image encode error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internalError",
                        "An internal error occurred".to_string(),
                    )
                }
                _ => (StatusCode::BAD_REQUEST, "invalidImage", err.to_string()),
            },
            ApiError::Auth(err) => match err {
                AuthError::InvalidPassword => (StatusCode::UNAUTHORIZED, "unauthorized", err.to_string()),
                AuthError::PasswordTooShort(_) => (StatusCode::BAD_REQUEST, "badRequest", err.to_string()),
                AuthError::Hash(_) | AuthError::Cache(_) => {
                    tracing::error!("Credential error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internalError",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        let body = json!({
            "error": error_type,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sitesync_core::error::PublishStep;

    #[test]
    fn publish_failures_keep_transport_text() {
        let err = ApiError::from(SyncError::Publish {
            step: PublishStep::Snapshot,
            source: StorageError::Status {
                method: "PUT",
                url: "https://bucket.example.com/config/x.json".to_string(),
                status: 507,
            },
        });
        let (status, kind, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(kind, "publishFailed");
        assert!(message.contains("snapshot upload"));
        assert!(message.contains("returned status 507"));
    }

    #[test]
    fn internal_errors_are_masked() {
        let (status, _, message) = ApiError::Internal("disk on fire".to_string()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("disk"));
    }

    #[test]
    fn missing_storage_is_unavailable() {
        let (status, kind, _) = ApiError::from(SyncError::StorageNotConfigured).parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(kind, "storageNotConfigured");
    }
}
