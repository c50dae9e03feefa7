use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check, including whether publishing is possible.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let status = state.sync().status().await;
    Json(json!({
        "status": "ok",
        "initialized": status.initialized,
        "storage": status.storage_backend.unwrap_or_else(|| "unconfigured".to_string()),
        "subscribers": state.event_bus().subscriber_count(),
    }))
}

/// Lightweight ping.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use crate::state::test_support::TestApp;

    #[tokio::test]
    async fn health_reports_storage_backend() {
        let app = TestApp::new(false).await;
        let (status, body) = app
            .send(Request::get("/health").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "unconfigured");
        assert_eq!(body["initialized"], true);

        let app = TestApp::new(true).await;
        let (_, body) = app
            .send(Request::get("/health").body(Body::empty()).unwrap())
            .await;
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn ping() {
        let app = TestApp::new(false).await;
        let (status, body) = app
            .send(Request::get("/v1/ping").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
