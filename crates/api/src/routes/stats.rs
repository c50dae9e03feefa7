use axum::{
    extract::{RawQuery, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Dashboard statistics proxied from the analytics provider.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(stats))
}

async fn stats(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<Json<Value>> {
    let config = state.config();
    let (Some(base), Some(token)) = (&config.analytics_api_url, &config.analytics_api_token) else {
        return Err(ApiError::Unauthorized(
            "Analytics API credentials are not configured".to_string(),
        ));
    };

    let url = match query.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => format!("{base}?{q}"),
        None => base.clone(),
    };

    let response = state
        .http()
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(format!("analytics request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "analytics API rejected request");
        return Err(ApiError::BadGateway(format!(
            "analytics API returned status {}",
            status.as_u16()
        )));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::BadGateway(format!("analytics API returned invalid JSON: {e}")))?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::RawQuery;
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::state::test_support::TestApp;

    /// Spawn a fake analytics API that echoes the query and auth header.
    async fn fake_upstream() -> String {
        async fn echo(RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Value> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "query": query, "auth": auth }))
        }
        async fn broken() -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        let app = Router::new()
            .route("/v1/stats", get(echo))
            .route("/v1/broken", get(broken));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn missing_credentials_is_401() {
        let app = TestApp::new(false).await;
        let (status, body) = app
            .send(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Analytics API credentials are not configured");
    }

    #[tokio::test]
    async fn forwards_query_and_token() {
        let upstream = fake_upstream().await;
        let app = TestApp::with_config(false, |c| {
            c.analytics_api_url = Some(format!("{upstream}/v1/stats"));
            c.analytics_api_token = Some("tok".to_string());
        })
        .await;

        let (status, body) = app
            .send(
                Request::get("/api/stats?period=7d&metric=visitors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "period=7d&metric=visitors");
        assert_eq!(body["auth"], "Bearer tok");
    }

    #[tokio::test]
    async fn upstream_failure_is_502() {
        let upstream = fake_upstream().await;
        let app = TestApp::with_config(false, |c| {
            c.analytics_api_url = Some(format!("{upstream}/v1/broken"));
            c.analytics_api_token = Some("tok".to_string());
        })
        .await;

        let (status, body) = app
            .send(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "upstreamError");
        assert!(body["message"].as_str().unwrap().contains("500"));
    }
}
