use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitesync_core::storage::{CachePolicy, ObjectMeta};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const NEWSLETTER_PREFIX: &str = "newsletter/";

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/newsletter", post(subscribe))
}

/// Subscriber list for the admin dashboard.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/newsletter", get(list_subscribers))
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
}

/// Stored once per subscriber; resubscribing overwrites the record.
#[derive(Debug, Serialize)]
struct Subscriber<'a> {
    email: &'a str,
    date: String,
    timestamp: i64,
}

async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> ApiResult<Json<Value>> {
    let email = req.email.trim().to_ascii_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::BadRequest("A valid email address is required".to_string()));
    }
    let store = state
        .store()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;

    let now = Utc::now();
    let record = Subscriber {
        email: &email,
        date: now.to_rfc3339(),
        timestamp: now.timestamp_millis(),
    };
    let body = serde_json::to_vec(&record)
        .map_err(|e| ApiError::Internal(format!("serialize subscriber: {e}")))?;
    let path = format!("{NEWSLETTER_PREFIX}{}.json", subscriber_file_stem(&email));
    store
        .put(&path, body, ObjectMeta::json(CachePolicy::NoCache))
        .await?;

    tracing::info!(path = %path, "newsletter subscription stored");
    Ok(Json(json!({ "success": true })))
}

/// Newest first. Unreadable records are skipped with a warning.
async fn list_subscribers(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let store = state
        .store()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;

    let mut subscribers = Vec::new();
    for path in store.list(NEWSLETTER_PREFIX).await? {
        let Some(object) = store.get(&path).await? else {
            continue;
        };
        match serde_json::from_slice::<Value>(&object.bytes) {
            Ok(record) => subscribers.push(record),
            Err(e) => tracing::warn!(path = %path, error = %e, "skipping unreadable subscriber record"),
        }
    }
    subscribers.sort_by_key(|record| std::cmp::Reverse(record["timestamp"].as_i64().unwrap_or(0)));

    Ok(Json(json!({
        "count": subscribers.len(),
        "subscribers": subscribers,
    })))
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && email.len() <= 254
        && !email.chars().any(char::is_whitespace)
}

/// File-safe form of an address: `a@b.com` becomes `a_at_b.com`.
fn subscriber_file_stem(email: &str) -> String {
    let replaced = email.replace('@', "_at_");
    let safe: String = replaced
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' | '+' => c,
            _ => '_',
        })
        .collect();
    safe.trim_start_matches('.').to_string()
}
