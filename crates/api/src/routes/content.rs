use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sitesync_core::content::SiteContent;
use sitesync_core::mutation::{ContentMutation, MutationReceipt};
use sitesync_core::sync::{PublishReceipt, SyncStatus};

use crate::error::ApiResult;
use crate::state::AppState;

/// Site content read by the public pages.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/content", get(get_content))
}

/// Editing and publishing, behind admin auth.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/content/status", get(status))
        .route("/api/content/mutations", post(apply_mutation))
        .route("/api/content/publish", post(publish))
}

#[derive(Debug, Serialize)]
struct MutationResponse {
    #[serde(flatten)]
    receipt: MutationReceipt,
    content: SiteContent,
}

async fn get_content(State(state): State<AppState>) -> Json<SiteContent> {
    Json(state.sync().content().await)
}

async fn status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.sync().status().await)
}

async fn apply_mutation(
    State(state): State<AppState>,
    Json(mutation): Json<ContentMutation>,
) -> ApiResult<Json<MutationResponse>> {
    let kind = mutation.kind();
    let content = state.sync().apply(mutation).await?;
    let receipt = MutationReceipt {
        kind: kind.to_string(),
        updated_at: content.updated_at,
        has_unsaved_changes: state.sync().has_unsaved_changes().await,
    };
    Ok(Json(MutationResponse { receipt, content }))
}

async fn publish(State(state): State<AppState>) -> ApiResult<Json<PublishReceipt>> {
    let receipt = state.sync().publish().await?;
    Ok(Json(receipt))
}
