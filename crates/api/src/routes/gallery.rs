use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Serialize;
use sitesync_core::storage::{content_type_for, CachePolicy, ObjectMeta};
use sitesync_media::{compress_image, CompressParams};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Gallery uploads, behind admin auth.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/gallery", post(upload))
        .route("/api/gallery/repair", post(repair_metadata))
}

const GALLERY_PREFIX: &str = "gallery/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    url: String,
    /// False when the image was embedded in the document as a data URL.
    stored: bool,
    width: u32,
    height: u32,
    bytes: usize,
}

async fn upload(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<UploadResponse>> {
    let params = CompressParams {
        max_width: state.config().gallery_max_width,
        quality: state.config().gallery_quality,
    };
    let image = tokio::task::spawn_blocking(move || compress_image(&body, &params))
        .await
        .map_err(|e| ApiError::Internal(format!("image task panicked: {e}")))??;

    tracing::debug!(
        from = %format!("{}x{}", image.original_width, image.original_height),
        to = %format!("{}x{}", image.width, image.height),
        bytes = image.bytes.len(),
        "compressed gallery upload"
    );

    let size = image.bytes.len();
    let (url, stored) = match state.store() {
        Some(store) => {
            let path = format!(
                "gallery/{}_{}.jpg",
                chrono::Utc::now().timestamp_millis(),
                uuid::Uuid::new_v4().simple()
            );
            store
                .put(
                    &path,
                    image.bytes.clone(),
                    ObjectMeta::new(image.mime_type(), CachePolicy::Media),
                )
                .await?;
            (store.public_url(&path), true)
        }
        None => (image.to_data_url(), false),
    };

    state.sync().add_gallery_image(url.clone()).await?;
    tracing::info!(stored, bytes = size, "gallery image added");

    Ok(Json(UploadResponse {
        url,
        stored,
        width: image.width,
        height: image.height,
        bytes: size,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairReport {
    checked: usize,
    repaired: Vec<String>,
}

/// Rewrite every gallery object's content type and cache policy from its
/// file extension. Objects that already match are left alone.
async fn repair_metadata(State(state): State<AppState>) -> ApiResult<Json<RepairReport>> {
    let store = state
        .store()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;

    let paths = store.list(GALLERY_PREFIX).await?;
    let mut repaired = Vec::new();
    for path in &paths {
        let Some(object) = store.get(path).await? else {
            continue;
        };
        let wanted = ObjectMeta::new(content_type_for(path), CachePolicy::Media);
        if object.meta == wanted {
            continue;
        }
        store.put(path, object.bytes, wanted).await?;
        repaired.push(path.clone());
    }

    tracing::info!(checked = paths.len(), repaired = repaired.len(), "gallery metadata repaired");
    Ok(Json(RepairReport {
        checked: paths.len(),
        repaired,
    }))
}
