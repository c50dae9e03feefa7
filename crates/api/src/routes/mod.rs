pub mod admin;
pub mod content;
pub mod drain;
pub mod gallery;
pub mod health;
pub mod newsletter;
pub mod retell;
pub mod stats;
pub mod storage;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::limit::RequestBodyLimitLayer;

use crate::middleware::auth::require_admin;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(admin::routes())
        .merge(content::admin_routes())
        .merge(gallery::routes())
        .merge(newsletter::admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let max_body = state.config().max_upload_bytes;

    Router::new()
        .merge(health::routes())
        .merge(content::public_routes())
        .merge(admin::public_routes())
        .merge(storage::routes())
        .merge(newsletter::routes())
        .merge(drain::routes())
        .merge(stats::routes())
        .merge(retell::routes())
        .merge(admin)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}
