pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ads                       create ads, streamed progress (POST)
/// /ads/update                refresh ad creatives, streamed progress (POST)
///
/// /packages/{id}/ads         list a package's live ads (GET)
/// /packages/{id}/creatives   list a package's uploaded creatives (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ads", post(handlers::ads::create_ads))
        .route("/ads/update", post(handlers::ads::update_ads))
        .route("/packages/{id}/ads", get(handlers::packages::list_package_ads))
        .route(
            "/packages/{id}/creatives",
            get(handlers::packages::list_package_creatives),
        )
}
