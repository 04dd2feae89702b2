//! Read-only handlers for a package's published ads and ledger entries.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use volare_core::error::CoreError;
use volare_core::types::DbId;
use volare_db::repositories::{AdRepo, CreativeRepo, PackageRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a package exists.
async fn ensure_package_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<()> {
    PackageRepo::find_by_id(pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Package",
                id,
            })
        })
}

// ---------------------------------------------------------------------------
// GET /packages/{id}/ads
// ---------------------------------------------------------------------------

/// List a package's non-deleted ads.
pub async fn list_package_ads(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_package_exists(&state.pool, id).await?;
    let ads = AdRepo::list_live_by_package(&state.pool, id).await?;
    Ok(Json(DataResponse { data: ads }))
}

// ---------------------------------------------------------------------------
// GET /packages/{id}/creatives
// ---------------------------------------------------------------------------

/// List a package's uploaded creative ledger entries.
pub async fn list_package_creatives(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_package_exists(&state.pool, id).await?;
    let creatives = CreativeRepo::list_uploaded_by_package(&state.pool, id).await?;
    Ok(Json(DataResponse { data: creatives }))
}
