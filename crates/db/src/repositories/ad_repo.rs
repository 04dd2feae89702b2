//! Repository for the `ads` table.

use sqlx::PgPool;
use volare_core::types::DbId;

use crate::models::ad::{Ad, UpsertAd};

const COLUMNS: &str = "id, package_id, variant, ad_set_id, platform_ad_id, \
    platform_creative_id, name, status, created_at, updated_at";

/// Provides queries over published ads.
///
/// The create path upserts by (package_id, variant, ad_set_id), so
/// re-running it replaces the row for an already-created variant
/// instead of duplicating it.
pub struct AdRepo;

impl AdRepo {
    /// Find an ad by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ad>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ads WHERE id = $1");
        sqlx::query_as::<_, Ad>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a package's non-deleted ads, oldest first.
    pub async fn list_live_by_package(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Vec<Ad>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ads
             WHERE package_id = $1 AND status <> 'DELETED'
             ORDER BY variant ASC, created_at ASC"
        );
        sqlx::query_as::<_, Ad>(&query)
            .bind(package_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the ad row for its
    /// (package, variant, ad_set_id) key.
    pub async fn upsert(pool: &PgPool, input: &UpsertAd) -> Result<Ad, sqlx::Error> {
        let query = format!(
            "INSERT INTO ads
                (package_id, variant, ad_set_id, platform_ad_id,
                 platform_creative_id, name, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (package_id, variant, ad_set_id) DO UPDATE SET
                platform_ad_id       = EXCLUDED.platform_ad_id,
                platform_creative_id = EXCLUDED.platform_creative_id,
                name                 = EXCLUDED.name,
                status               = EXCLUDED.status,
                updated_at           = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ad>(&query)
            .bind(input.package_id)
            .bind(input.variant)
            .bind(&input.ad_set_id)
            .bind(&input.platform_ad_id)
            .bind(&input.platform_creative_id)
            .bind(&input.name)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Repoint an existing ad row at a new platform creative.
    ///
    /// Update never creates: only the stored creative id and the
    /// refresh timestamp change. Returns `None` if the row is missing.
    pub async fn update_creative(
        pool: &PgPool,
        id: DbId,
        platform_creative_id: &str,
    ) -> Result<Option<Ad>, sqlx::Error> {
        let query = format!(
            "UPDATE ads SET
                platform_creative_id = $2,
                updated_at           = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ad>(&query)
            .bind(id)
            .bind(platform_creative_id)
            .fetch_optional(pool)
            .await
    }
}
