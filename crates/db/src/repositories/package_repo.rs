//! Repository for the `packages` table.

use sqlx::PgPool;
use volare_core::types::DbId;

use crate::models::package::{Package, MARKETING_STATUS_ADVERTISED};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, external_id, title, price_cents, marketing_status, \
    ads_created_count, ads_active_count, created_at, updated_at";

/// Provides queries over packages. The publish pipeline only reads
/// packages and recomputes their denormalized ad counters.
pub struct PackageRepo;

impl PackageRepo {
    /// Find a package by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages WHERE id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a package by its external catalog id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: DbId,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages WHERE external_id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Recompute the denormalized ad counters from live counts.
    ///
    /// `ads_created_count` counts non-deleted ads and `ads_active_count`
    /// counts active ones — always derived fresh from a COUNT query, so
    /// the numbers stay correct when the platform deleted ads out of
    /// band. A package with live ads is promoted to `advertised`.
    pub async fn recompute_ad_counts(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "UPDATE packages SET
                ads_created_count = (
                    SELECT COUNT(*) FROM ads
                    WHERE package_id = $1 AND status <> 'DELETED'
                ),
                ads_active_count = (
                    SELECT COUNT(*) FROM ads
                    WHERE package_id = $1 AND status = 'ACTIVE'
                ),
                marketing_status = CASE
                    WHEN EXISTS (
                        SELECT 1 FROM ads
                        WHERE package_id = $1 AND status <> 'DELETED'
                    ) THEN '{MARKETING_STATUS_ADVERTISED}'
                    ELSE marketing_status
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(package_id)
            .fetch_optional(pool)
            .await
    }
}
