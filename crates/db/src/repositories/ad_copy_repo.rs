//! Repository for the `ad_copies` table.

use sqlx::PgPool;
use volare_core::types::DbId;

use crate::models::ad_copy::AdCopy;

const COLUMNS: &str =
    "id, package_id, variant, primary_text, headline, description, created_at, updated_at";

/// Read-only access to a package's copy variants.
pub struct AdCopyRepo;

impl AdCopyRepo {
    /// List all copy variants for a package, ordered by variant number.
    pub async fn list_by_package(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Vec<AdCopy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ad_copies
             WHERE package_id = $1
             ORDER BY variant ASC"
        );
        sqlx::query_as::<_, AdCopy>(&query)
            .bind(package_id)
            .fetch_all(pool)
            .await
    }
}
