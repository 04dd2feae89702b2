//! Repository for the `creatives` ledger table.

use sqlx::PgPool;
use volare_core::types::DbId;

use crate::models::creative::{Creative, UpsertUploadedCreative};

const COLUMNS: &str = "id, package_id, variant, aspect_ratio, drive_file_id, image_hash, \
    video_id, media_kind, upload_status, uploaded_at, created_at, updated_at";

/// Provides queries over the creative ledger.
///
/// All writes are upserts by the natural key
/// (package_id, variant, aspect_ratio); a ledger row is never
/// duplicated for a key, only replaced.
pub struct CreativeRepo;

impl CreativeRepo {
    /// List a package's ledger entries with lifecycle state `uploaded`.
    pub async fn list_uploaded_by_package(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Vec<Creative>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM creatives
             WHERE package_id = $1 AND upload_status = 'uploaded'
             ORDER BY variant ASC, aspect_ratio ASC"
        );
        sqlx::query_as::<_, Creative>(&query)
            .bind(package_id)
            .fetch_all(pool)
            .await
    }

    /// Find a ledger entry by its natural key.
    pub async fn find_by_key(
        pool: &PgPool,
        package_id: DbId,
        variant: i16,
        aspect_ratio: &str,
    ) -> Result<Option<Creative>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM creatives
             WHERE package_id = $1 AND variant = $2 AND aspect_ratio = $3"
        );
        sqlx::query_as::<_, Creative>(&query)
            .bind(package_id)
            .bind(variant)
            .bind(aspect_ratio)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful upload, inserting or replacing the entry for
    /// its (package, variant, aspect_ratio) key.
    ///
    /// Content identity, platform identity, and the `uploaded` state
    /// land in one statement — a failed upload never reaches this call,
    /// so the ledger never holds a partially-updated row.
    pub async fn upsert_uploaded(
        pool: &PgPool,
        input: &UpsertUploadedCreative,
    ) -> Result<Creative, sqlx::Error> {
        let (image_hash, video_id) = input.media.clone().into_columns();
        let query = format!(
            "INSERT INTO creatives
                (package_id, variant, aspect_ratio, drive_file_id, image_hash,
                 video_id, media_kind, upload_status, uploaded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'uploaded', NOW())
             ON CONFLICT (package_id, variant, aspect_ratio) DO UPDATE SET
                drive_file_id = EXCLUDED.drive_file_id,
                image_hash    = EXCLUDED.image_hash,
                video_id      = EXCLUDED.video_id,
                media_kind    = EXCLUDED.media_kind,
                upload_status = 'uploaded',
                uploaded_at   = NOW(),
                updated_at    = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creative>(&query)
            .bind(input.package_id)
            .bind(input.variant)
            .bind(input.aspect_ratio.as_str())
            .bind(&input.drive_file_id)
            .bind(image_hash)
            .bind(video_id)
            .bind(input.media_kind().as_str())
            .fetch_one(pool)
            .await
    }
}
