//! Ad copy (textual variation) entity model.

use serde::Serialize;
use sqlx::FromRow;
use volare_core::types::{DbId, Timestamp};

/// A row from the `ad_copies` table.
///
/// One of up to five textual advertisement variations for a package.
/// Authored out of band; the publishing pipeline reads them only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdCopy {
    pub id: DbId,
    pub package_id: DbId,
    /// Variant number, 1–5. Unique per package.
    pub variant: i16,
    pub primary_text: String,
    pub headline: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
