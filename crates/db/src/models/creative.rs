//! Creative ledger entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use volare_core::creative::{AspectRatio, MediaKind, PlatformMedia, UploadStatus};
use volare_core::error::CoreError;
use volare_core::types::{DbId, Timestamp};

/// A row from the `creatives` ledger table.
///
/// Records one uploaded visual asset, keyed by
/// (package, variant, aspect ratio). The row stores the asset store's
/// content identity alongside the platform identity the upload
/// produced; the pair is what lets reconciliation detect drift.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Creative {
    pub id: DbId,
    pub package_id: DbId,
    pub variant: i16,
    pub aspect_ratio: String,
    /// Asset store content identity. Empty/NULL means never uploaded.
    pub drive_file_id: Option<String>,
    pub image_hash: Option<String>,
    pub video_id: Option<String>,
    pub media_kind: String,
    pub upload_status: String,
    pub uploaded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Creative {
    /// Typed aspect ratio.
    pub fn aspect_ratio(&self) -> Result<AspectRatio, CoreError> {
        AspectRatio::parse(&self.aspect_ratio)
    }

    /// Typed upload lifecycle state.
    pub fn upload_status(&self) -> Result<UploadStatus, CoreError> {
        UploadStatus::parse(&self.upload_status)
    }

    /// Platform identity as the tagged union, `None` if never uploaded.
    pub fn media(&self) -> Result<Option<PlatformMedia>, CoreError> {
        PlatformMedia::from_columns(self.image_hash.clone(), self.video_id.clone())
    }
}

/// Input for the uploaded-creative upsert, keyed by
/// (package, variant, aspect ratio).
///
/// Carries both identities at once: the upsert either lands the full
/// entry or nothing, so the ledger never holds a half-written row.
#[derive(Debug, Clone)]
pub struct UpsertUploadedCreative {
    pub package_id: DbId,
    pub variant: i16,
    pub aspect_ratio: AspectRatio,
    pub drive_file_id: String,
    pub media: PlatformMedia,
}

impl UpsertUploadedCreative {
    pub fn media_kind(&self) -> MediaKind {
        self.media.kind()
    }
}
