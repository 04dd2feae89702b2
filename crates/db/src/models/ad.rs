//! Published ad entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use volare_core::types::{DbId, Timestamp};

/// Status of a published ad, mirroring the platform's notion.
pub const AD_STATUS_ACTIVE: &str = "ACTIVE";
pub const AD_STATUS_PAUSED: &str = "PAUSED";
pub const AD_STATUS_DELETED: &str = "DELETED";

/// A row from the `ads` table.
///
/// Maps 1:1 to a live advertising unit: one (package, variant) pair in
/// one ad-set. Both aspect ratios are placement-customized inside the
/// single platform object, so aspect ratio is not part of the key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ad {
    pub id: DbId,
    pub package_id: DbId,
    pub variant: i16,
    pub ad_set_id: String,
    pub platform_ad_id: String,
    pub platform_creative_id: String,
    pub name: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for the ad upsert, keyed by (package, variant, ad-set).
#[derive(Debug, Clone)]
pub struct UpsertAd {
    pub package_id: DbId,
    pub variant: i16,
    pub ad_set_id: String,
    pub platform_ad_id: String,
    pub platform_creative_id: String,
    pub name: String,
    pub status: String,
}
