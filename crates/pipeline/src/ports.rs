//! Port traits the pipeline runs against.
//!
//! The engine talks to its three collaborators through object-safe
//! async traits so the reconciliation and publish logic can be
//! exercised with in-memory fakes. Production implementations live in
//! [`crate::adapters`].

use async_trait::async_trait;
use volare_core::creative::{AspectRatio, MediaKind};
use volare_core::types::DbId;
use volare_db::models::ad::{Ad, UpsertAd};
use volare_db::models::ad_copy::AdCopy;
use volare_db::models::creative::{Creative, UpsertUploadedCreative};
use volare_db::models::package::Package;
use volare_meta::CreativeSpec;

use crate::error::PipelineError;

/// One asset the store currently holds for a package.
#[derive(Debug, Clone)]
pub struct StoreAsset {
    pub variant: i16,
    pub aspect_ratio: AspectRatio,
    /// Stable content identity; changes whenever the file's content does.
    pub content_id: String,
    pub media_kind: MediaKind,
    /// URL the platform can pull the asset from.
    pub source_url: String,
    /// Display name, used for the platform-side upload label.
    pub name: String,
}

/// Content-asset repository: lists what the design team has produced
/// for a package, keyed by (variant, aspect ratio).
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn list_assets(&self, package_external_id: DbId)
        -> Result<Vec<StoreAsset>, PipelineError>;
}

/// Advertising platform: uploads media, materializes creatives, and
/// creates/updates live ads.
#[async_trait]
pub trait AdPlatform: Send + Sync {
    /// Upload an image, returning the platform image hash.
    async fn upload_image(&self, name: &str, source_url: &str) -> Result<String, PipelineError>;

    /// Upload a video, returning the platform video id.
    async fn upload_video(&self, name: &str, source_url: &str) -> Result<String, PipelineError>;

    /// Materialize one composite creative, returning its platform id.
    async fn create_creative(&self, spec: &CreativeSpec) -> Result<String, PipelineError>;

    /// Create an ad in a pre-existing ad-set, returning the platform ad id.
    async fn create_ad(
        &self,
        name: &str,
        ad_set_id: &str,
        creative_id: &str,
        status: &str,
    ) -> Result<String, PipelineError>;

    /// Repoint an existing ad at a new creative.
    async fn update_ad_creative(&self, ad_id: &str, creative_id: &str)
        -> Result<(), PipelineError>;

    /// Campaign an ad-set belongs to.
    async fn get_ad_set_campaign_id(&self, ad_set_id: &str) -> Result<String, PipelineError>;
}

/// Database-backed record of packages, copies, uploads, and ads.
///
/// All writes are upsert-by-natural-key; the counters are recomputed
/// from live counts, never incremented.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn find_package(&self, id: DbId) -> Result<Option<Package>, PipelineError>;

    async fn list_copies(&self, package_id: DbId) -> Result<Vec<AdCopy>, PipelineError>;

    /// Ledger entries with lifecycle state `uploaded`.
    async fn uploaded_creatives(&self, package_id: DbId) -> Result<Vec<Creative>, PipelineError>;

    /// Record a successful upload (insert or replace by key).
    async fn record_upload(
        &self,
        input: &UpsertUploadedCreative,
    ) -> Result<Creative, PipelineError>;

    /// Insert or replace the ad row for its (package, variant, ad-set) key.
    async fn upsert_ad(&self, input: &UpsertAd) -> Result<Ad, PipelineError>;

    async fn find_ad(&self, id: DbId) -> Result<Option<Ad>, PipelineError>;

    /// Non-deleted ads of a package.
    async fn live_ads(&self, package_id: DbId) -> Result<Vec<Ad>, PipelineError>;

    /// Store a new creative id on an existing ad row.
    async fn update_ad_creative(
        &self,
        id: DbId,
        platform_creative_id: &str,
    ) -> Result<Option<Ad>, PipelineError>;

    /// Recompute the package's denormalized ad counters from live counts.
    async fn refresh_package_counters(
        &self,
        package_id: DbId,
    ) -> Result<Option<Package>, PipelineError>;
}
