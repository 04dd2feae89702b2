//! Production implementations of the port traits.
//!
//! [`DriveClient`] backs the asset store, [`MetaAdsApi`] backs the ad
//! platform, and [`PgLedger`] backs the ledger via the repository
//! layer.

use async_trait::async_trait;
use volare_core::types::DbId;
use volare_db::models::ad::{Ad, UpsertAd};
use volare_db::models::ad_copy::AdCopy;
use volare_db::models::creative::{Creative, UpsertUploadedCreative};
use volare_db::models::package::Package;
use volare_db::repositories::{AdCopyRepo, AdRepo, CreativeRepo, PackageRepo};
use volare_db::DbPool;
use volare_drive::DriveClient;
use volare_meta::{CreativeSpec, MetaAdsApi};

use crate::error::PipelineError;
use crate::ports::{AdPlatform, AssetStore, Ledger, StoreAsset};

#[async_trait]
impl AssetStore for DriveClient {
    async fn list_assets(
        &self,
        package_external_id: DbId,
    ) -> Result<Vec<StoreAsset>, PipelineError> {
        let assets = self.list_package_assets(package_external_id).await?;
        Ok(assets
            .into_iter()
            .map(|asset| {
                let source_url = self.download_url(&asset.file_id);
                // Identity falls back to the file id when Drive reports
                // no checksum (native Google formats).
                let content_id = if asset.checksum.is_empty() {
                    asset.file_id
                } else {
                    asset.checksum
                };
                StoreAsset {
                    variant: asset.variant,
                    aspect_ratio: asset.aspect_ratio,
                    content_id,
                    media_kind: asset.media_kind,
                    source_url,
                    name: asset.name,
                }
            })
            .collect())
    }
}

#[async_trait]
impl AdPlatform for MetaAdsApi {
    async fn upload_image(&self, name: &str, source_url: &str) -> Result<String, PipelineError> {
        Ok(MetaAdsApi::upload_image(self, name, source_url).await?)
    }

    async fn upload_video(&self, name: &str, source_url: &str) -> Result<String, PipelineError> {
        Ok(MetaAdsApi::upload_video(self, name, source_url).await?)
    }

    async fn create_creative(&self, spec: &CreativeSpec) -> Result<String, PipelineError> {
        Ok(MetaAdsApi::create_creative(self, spec).await?)
    }

    async fn create_ad(
        &self,
        name: &str,
        ad_set_id: &str,
        creative_id: &str,
        status: &str,
    ) -> Result<String, PipelineError> {
        Ok(MetaAdsApi::create_ad(self, name, ad_set_id, creative_id, status).await?)
    }

    async fn update_ad_creative(
        &self,
        ad_id: &str,
        creative_id: &str,
    ) -> Result<(), PipelineError> {
        Ok(MetaAdsApi::update_ad_creative(self, ad_id, creative_id).await?)
    }

    async fn get_ad_set_campaign_id(&self, ad_set_id: &str) -> Result<String, PipelineError> {
        Ok(MetaAdsApi::get_ad_set_campaign_id(self, ad_set_id).await?)
    }
}

/// Postgres-backed ledger over the repository layer.
#[derive(Clone)]
pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn find_package(&self, id: DbId) -> Result<Option<Package>, PipelineError> {
        Ok(PackageRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_copies(&self, package_id: DbId) -> Result<Vec<AdCopy>, PipelineError> {
        Ok(AdCopyRepo::list_by_package(&self.pool, package_id).await?)
    }

    async fn uploaded_creatives(&self, package_id: DbId) -> Result<Vec<Creative>, PipelineError> {
        Ok(CreativeRepo::list_uploaded_by_package(&self.pool, package_id).await?)
    }

    async fn record_upload(
        &self,
        input: &UpsertUploadedCreative,
    ) -> Result<Creative, PipelineError> {
        Ok(CreativeRepo::upsert_uploaded(&self.pool, input).await?)
    }

    async fn upsert_ad(&self, input: &UpsertAd) -> Result<Ad, PipelineError> {
        Ok(AdRepo::upsert(&self.pool, input).await?)
    }

    async fn find_ad(&self, id: DbId) -> Result<Option<Ad>, PipelineError> {
        Ok(AdRepo::find_by_id(&self.pool, id).await?)
    }

    async fn live_ads(&self, package_id: DbId) -> Result<Vec<Ad>, PipelineError> {
        Ok(AdRepo::list_live_by_package(&self.pool, package_id).await?)
    }

    async fn update_ad_creative(
        &self,
        id: DbId,
        platform_creative_id: &str,
    ) -> Result<Option<Ad>, PipelineError> {
        Ok(AdRepo::update_creative(&self.pool, id, platform_creative_id).await?)
    }

    async fn refresh_package_counters(
        &self,
        package_id: DbId,
    ) -> Result<Option<Package>, PipelineError> {
        Ok(PackageRepo::recompute_ad_counts(&self.pool, package_id).await?)
    }
}
