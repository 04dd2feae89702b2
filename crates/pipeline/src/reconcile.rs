//! Reconciliation engine.
//!
//! Compares the asset store's current state against the creative
//! ledger and re-uploads exactly the assets whose content identity
//! drifted. One asset's failure never aborts the pass, and the ledger
//! is only ever written on a fully successful upload — a failed key's
//! entry stays byte-identical to its pre-pass value.

use std::sync::Arc;
use std::time::Duration;

use volare_core::creative::{needs_upload, AspectRatio, MediaKind, PlatformMedia, UploadStatus};
use volare_db::models::creative::{Creative, UpsertUploadedCreative};
use volare_db::models::package::Package;

use crate::error::PipelineError;
use crate::ports::{AdPlatform, AssetStore, Ledger, StoreAsset};

/// Default courtesy pause between consecutive platform uploads.
///
/// A rate-limit courtesy, not a retry/backoff mechanism.
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(500);

/// One asset that could not be refreshed this pass.
#[derive(Debug, Clone)]
pub struct AssetError {
    pub variant: i16,
    pub aspect_ratio: AspectRatio,
    pub message: String,
}

/// Result of one reconciliation pass over a package.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Ledger entries refreshed by this pass.
    pub refreshed: Vec<Creative>,
    /// Assets whose content identity already matched the ledger.
    pub skipped: usize,
    /// Per-asset upload failures; the matching ledger entries are
    /// untouched and their variants are not ready this pass.
    pub errors: Vec<AssetError>,
}

impl ReconcileOutcome {
    /// Variants whose 4x5 asset failed to refresh, and which therefore
    /// must be excluded from the publishable set this pass.
    pub fn feed_blocked_variants(&self) -> Vec<i16> {
        self.errors
            .iter()
            .filter(|e| e.aspect_ratio == AspectRatio::FourByFive)
            .map(|e| e.variant)
            .collect()
    }
}

/// Drives the asset store, ledger, and ad platform into agreement for
/// one package at a time.
pub struct Reconciler {
    store: Arc<dyn AssetStore>,
    platform: Arc<dyn AdPlatform>,
    ledger: Arc<dyn Ledger>,
    upload_delay: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn AssetStore>,
        platform: Arc<dyn AdPlatform>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            store,
            platform,
            ledger,
            upload_delay: DEFAULT_UPLOAD_DELAY,
        }
    }

    /// Override the inter-upload delay (tests use zero).
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    /// Bring the package's ledger up to date with the asset store.
    ///
    /// When `variants` is non-empty, both the store listing and the
    /// ledger comparison are restricted to those variant numbers.
    pub async fn sync_package(
        &self,
        package: &Package,
        variants: &[i16],
    ) -> Result<ReconcileOutcome, PipelineError> {
        let assets = self.store.list_assets(package.external_id).await?;
        let entries = self.ledger.uploaded_creatives(package.id).await?;

        let in_scope = |variant: i16| variants.is_empty() || variants.contains(&variant);

        let mut outcome = ReconcileOutcome::default();
        let mut first_upload = true;

        for asset in assets.into_iter().filter(|a| in_scope(a.variant)) {
            let entry = entries
                .iter()
                .find(|e| e.variant == asset.variant && e.aspect_ratio == asset.aspect_ratio.as_str());

            if !needs_upload(entry.and_then(|e| e.drive_file_id.as_deref()), &asset.content_id) {
                outcome.skipped += 1;
                continue;
            }

            // Central lifecycle check: whatever state the entry is in,
            // the only legal path forward runs through `uploading`.
            let prior = match entry {
                Some(e) => e.upload_status()?,
                None => UploadStatus::Pending,
            };
            let dispatched = prior.transition_to(UploadStatus::Uploading)?;

            if !first_upload {
                tokio::time::sleep(self.upload_delay).await;
            }
            first_upload = false;

            match self.upload(package, &asset).await {
                Ok(media) => {
                    dispatched.transition_to(UploadStatus::Uploaded)?;
                    let refreshed = self
                        .ledger
                        .record_upload(&UpsertUploadedCreative {
                            package_id: package.id,
                            variant: asset.variant,
                            aspect_ratio: asset.aspect_ratio,
                            drive_file_id: asset.content_id.clone(),
                            media,
                        })
                        .await?;
                    tracing::info!(
                        package_id = package.id,
                        variant = asset.variant,
                        aspect_ratio = %asset.aspect_ratio,
                        "Creative refreshed",
                    );
                    outcome.refreshed.push(refreshed);
                }
                Err(e) => {
                    // Entry left exactly as it was; the variant is
                    // excluded from the ready set this pass.
                    tracing::warn!(
                        package_id = package.id,
                        variant = asset.variant,
                        aspect_ratio = %asset.aspect_ratio,
                        error = %e,
                        "Creative upload failed",
                    );
                    outcome.errors.push(AssetError {
                        variant: asset.variant,
                        aspect_ratio: asset.aspect_ratio,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Dispatch one asset to the platform's image or video path.
    async fn upload(
        &self,
        package: &Package,
        asset: &StoreAsset,
    ) -> Result<PlatformMedia, PipelineError> {
        let upload_name = format!("{}-{}", package.external_id, asset.name);
        match asset.media_kind {
            MediaKind::Image => {
                let hash = self
                    .platform
                    .upload_image(&upload_name, &asset.source_url)
                    .await?;
                Ok(PlatformMedia::Image { hash })
            }
            MediaKind::Video => {
                let id = self
                    .platform
                    .upload_video(&upload_name, &asset.source_url)
                    .await?;
                Ok(PlatformMedia::Video { id })
            }
        }
    }
}
