//! Ad publisher.
//!
//! Orchestrates the create and update paths across one or many
//! packages: reconcile first, then compose, then create or repoint the
//! live ad, then persist and recount. Processing is strictly
//! sequential — one package at a time, one variant at a time — so ad
//! set writes never race and the progress stream stays ordered. No
//! failure of one unit of work ever aborts the next; every run ends
//! with a `complete` event.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use volare_core::naming;
use volare_core::readiness::{self, BlockedReason};
use volare_core::types::DbId;
use volare_db::models::ad::{Ad, UpsertAd, AD_STATUS_ACTIVE};
use volare_db::models::ad_copy::AdCopy;
use volare_db::models::creative::Creative;
use volare_db::models::package::Package;

use crate::composer::AdComposer;
use crate::error::PipelineError;
use crate::ports::{AdPlatform, AssetStore, Ledger};
use crate::progress::{ProgressEvent, ProgressSender};
use crate::reconcile::{ReconcileOutcome, Reconciler};

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

/// One package to create ads for.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdsPackage {
    pub package_id: DbId,
    /// Pre-existing target ad-set; this path never creates ad-sets.
    pub ad_set_id: String,
    /// Optional variant subset; empty/absent means every publishable
    /// variant.
    #[serde(default)]
    pub variants: Option<Vec<i16>>,
}

/// Create-path request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdsRequest {
    pub packages: Vec<CreateAdsPackage>,
    /// When set, each target ad-set must belong to this campaign.
    #[serde(default)]
    pub campaign_id: Option<String>,
}

/// One existing ad to refresh.
///
/// Callers may echo the platform ad id, package id, and variant they
/// hold, but the stored ad row is authoritative for all three.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAdItem {
    pub ad_id: DbId,
    #[serde(default)]
    pub platform_ad_id: Option<String>,
    #[serde(default)]
    pub package_id: Option<DbId>,
    #[serde(default)]
    pub variant: Option<i16>,
    /// Defaults to reusing ledger entries as-is.
    #[serde(default)]
    pub force_refresh: Option<bool>,
}

/// Update-path request: either an explicit ad list, or a bare package
/// id that expands to all its non-deleted ads (with forced refresh).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpdateAdsRequest {
    ByPackage { package_id: DbId },
    ByAds { ads: Vec<UpdateAdItem> },
}

/// Aggregate counts carried by the terminal `complete` event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub created: u32,
    pub updated: u32,
    pub failed: u32,
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

pub struct Publisher {
    ledger: Arc<dyn Ledger>,
    platform: Arc<dyn AdPlatform>,
    reconciler: Reconciler,
    composer: AdComposer,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn AssetStore>,
        platform: Arc<dyn AdPlatform>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(
                Arc::clone(&store),
                Arc::clone(&platform),
                Arc::clone(&ledger),
            ),
            composer: AdComposer::new(Arc::clone(&platform)),
            ledger,
            platform,
        }
    }

    /// Override the reconciler's inter-upload delay (tests use zero).
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.reconciler = self.reconciler.with_upload_delay(delay);
        self
    }

    // -----------------------------------------------------------------------
    // Create path
    // -----------------------------------------------------------------------

    /// Create ads for a set of packages, streaming progress as work
    /// proceeds. Always terminates with a `complete` event.
    pub async fn create_ads(
        &self,
        request: CreateAdsRequest,
        progress: &ProgressSender,
    ) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for item in &request.packages {
            self.create_for_package(item, request.campaign_id.as_deref(), progress, &mut summary)
                .await;
        }

        progress
            .emit(ProgressEvent::Complete {
                created: summary.created,
                updated: summary.updated,
                failed: summary.failed,
            })
            .await;
        summary
    }

    async fn create_for_package(
        &self,
        item: &CreateAdsPackage,
        campaign_id: Option<&str>,
        progress: &ProgressSender,
        summary: &mut PublishSummary,
    ) {
        progress
            .emit(ProgressEvent::Creating {
                package_id: item.package_id,
                variant: None,
                message: "Reconciling creatives with the asset store".into(),
            })
            .await;

        let package = match self.load_package(item.package_id).await {
            Ok(package) => package,
            Err(e) => {
                self.fail(progress, summary, Some(item.package_id), None, &e)
                    .await;
                return;
            }
        };

        if let Some(expected) = campaign_id {
            if let Err(e) = self.check_campaign(&item.ad_set_id, expected).await {
                self.fail(progress, summary, Some(package.id), None, &e).await;
                return;
            }
        }

        let variants = item.variants.clone().unwrap_or_default();
        let outcome = match self.reconciler.sync_package(&package, &variants).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(progress, summary, Some(package.id), None, &e).await;
                self.refresh_counters(package.id).await;
                return;
            }
        };
        for error in &outcome.errors {
            progress
                .emit(ProgressEvent::Error {
                    package_id: Some(package.id),
                    variant: Some(error.variant),
                    message: format!("{} upload failed: {}", error.aspect_ratio, error.message),
                })
                .await;
            summary.failed += 1;
        }

        match self
            .publish_ready_variants(&package, item, &variants, &outcome, progress, summary)
            .await
        {
            Ok(()) => {}
            Err(e) => {
                self.fail(progress, summary, Some(package.id), None, &e).await;
            }
        }

        // Live counts, recomputed even when every variant failed.
        self.refresh_counters(package.id).await;
    }

    async fn publish_ready_variants(
        &self,
        package: &Package,
        item: &CreateAdsPackage,
        variants: &[i16],
        outcome: &ReconcileOutcome,
        progress: &ProgressSender,
        summary: &mut PublishSummary,
    ) -> Result<(), PipelineError> {
        let copies = self.ledger.list_copies(package.id).await?;
        let entries = self.ledger.uploaded_creatives(package.id).await?;

        let blocked_by_upload: BTreeSet<i16> =
            outcome.feed_blocked_variants().into_iter().collect();
        let mut feed_ready: BTreeSet<i16> = entries
            .iter()
            .filter(|e| e.aspect_ratio == "4x5" && matches!(e.media(), Ok(Some(_))))
            .map(|e| e.variant)
            .collect();
        feed_ready.retain(|v| !blocked_by_upload.contains(v));

        let readiness = readiness::check(variants, &feed_ready, copies.len());

        for (variant, reason) in &readiness.blocked {
            // An upload failure for this variant was already reported.
            if *reason == BlockedReason::MissingFeedCreative
                && blocked_by_upload.contains(variant)
            {
                continue;
            }
            progress
                .emit(ProgressEvent::Error {
                    package_id: Some(package.id),
                    variant: Some(*variant),
                    message: format!("Variant {variant} not publishable: {reason}"),
                })
                .await;
            summary.failed += 1;
        }

        for variant in readiness.ready {
            progress
                .emit(ProgressEvent::Creating {
                    package_id: package.id,
                    variant: Some(variant),
                    message: format!("Building creative for variant {variant}"),
                })
                .await;

            let created = self
                .create_one_ad(package, variant, &item.ad_set_id, &entries, &copies)
                .await;
            match created {
                Ok(ad) => {
                    progress
                        .emit(ProgressEvent::Created {
                            package_id: package.id,
                            variant,
                            ad_id: ad.id,
                            platform_ad_id: ad.platform_ad_id,
                            platform_creative_id: ad.platform_creative_id,
                        })
                        .await;
                    summary.created += 1;
                }
                Err(e) => {
                    self.fail(progress, summary, Some(package.id), Some(variant), &e)
                        .await;
                }
            }
        }
        Ok(())
    }

    async fn create_one_ad(
        &self,
        package: &Package,
        variant: i16,
        ad_set_id: &str,
        entries: &[Creative],
        copies: &[AdCopy],
    ) -> Result<Ad, PipelineError> {
        let creative_id = self
            .composer
            .compose(package, variant, entries, copies)
            .await?;

        let name = naming::display_name(&package.title, package.external_id, variant);
        let platform_ad_id = self
            .platform
            .create_ad(&name, ad_set_id, &creative_id, AD_STATUS_ACTIVE)
            .await?;

        let ad = self
            .ledger
            .upsert_ad(&UpsertAd {
                package_id: package.id,
                variant,
                ad_set_id: ad_set_id.to_string(),
                platform_ad_id,
                platform_creative_id: creative_id,
                name,
                status: AD_STATUS_ACTIVE.to_string(),
            })
            .await?;

        tracing::info!(
            package_id = package.id,
            variant,
            ad_id = ad.id,
            platform_ad_id = %ad.platform_ad_id,
            "Ad published",
        );
        Ok(ad)
    }

    // -----------------------------------------------------------------------
    // Update path
    // -----------------------------------------------------------------------

    /// Refresh existing ads with newly built creatives. Never creates
    /// an ad; a failed item is skipped while its siblings continue.
    pub async fn update_ads(
        &self,
        request: UpdateAdsRequest,
        progress: &ProgressSender,
    ) -> PublishSummary {
        let mut summary = PublishSummary::default();
        let mut touched_packages: BTreeSet<DbId> = BTreeSet::new();

        let targets = match self.expand_update_targets(request, progress, &mut summary).await {
            Ok(targets) => targets,
            Err(e) => {
                self.fail(progress, &mut summary, None, None, &e).await;
                Vec::new()
            }
        };

        for (ad, force_refresh) in targets {
            touched_packages.insert(ad.package_id);
            self.update_one_ad(ad, force_refresh, progress, &mut summary)
                .await;
        }

        for package_id in touched_packages {
            self.refresh_counters(package_id).await;
        }

        progress
            .emit(ProgressEvent::Complete {
                created: summary.created,
                updated: summary.updated,
                failed: summary.failed,
            })
            .await;
        summary
    }

    /// Resolve the request into (ad row, force_refresh) pairs.
    ///
    /// Bulk-by-package mode forces a reconciliation pass to guarantee
    /// freshness; explicit items default to reusing ledger entries.
    async fn expand_update_targets(
        &self,
        request: UpdateAdsRequest,
        progress: &ProgressSender,
        summary: &mut PublishSummary,
    ) -> Result<Vec<(Ad, bool)>, PipelineError> {
        match request {
            UpdateAdsRequest::ByPackage { package_id } => {
                if self.ledger.find_package(package_id).await?.is_none() {
                    return Err(PipelineError::NotFound {
                        entity: "Package",
                        id: package_id,
                    });
                }
                let ads = self.ledger.live_ads(package_id).await?;
                Ok(ads.into_iter().map(|ad| (ad, true)).collect())
            }
            UpdateAdsRequest::ByAds { ads } => {
                let mut targets = Vec::with_capacity(ads.len());
                for item in ads {
                    match self.ledger.find_ad(item.ad_id).await? {
                        Some(ad) => targets.push((ad, item.force_refresh.unwrap_or(false))),
                        None => {
                            let e = PipelineError::NotFound {
                                entity: "Ad",
                                id: item.ad_id,
                            };
                            self.fail(progress, summary, None, None, &e).await;
                        }
                    }
                }
                Ok(targets)
            }
        }
    }

    async fn update_one_ad(
        &self,
        ad: Ad,
        force_refresh: bool,
        progress: &ProgressSender,
        summary: &mut PublishSummary,
    ) {
        progress
            .emit(ProgressEvent::Updating {
                package_id: ad.package_id,
                variant: Some(ad.variant),
                message: format!("Rebuilding creative for ad {}", ad.platform_ad_id),
            })
            .await;

        let result = self.try_update_ad(&ad, force_refresh).await;
        match result {
            Ok(platform_creative_id) => {
                progress
                    .emit(ProgressEvent::Updated {
                        package_id: ad.package_id,
                        variant: ad.variant,
                        ad_id: ad.id,
                        platform_creative_id,
                    })
                    .await;
                summary.updated += 1;
            }
            Err(e) => {
                self.fail(progress, summary, Some(ad.package_id), Some(ad.variant), &e)
                    .await;
            }
        }
    }

    async fn try_update_ad(&self, ad: &Ad, force_refresh: bool) -> Result<String, PipelineError> {
        let package = self.load_package(ad.package_id).await?;

        if force_refresh {
            // Always re-run reconciliation; unchanged content
            // identities short-circuit the per-asset uploads. A failed
            // refresh fails the whole item: the stale creative is not
            // swapped in, and the item is reported exactly once.
            let outcome = self
                .reconciler
                .sync_package(&package, &[ad.variant])
                .await?;
            if let Some(error) = outcome.errors.first() {
                return Err(PipelineError::Platform(format!(
                    "{} upload failed: {}",
                    error.aspect_ratio, error.message
                )));
            }
        }

        let copies = self.ledger.list_copies(package.id).await?;
        let entries = self.ledger.uploaded_creatives(package.id).await?;

        let creative_id = self
            .composer
            .compose(&package, ad.variant, &entries, &copies)
            .await?;

        // The ad's external identity is preserved; only its creative
        // reference changes.
        self.platform
            .update_ad_creative(&ad.platform_ad_id, &creative_id)
            .await?;

        self.ledger
            .update_ad_creative(ad.id, &creative_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "Ad",
                id: ad.id,
            })?;

        Ok(creative_id)
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    async fn load_package(&self, id: DbId) -> Result<Package, PipelineError> {
        self.ledger
            .find_package(id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "Package",
                id,
            })
    }

    async fn check_campaign(&self, ad_set_id: &str, expected: &str) -> Result<(), PipelineError> {
        let actual = self.platform.get_ad_set_campaign_id(ad_set_id).await?;
        if actual != expected {
            return Err(PipelineError::CampaignMismatch {
                ad_set_id: ad_set_id.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Convert a failure into an `error` event and a counted failure.
    async fn fail(
        &self,
        progress: &ProgressSender,
        summary: &mut PublishSummary,
        package_id: Option<DbId>,
        variant: Option<i16>,
        error: &PipelineError,
    ) {
        tracing::warn!(
            package_id,
            variant,
            error = %error,
            "Publish step failed",
        );
        progress
            .emit(ProgressEvent::Error {
                package_id,
                variant,
                message: error.to_string(),
            })
            .await;
        summary.failed += 1;
    }

    async fn refresh_counters(&self, package_id: DbId) {
        if let Err(e) = self.ledger.refresh_package_counters(package_id).await {
            tracing::error!(
                package_id,
                error = %e,
                "Failed to recompute package ad counters",
            );
        }
    }
}
