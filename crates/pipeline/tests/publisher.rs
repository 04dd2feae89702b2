//! End-to-end publisher behavior over in-memory fakes.
//!
//! The fakes implement the three port traits with plain maps, which
//! lets these tests drive the full reconcile → compose → publish flow
//! without Postgres or network access.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use volare_core::creative::{AspectRatio, MediaKind};
use volare_core::types::DbId;
use volare_db::models::ad::{Ad, UpsertAd, AD_STATUS_DELETED};
use volare_db::models::ad_copy::AdCopy;
use volare_db::models::creative::{Creative, UpsertUploadedCreative};
use volare_db::models::package::Package;
use volare_meta::CreativeSpec;
use volare_pipeline::error::PipelineError;
use volare_pipeline::ports::{AdPlatform, AssetStore, Ledger, StoreAsset};
use volare_pipeline::progress::{ProgressEvent, ProgressSender};
use volare_pipeline::publisher::{
    CreateAdsPackage, CreateAdsRequest, PublishSummary, UpdateAdItem, UpdateAdsRequest,
};
use volare_pipeline::Publisher;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeStore {
    assets: Mutex<HashMap<DbId, Vec<StoreAsset>>>,
}

impl FakeStore {
    fn put_asset(&self, external_id: DbId, asset: StoreAsset) {
        self.assets
            .lock()
            .unwrap()
            .entry(external_id)
            .or_default()
            .retain(|a| !(a.variant == asset.variant && a.aspect_ratio == asset.aspect_ratio));
        self.assets
            .lock()
            .unwrap()
            .entry(external_id)
            .or_default()
            .push(asset);
    }
}

#[async_trait]
impl AssetStore for FakeStore {
    async fn list_assets(
        &self,
        package_external_id: DbId,
    ) -> Result<Vec<StoreAsset>, PipelineError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .get(&package_external_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct FakePlatform {
    upload_count: AtomicUsize,
    next_id: AtomicI64,
    /// Source URLs whose upload the platform rejects.
    failing_urls: Mutex<HashSet<String>>,
    created_ads: Mutex<Vec<(String, String, String)>>,
    updated_ads: Mutex<Vec<(String, String)>>,
    campaigns: Mutex<HashMap<String, String>>,
}

impl FakePlatform {
    fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }

    fn uploads(&self) -> usize {
        self.upload_count.load(Ordering::SeqCst)
    }

    fn next(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check_upload(&self, source_url: &str) -> Result<(), PipelineError> {
        if self.failing_urls.lock().unwrap().contains(source_url) {
            return Err(PipelineError::Platform("upload rejected".into()));
        }
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AdPlatform for FakePlatform {
    async fn upload_image(&self, _name: &str, source_url: &str) -> Result<String, PipelineError> {
        self.check_upload(source_url)?;
        Ok(self.next("hash"))
    }

    async fn upload_video(&self, _name: &str, source_url: &str) -> Result<String, PipelineError> {
        self.check_upload(source_url)?;
        Ok(self.next("vid"))
    }

    async fn create_creative(&self, _spec: &CreativeSpec) -> Result<String, PipelineError> {
        Ok(self.next("cr"))
    }

    async fn create_ad(
        &self,
        _name: &str,
        ad_set_id: &str,
        creative_id: &str,
        _status: &str,
    ) -> Result<String, PipelineError> {
        let ad_id = self.next("ad");
        self.created_ads.lock().unwrap().push((
            ad_id.clone(),
            ad_set_id.to_string(),
            creative_id.to_string(),
        ));
        Ok(ad_id)
    }

    async fn update_ad_creative(
        &self,
        ad_id: &str,
        creative_id: &str,
    ) -> Result<(), PipelineError> {
        self.updated_ads
            .lock()
            .unwrap()
            .push((ad_id.to_string(), creative_id.to_string()));
        Ok(())
    }

    async fn get_ad_set_campaign_id(&self, ad_set_id: &str) -> Result<String, PipelineError> {
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .get(ad_set_id)
            .cloned()
            .unwrap_or_else(|| "camp-1".to_string()))
    }
}

#[derive(Default)]
struct FakeLedger {
    next_id: AtomicI64,
    packages: Mutex<HashMap<DbId, Package>>,
    copies: Mutex<Vec<AdCopy>>,
    creatives: Mutex<BTreeMap<(DbId, i16, String), Creative>>,
    ads: Mutex<BTreeMap<(DbId, i16, String), Ad>>,
}

impl FakeLedger {
    fn next(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn put_package(&self, id: DbId, external_id: DbId, title: &str) {
        self.packages.lock().unwrap().insert(
            id,
            Package {
                id,
                external_id,
                title: title.to_string(),
                price_cents: 249_900,
                marketing_status: "draft".into(),
                ads_created_count: 0,
                ads_active_count: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
    }

    fn put_copy(&self, package_id: DbId, variant: i16) {
        self.copies.lock().unwrap().push(AdCopy {
            id: self.next(),
            package_id,
            variant,
            primary_text: format!("Primary text {variant}"),
            headline: format!("Headline {variant}"),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    fn package(&self, id: DbId) -> Package {
        self.packages.lock().unwrap().get(&id).unwrap().clone()
    }

    fn creative(&self, package_id: DbId, variant: i16, ratio: &str) -> Option<Creative> {
        self.creatives
            .lock()
            .unwrap()
            .get(&(package_id, variant, ratio.to_string()))
            .cloned()
    }

    fn ad_rows(&self, package_id: DbId) -> Vec<Ad> {
        self.ads
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.package_id == package_id)
            .cloned()
            .collect()
    }

    fn mark_ad_deleted(&self, package_id: DbId, variant: i16, ad_set_id: &str) {
        let mut ads = self.ads.lock().unwrap();
        let ad = ads
            .get_mut(&(package_id, variant, ad_set_id.to_string()))
            .unwrap();
        ad.status = AD_STATUS_DELETED.to_string();
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn find_package(&self, id: DbId) -> Result<Option<Package>, PipelineError> {
        Ok(self.packages.lock().unwrap().get(&id).cloned())
    }

    async fn list_copies(&self, package_id: DbId) -> Result<Vec<AdCopy>, PipelineError> {
        Ok(self
            .copies
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.package_id == package_id)
            .cloned()
            .collect())
    }

    async fn uploaded_creatives(&self, package_id: DbId) -> Result<Vec<Creative>, PipelineError> {
        Ok(self
            .creatives
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.package_id == package_id && c.upload_status == "uploaded")
            .cloned()
            .collect())
    }

    async fn record_upload(
        &self,
        input: &UpsertUploadedCreative,
    ) -> Result<Creative, PipelineError> {
        let key = (
            input.package_id,
            input.variant,
            input.aspect_ratio.as_str().to_string(),
        );
        let (image_hash, video_id) = input.media.clone().into_columns();
        let mut creatives = self.creatives.lock().unwrap();
        // Upsert by natural key: the row id survives a replace.
        let id = creatives.get(&key).map(|c| c.id).unwrap_or_else(|| self.next());
        let created_at = creatives.get(&key).map(|c| c.created_at).unwrap_or_else(Utc::now);
        let row = Creative {
            id,
            package_id: input.package_id,
            variant: input.variant,
            aspect_ratio: input.aspect_ratio.as_str().to_string(),
            drive_file_id: Some(input.drive_file_id.clone()),
            image_hash,
            video_id,
            media_kind: input.media_kind().as_str().to_string(),
            upload_status: "uploaded".into(),
            uploaded_at: Some(Utc::now()),
            created_at,
            updated_at: Utc::now(),
        };
        creatives.insert(key, row.clone());
        Ok(row)
    }

    async fn upsert_ad(&self, input: &UpsertAd) -> Result<Ad, PipelineError> {
        let key = (input.package_id, input.variant, input.ad_set_id.clone());
        let mut ads = self.ads.lock().unwrap();
        let id = ads.get(&key).map(|a| a.id).unwrap_or_else(|| self.next());
        let created_at = ads.get(&key).map(|a| a.created_at).unwrap_or_else(Utc::now);
        let row = Ad {
            id,
            package_id: input.package_id,
            variant: input.variant,
            ad_set_id: input.ad_set_id.clone(),
            platform_ad_id: input.platform_ad_id.clone(),
            platform_creative_id: input.platform_creative_id.clone(),
            name: input.name.clone(),
            status: input.status.clone(),
            created_at,
            updated_at: Utc::now(),
        };
        ads.insert(key, row.clone());
        Ok(row)
    }

    async fn find_ad(&self, id: DbId) -> Result<Option<Ad>, PipelineError> {
        Ok(self
            .ads
            .lock()
            .unwrap()
            .values()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn live_ads(&self, package_id: DbId) -> Result<Vec<Ad>, PipelineError> {
        Ok(self
            .ads
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.package_id == package_id && a.status != AD_STATUS_DELETED)
            .cloned()
            .collect())
    }

    async fn update_ad_creative(
        &self,
        id: DbId,
        platform_creative_id: &str,
    ) -> Result<Option<Ad>, PipelineError> {
        let mut ads = self.ads.lock().unwrap();
        let Some(ad) = ads.values_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        ad.platform_creative_id = platform_creative_id.to_string();
        ad.updated_at = Utc::now();
        Ok(Some(ad.clone()))
    }

    async fn refresh_package_counters(
        &self,
        package_id: DbId,
    ) -> Result<Option<Package>, PipelineError> {
        let ads = self.ads.lock().unwrap();
        let live = ads
            .values()
            .filter(|a| a.package_id == package_id && a.status != AD_STATUS_DELETED)
            .count() as i32;
        let active = ads
            .values()
            .filter(|a| a.package_id == package_id && a.status == "ACTIVE")
            .count() as i32;
        drop(ads);

        let mut packages = self.packages.lock().unwrap();
        let Some(package) = packages.get_mut(&package_id) else {
            return Ok(None);
        };
        package.ads_created_count = live;
        package.ads_active_count = active;
        if live > 0 {
            package.marketing_status = "advertised".into();
        }
        package.updated_at = Utc::now();
        Ok(Some(package.clone()))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    store: Arc<FakeStore>,
    platform: Arc<FakePlatform>,
    ledger: Arc<FakeLedger>,
    publisher: Publisher,
}

fn harness() -> Harness {
    let store = Arc::new(FakeStore::default());
    let platform = Arc::new(FakePlatform::default());
    let ledger = Arc::new(FakeLedger::default());
    let publisher = Publisher::new(
        Arc::clone(&store) as Arc<dyn AssetStore>,
        Arc::clone(&platform) as Arc<dyn AdPlatform>,
        Arc::clone(&ledger) as Arc<dyn Ledger>,
    )
    .with_upload_delay(Duration::ZERO);
    Harness {
        store,
        platform,
        ledger,
        publisher,
    }
}

fn image_asset(variant: i16, ratio: AspectRatio, content_id: &str) -> StoreAsset {
    StoreAsset {
        variant,
        aspect_ratio: ratio,
        content_id: content_id.to_string(),
        media_kind: MediaKind::Image,
        source_url: format!("https://assets.test/v{variant}_{}", ratio.as_str()),
        name: format!("v{variant}_{}.png", ratio.as_str()),
    }
}

/// Package 1 / external 9001 with copies 1–3 and 4x5 assets for
/// variants 1 and 2 — the reference scenario.
fn seed_reference_scenario(h: &Harness) {
    h.ledger.put_package(1, 9001, "Lisbon Getaway");
    for variant in 1..=3 {
        h.ledger.put_copy(1, variant);
    }
    h.store.put_asset(9001, image_asset(1, AspectRatio::FourByFive, "c-v1"));
    h.store.put_asset(9001, image_asset(2, AspectRatio::FourByFive, "c-v2"));
}

fn create_request(variants: Vec<i16>) -> CreateAdsRequest {
    CreateAdsRequest {
        packages: vec![CreateAdsPackage {
            package_id: 1,
            ad_set_id: "AS1".into(),
            variants: Some(variants),
        }],
        campaign_id: None,
    }
}

async fn run_create(h: &Harness, request: CreateAdsRequest) -> (PublishSummary, Vec<ProgressEvent>) {
    let (sender, mut rx) = ProgressSender::channel(256);
    let summary = h.publisher.create_ads(request, &sender).await;
    drop(sender);
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    (summary, events)
}

async fn run_update(h: &Harness, request: UpdateAdsRequest) -> (PublishSummary, Vec<ProgressEvent>) {
    let (sender, mut rx) = ProgressSender::channel(256);
    let summary = h.publisher.update_ads(request, &sender).await;
    drop(sender);
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    (summary, events)
}

fn error_events(events: &[ProgressEvent]) -> Vec<(Option<DbId>, Option<i16>)> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Error {
                package_id,
                variant,
                ..
            } => Some((*package_id, *variant)),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Create path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reference_scenario_first_run() {
    let h = harness();
    seed_reference_scenario(&h);

    let (summary, events) = run_create(&h, create_request(vec![1, 2, 3])).await;

    // Two uploads, two ads, one error for variant 3.
    assert_eq!(h.platform.uploads(), 2);
    let ads = h.ledger.ad_rows(1);
    assert_eq!(ads.len(), 2);
    let variants: Vec<i16> = {
        let mut v: Vec<i16> = ads.iter().map(|a| a.variant).collect();
        v.sort_unstable();
        v
    };
    assert_eq!(variants, vec![1, 2]);

    assert_eq!(summary, PublishSummary { created: 2, updated: 0, failed: 1 });
    assert!(error_events(&events).contains(&(Some(1), Some(3))));

    // Denormalized counters derived from a live count.
    let package = h.ledger.package(1);
    assert_eq!(package.ads_created_count, 2);
    assert_eq!(package.ads_active_count, 2);
    assert_eq!(package.marketing_status, "advertised");
}

#[tokio::test]
async fn reference_scenario_rerun_is_idempotent() {
    let h = harness();
    seed_reference_scenario(&h);

    run_create(&h, create_request(vec![1, 2, 3])).await;
    let first_run_ads = h.ledger.ad_rows(1);
    assert_eq!(h.platform.uploads(), 2);

    let (summary, _) = run_create(&h, create_request(vec![1, 2, 3])).await;

    // No content changed: zero new uploads, the same two ad rows
    // replaced in place rather than duplicated.
    assert_eq!(h.platform.uploads(), 2);
    let ads = h.ledger.ad_rows(1);
    assert_eq!(ads.len(), 2);
    for ad in &ads {
        let original = first_run_ads.iter().find(|a| a.id == ad.id);
        assert!(original.is_some(), "ad row ids must be stable across re-runs");
    }
    assert_eq!(summary.created, 2);
    assert_eq!(h.ledger.package(1).ads_created_count, 2);
}

#[tokio::test]
async fn stale_content_reuploads_only_that_key() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;
    assert_eq!(h.platform.uploads(), 2);

    let untouched_before = h.ledger.creative(1, 2, "4x5").unwrap();

    // The design team replaced variant 1's artwork.
    h.store.put_asset(9001, image_asset(1, AspectRatio::FourByFive, "c-v1-new"));
    run_create(&h, create_request(vec![1, 2])).await;

    assert_eq!(h.platform.uploads(), 3, "only the drifted key re-uploads");
    let refreshed = h.ledger.creative(1, 1, "4x5").unwrap();
    assert_eq!(refreshed.drive_file_id.as_deref(), Some("c-v1-new"));

    let untouched_after = h.ledger.creative(1, 2, "4x5").unwrap();
    assert_eq!(untouched_before, untouched_after);
}

#[tokio::test]
async fn failed_upload_leaves_ledger_entry_untouched() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;

    let before = h.ledger.creative(1, 1, "4x5").unwrap();

    // Variant 1 drifts, but the platform rejects the re-upload.
    let drifted = image_asset(1, AspectRatio::FourByFive, "c-v1-new");
    h.platform.fail_url(&drifted.source_url);
    h.store.put_asset(9001, drifted);

    let (summary, events) = run_create(&h, create_request(vec![1, 2])).await;

    let after = h.ledger.creative(1, 1, "4x5").unwrap();
    assert_eq!(before, after, "failed upload must not touch the entry");
    assert!(error_events(&events).contains(&(Some(1), Some(1))));
    // Variant 1 is excluded from this pass; variant 2 still publishes.
    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn new_variant_with_failing_upload_produces_no_ad() {
    let h = harness();
    h.ledger.put_package(1, 9001, "Lisbon Getaway");
    h.ledger.put_copy(1, 1);
    let asset = image_asset(1, AspectRatio::FourByFive, "c-v1");
    h.platform.fail_url(&asset.source_url);
    h.store.put_asset(9001, asset);

    let (summary, _) = run_create(&h, create_request(vec![1])).await;

    assert!(h.ledger.creative(1, 1, "4x5").is_none());
    assert!(h.ledger.ad_rows(1).is_empty());
    assert_eq!(summary, PublishSummary { created: 0, updated: 0, failed: 1 });
}

#[tokio::test]
async fn copy_without_feed_creative_never_becomes_an_ad() {
    let h = harness();
    h.ledger.put_package(1, 9001, "Lisbon Getaway");
    h.ledger.put_copy(1, 1);
    // No assets at all: variant 1 has copy but no 4x5 entry.

    let (summary, events) = run_create(&h, create_request(vec![1])).await;

    assert!(h.ledger.ad_rows(1).is_empty());
    assert_eq!(summary.created, 0);
    assert_eq!(summary.failed, 1);
    assert!(error_events(&events).contains(&(Some(1), Some(1))));
}

#[tokio::test]
async fn package_without_copy_is_blocked() {
    let h = harness();
    h.ledger.put_package(1, 9001, "Lisbon Getaway");
    h.store.put_asset(9001, image_asset(1, AspectRatio::FourByFive, "c-v1"));

    let (summary, _) = run_create(&h, create_request(vec![1])).await;

    // The creative may upload, but no copy means no ad.
    assert!(h.ledger.ad_rows(1).is_empty());
    assert_eq!(summary.created, 0);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn story_asset_rides_along_with_feed() {
    let h = harness();
    seed_reference_scenario(&h);
    h.store.put_asset(9001, image_asset(1, AspectRatio::NineBySixteen, "c-v1-story"));

    let (summary, _) = run_create(&h, create_request(vec![1])).await;

    assert_eq!(summary.created, 1);
    // Both aspect ratios landed in the ledger under distinct keys.
    assert!(h.ledger.creative(1, 1, "4x5").is_some());
    assert!(h.ledger.creative(1, 1, "9x16").is_some());
}

#[tokio::test]
async fn missing_package_is_reported_and_siblings_continue() {
    let h = harness();
    seed_reference_scenario(&h);

    let request = CreateAdsRequest {
        packages: vec![
            CreateAdsPackage {
                package_id: 77,
                ad_set_id: "AS1".into(),
                variants: None,
            },
            CreateAdsPackage {
                package_id: 1,
                ad_set_id: "AS1".into(),
                variants: Some(vec![1]),
            },
        ],
        campaign_id: None,
    };
    let (summary, events) = run_create(&h, request).await;

    assert!(error_events(&events).contains(&(Some(77), None)));
    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn campaign_mismatch_blocks_the_package() {
    let h = harness();
    seed_reference_scenario(&h);
    h.platform
        .campaigns
        .lock()
        .unwrap()
        .insert("AS1".into(), "camp-other".into());

    let mut request = create_request(vec![1, 2]);
    request.campaign_id = Some("camp-1".into());
    let (summary, _) = run_create(&h, request).await;

    assert_eq!(h.platform.uploads(), 0, "rejected before any upload");
    assert!(h.ledger.ad_rows(1).is_empty());
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn progress_stream_is_ordered_and_terminates_with_complete() {
    let h = harness();
    seed_reference_scenario(&h);

    let (_, events) = run_create(&h, create_request(vec![1, 2, 3])).await;

    assert!(matches!(
        events.first(),
        Some(ProgressEvent::Creating { variant: None, .. })
    ));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Complete { created: 2, failed: 1, .. })
    ));

    // Variant 1's terminal event precedes any variant 2 work.
    let created_v1 = events
        .iter()
        .position(|e| matches!(e, ProgressEvent::Created { variant: 1, .. }))
        .unwrap();
    let creating_v2 = events
        .iter()
        .position(|e| matches!(e, ProgressEvent::Creating { variant: Some(2), .. }))
        .unwrap();
    assert!(created_v1 < creating_v2);
}

// ---------------------------------------------------------------------------
// Update path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_swaps_creatives_without_creating_ads() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;

    let before = h.ledger.ad_rows(1);
    assert_eq!(before.len(), 2);

    let (summary, _) = run_update(&h, UpdateAdsRequest::ByPackage { package_id: 1 }).await;

    let after = h.ledger.ad_rows(1);
    assert_eq!(after.len(), 2, "update must never change the ad count");
    for ad in &after {
        let original = before.iter().find(|a| a.id == ad.id).unwrap();
        assert_eq!(ad.platform_ad_id, original.platform_ad_id);
        assert_ne!(
            ad.platform_creative_id, original.platform_creative_id,
            "each ad must point at a freshly built creative"
        );
    }
    assert_eq!(summary, PublishSummary { created: 0, updated: 2, failed: 0 });
    assert_eq!(h.platform.updated_ads.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_update_forces_reconciliation() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;
    assert_eq!(h.platform.uploads(), 2);

    // Variant 2's artwork drifts before the bulk update.
    h.store.put_asset(9001, image_asset(2, AspectRatio::FourByFive, "c-v2-new"));
    run_update(&h, UpdateAdsRequest::ByPackage { package_id: 1 }).await;

    assert_eq!(h.platform.uploads(), 3, "bulk update refreshes stale keys");
    let refreshed = h.ledger.creative(1, 2, "4x5").unwrap();
    assert_eq!(refreshed.drive_file_id.as_deref(), Some("c-v2-new"));
}

#[tokio::test]
async fn failed_forced_refresh_skips_the_swap() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;
    let before = h.ledger.ad_rows(1);

    // Variant 1 drifts and its re-upload is rejected mid bulk update.
    let drifted = image_asset(1, AspectRatio::FourByFive, "c-v1-new");
    h.platform.fail_url(&drifted.source_url);
    h.store.put_asset(9001, drifted);

    let (summary, events) = run_update(&h, UpdateAdsRequest::ByPackage { package_id: 1 }).await;

    // The failed item counts once as failed, never also as updated.
    assert_eq!(summary, PublishSummary { created: 0, updated: 1, failed: 1 });
    assert_eq!(error_events(&events), vec![(Some(1), Some(1))]);

    let after = h.ledger.ad_rows(1);
    let find = |ads: &[Ad], variant: i16| {
        ads.iter().find(|a| a.variant == variant).unwrap().clone()
    };
    // Variant 1 keeps its old creative; its sibling still refreshes.
    assert_eq!(
        find(&before, 1).platform_creative_id,
        find(&after, 1).platform_creative_id
    );
    assert_ne!(
        find(&before, 2).platform_creative_id,
        find(&after, 2).platform_creative_id
    );
}

#[tokio::test]
async fn explicit_update_without_force_reuses_ledger_entries() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1])).await;
    assert_eq!(h.platform.uploads(), 1);

    let ad = h.ledger.ad_rows(1).pop().unwrap();
    h.store.put_asset(9001, image_asset(1, AspectRatio::FourByFive, "c-v1-new"));

    let (summary, _) = run_update(
        &h,
        UpdateAdsRequest::ByAds {
            ads: vec![UpdateAdItem {
                ad_id: ad.id,
                platform_ad_id: None,
                package_id: None,
                variant: None,
                force_refresh: None,
            }],
        },
    )
    .await;

    // No force: the stale-but-uploaded entry is reused as-is.
    assert_eq!(h.platform.uploads(), 1);
    assert_eq!(summary.updated, 1);
}

#[tokio::test]
async fn unknown_ad_is_reported_and_siblings_continue() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1])).await;
    let ad = h.ledger.ad_rows(1).pop().unwrap();

    let (summary, events) = run_update(
        &h,
        UpdateAdsRequest::ByAds {
            ads: vec![
                UpdateAdItem {
                    ad_id: 404,
                    platform_ad_id: None,
                    package_id: None,
                    variant: None,
                    force_refresh: None,
                },
                UpdateAdItem {
                    ad_id: ad.id,
                    platform_ad_id: None,
                    package_id: None,
                    variant: None,
                    force_refresh: Some(false),
                },
            ],
        },
    )
    .await;

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
    assert!(!error_events(&events).is_empty());
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Complete { updated: 1, failed: 1, .. })
    ));
}

#[tokio::test]
async fn counters_track_external_deletions() {
    let h = harness();
    seed_reference_scenario(&h);
    run_create(&h, create_request(vec![1, 2])).await;
    assert_eq!(h.ledger.package(1).ads_created_count, 2);

    // The platform deleted variant 2's ad out of band.
    h.ledger.mark_ad_deleted(1, 2, "AS1");
    run_update(&h, UpdateAdsRequest::ByPackage { package_id: 1 }).await;

    let package = h.ledger.package(1);
    assert_eq!(package.ads_created_count, 1);
    assert_eq!(package.ads_active_count, 1);
}
