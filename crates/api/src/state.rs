use std::sync::Arc;
use std::time::Duration;

use volare_drive::DriveClient;
use volare_meta::MetaAdsApi;
use volare_pipeline::adapters::PgLedger;
use volare_pipeline::ports::{AdPlatform, AssetStore, Ledger};
use volare_pipeline::Publisher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: volare_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Drive asset-store client.
    pub drive: Arc<DriveClient>,
    /// Meta advertising platform client.
    pub meta: Arc<MetaAdsApi>,
}

impl AppState {
    pub fn new(pool: volare_db::DbPool, config: ServerConfig) -> Self {
        let drive = Arc::new(DriveClient::new(
            config.drive.api_url.clone(),
            config.drive.api_key.clone(),
            config.drive.root_folder_id.clone(),
        ));
        let meta = Arc::new(MetaAdsApi::new(
            config.meta.api_url.clone(),
            config.meta.access_token.clone(),
            config.meta.ad_account_id.clone(),
            config.meta.page_id.clone(),
        ));
        Self {
            pool,
            config: Arc::new(config),
            drive,
            meta,
        }
    }

    /// Assemble a publisher over the production adapters.
    pub fn publisher(&self) -> Publisher {
        let store: Arc<dyn AssetStore> = Arc::clone(&self.drive) as _;
        let platform: Arc<dyn AdPlatform> = Arc::clone(&self.meta) as _;
        let ledger: Arc<dyn Ledger> = Arc::new(PgLedger::new(self.pool.clone()));
        Publisher::new(store, platform, ledger)
            .with_upload_delay(Duration::from_millis(self.config.upload_delay_ms))
    }
}
