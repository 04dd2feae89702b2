//! Pipeline error type.
//!
//! One item's failure never aborts its siblings: every variant here is
//! converted to an `error` progress event and a counted failure at the
//! point of use. The string-carrying variants keep the port traits
//! implementable by in-memory fakes.

use volare_core::error::CoreError;
use volare_core::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The asset store listing failed.
    #[error("Asset store error: {0}")]
    AssetStore(String),

    /// An advertising platform call failed.
    #[error("Platform error: {0}")]
    Platform(String),

    /// A ledger read or write failed.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// A referenced package or ad does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The variant has no current 4x5 platform identity to compose with.
    #[error("Variant {variant} has no current 4x5 creative")]
    MissingFeedCreative { variant: i16 },

    /// The target ad-set belongs to a different campaign than requested.
    #[error("Ad-set {ad_set_id} belongs to campaign {actual}, not {expected}")]
    CampaignMismatch {
        ad_set_id: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<volare_drive::DriveError> for PipelineError {
    fn from(e: volare_drive::DriveError) -> Self {
        Self::AssetStore(e.to_string())
    }
}

impl From<volare_meta::MetaApiError> for PipelineError {
    fn from(e: volare_meta::MetaApiError) -> Self {
        Self::Platform(e.to_string())
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        Self::Ledger(e.to_string())
    }
}
