//! Package entity model.

use serde::Serialize;
use sqlx::FromRow;
use volare_core::types::{DbId, Timestamp};

/// A row from the `packages` table.
///
/// The publish flow only ever touches the denormalized ad counters and
/// the marketing status; everything else belongs to the product
/// lifecycle, which lives elsewhere.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Package {
    pub id: DbId,
    /// External catalog id, embedded in creative names and CTA messages.
    pub external_id: DbId,
    pub title: String,
    pub price_cents: i64,
    pub marketing_status: String,
    pub ads_created_count: i32,
    pub ads_active_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Marketing status a package reaches once it has live ads.
pub const MARKETING_STATUS_ADVERTISED: &str = "advertised";
