//! Meta Marketing API adapter.
//!
//! Wraps the handful of Graph API calls the publishing pipeline needs:
//! image/video upload, composite creative creation, ad creation,
//! creative swap on an existing ad, and ad-set campaign lookup.

pub mod api;

pub use api::{CopyOption, CreativeSpec, MetaAdsApi, MetaApiError};
