//! Google Drive asset store adapter.
//!
//! The design team keeps one Drive folder per package (named after the
//! package's external catalog id) containing the creative assets,
//! named by variant and aspect ratio. This crate lists those assets
//! with a stable content identity per file so the reconciliation
//! engine can detect drift.

pub mod client;

pub use client::{DriveAsset, DriveClient, DriveError};
