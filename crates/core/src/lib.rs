//! Domain logic for the volare marketing backend.
//!
//! Pure, I/O-free building blocks shared by the database layer, the
//! platform adapters, and the publishing pipeline:
//!
//! - [`types`] — common id and timestamp aliases.
//! - [`error`] — the [`CoreError`](error::CoreError) domain error type.
//! - [`creative`] — aspect ratios, media kinds, the upload lifecycle
//!   state machine, and the staleness predicate.
//! - [`naming`] — deterministic creative/ad display names and the
//!   tracked call-to-action template.
//! - [`readiness`] — which variants of a package are publishable.

pub mod creative;
pub mod error;
pub mod naming;
pub mod readiness;
pub mod types;
