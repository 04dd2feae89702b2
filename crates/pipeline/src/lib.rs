//! Creative reconciliation and ad-publishing pipeline.
//!
//! Drives three stores of truth into agreement — the Drive asset
//! store, the creative ledger in Postgres, and the live objects on the
//! advertising platform — then publishes composite ads built from the
//! reconciled state:
//!
//! - [`ports`] — the [`AssetStore`](ports::AssetStore),
//!   [`AdPlatform`](ports::AdPlatform), and [`Ledger`](ports::Ledger)
//!   seams the engine runs against, with production adapters in
//!   [`adapters`].
//! - [`reconcile`] — detects content drift and re-uploads only what
//!   changed.
//! - [`composer`] — assembles one composite creative per variant.
//! - [`publisher`] — orchestrates the create and update paths and
//!   keeps package counters honest.
//! - [`progress`] — the ordered event stream a caller consumes while a
//!   run is in flight.

pub mod adapters;
pub mod composer;
pub mod error;
pub mod ports;
pub mod progress;
pub mod publisher;
pub mod reconcile;

pub use error::PipelineError;
pub use progress::{ProgressEvent, ProgressSender};
pub use publisher::Publisher;
