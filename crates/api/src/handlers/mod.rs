//! HTTP handler functions, grouped by resource.

pub mod ads;
pub mod packages;
