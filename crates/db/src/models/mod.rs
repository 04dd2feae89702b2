//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Input DTOs for the writes the pipeline performs

pub mod ad;
pub mod ad_copy;
pub mod creative;
pub mod package;
