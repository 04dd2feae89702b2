//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query
//! methods that accept `&PgPool` as the first argument.

pub mod ad_copy_repo;
pub mod ad_repo;
pub mod creative_repo;
pub mod package_repo;

pub use ad_copy_repo::AdCopyRepo;
pub use ad_repo::AdRepo;
pub use creative_repo::CreativeRepo;
pub use package_repo::PackageRepo;
