//! Repository traits for registry operations.

pub mod apks;
pub mod corrs;

pub use apks::ApkRepo;
pub use corrs::BundleCorrRepo;
