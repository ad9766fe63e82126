//! Package index access
//!
//! The snapshot builder only talks to [`PackageIndex`]; [`PypiClient`] is the
//! production implementation backed by the PyPI JSON API.

pub mod pypi;

pub use pypi::PypiClient;

use crate::error::Result;
use crate::models::{ReleaseMetadata, ReleaseUrl};

/// Read-only view of a package registry
#[allow(async_fn_in_trait)]
pub trait PackageIndex {
    /// Release identifiers of `name`, newest first
    ///
    /// Unknown packages and packages without releases yield an empty list.
    async fn latest_releases(&self, name: &str) -> Result<Vec<String>>;

    /// Artifacts published for `name` at `version`, empty if none
    async fn release_urls(&self, name: &str, version: &str) -> Result<Vec<ReleaseUrl>>;

    /// Descriptive metadata of `name` at `version`
    async fn release_metadata(&self, name: &str, version: &str) -> Result<ReleaseMetadata>;
}
