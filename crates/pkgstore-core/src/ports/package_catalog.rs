//! Package catalog port.
//!
//! Read-only queries against the package manager and its configuration.

use async_trait::async_trait;

use super::CoreError;
use crate::domain::PackageDescriptor;

/// Source of the package lists the UI renders.
#[async_trait]
pub trait PackageCatalogPort: Send + Sync {
    /// Curated list with fixed categories.
    async fn featured(&self) -> Result<Vec<PackageDescriptor>, CoreError>;

    /// Every package the enabled repositories offer, categories inferred.
    async fn available(&self) -> Result<Vec<PackageDescriptor>, CoreError>;

    /// Names of installed packages.
    async fn installed(&self) -> Result<Vec<String>, CoreError>;

    /// Names of configured repositories.
    async fn repos(&self) -> Result<Vec<String>, CoreError>;
}
