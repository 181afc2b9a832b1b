//! PackageCatalogPort implementation backed by the local package manager.
//!
//! The featured list comes from memory, everything else is obtained by
//! running the configured list commands or reading the apt sources
//! directory on each request.

use std::fmt;
use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use pkgstore_core::{
    CoreError, FeaturedCatalog, PackageCatalogPort, PackageDescriptor, StoreSettings,
    parse_available, parse_installed, repo_name,
};
use tracing::debug;

use crate::command::capture_stdout;

/// Catalog queries answered by `pkg`, `apt-cache` and the sources directory.
pub struct PkgCatalog {
    settings: Arc<StoreSettings>,
    featured: FeaturedCatalog,
}

impl PkgCatalog {
    pub const fn new(settings: Arc<StoreSettings>, featured: FeaturedCatalog) -> Self {
        Self { settings, featured }
    }
}

impl fmt::Debug for PkgCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkgCatalog")
            .field("featured", &self.featured.packages().len())
            .field("sources_dir", &self.settings.sources_dir)
            .finish()
    }
}

#[async_trait]
impl PackageCatalogPort for PkgCatalog {
    async fn featured(&self) -> Result<Vec<PackageDescriptor>, CoreError> {
        Ok(self.featured.packages().to_vec())
    }

    async fn available(&self) -> Result<Vec<PackageDescriptor>, CoreError> {
        let spec = self
            .settings
            .shell_command(self.settings.list_available_command.as_str());
        let output = capture_stdout(&spec).await?;
        let packages = parse_available(&output, self.settings.catalog_limit);
        debug!(count = packages.len(), "loaded available packages");
        Ok(packages)
    }

    async fn installed(&self) -> Result<Vec<String>, CoreError> {
        let spec = self
            .settings
            .shell_command(self.settings.list_installed_command.as_str());
        let output = capture_stdout(&spec).await?;
        Ok(parse_installed(&output))
    }

    async fn repos(&self) -> Result<Vec<String>, CoreError> {
        let dir = &self.settings.sources_dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "sources directory missing, no repos");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CoreError::ExternalService(format!(
                    "cannot read {}: {e}",
                    dir.display()
                )));
            }
        };

        let mut repos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::ExternalService(format!("cannot read {}: {e}", dir.display())))?
        {
            let file_name = entry.file_name();
            if let Some(name) = repo_name(&file_name.to_string_lossy(), &self.settings.repo_extension)
            {
                repos.push(name);
            }
        }
        repos.sort();
        Ok(repos)
    }
}
