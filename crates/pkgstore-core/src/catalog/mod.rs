//! Package catalog data and the text parsers behind it.
//!
//! The featured list is plain data handed in at startup; the parsers turn
//! raw package-manager output into catalog entries. None of this touches
//! processes or the filesystem, adapters feed it text.

mod category;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{PackageDescriptor, PackageName};
use crate::ports::CoreError;

pub use category::{OTHER_CATEGORY, infer_category};

/// Bundled featured list used when no catalog file is configured.
const DEFAULT_FEATURED_JSON: &str = include_str!("../../assets/featured.json");

/// Default cap on entries returned for the full catalog.
pub const DEFAULT_CATALOG_LIMIT: usize = 8000;

static LEADING_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.+-]+").expect("leading name pattern is valid"));

/// Curated packages shown before the full catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedCatalog {
    packages: Vec<PackageDescriptor>,
}

impl FeaturedCatalog {
    pub const fn new(packages: Vec<PackageDescriptor>) -> Self {
        Self { packages }
    }

    /// Parse a JSON array of `{name, category}` objects.
    ///
    /// Entries whose name would be rejected by a stream request are an error
    /// rather than silently dropped: the UI would render a dead button.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let packages: Vec<PackageDescriptor> = serde_json::from_str(json)
            .map_err(|e| CoreError::Configuration(format!("featured catalog: {e}")))?;

        if let Some(bad) = packages.iter().find(|p| !PackageName::is_valid(&p.name)) {
            return Err(CoreError::Configuration(format!(
                "featured catalog: invalid package name {:?}",
                bad.name
            )));
        }

        Ok(Self::new(packages))
    }

    /// Load the catalog from a JSON file on disk.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// The list bundled with the binary.
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json(DEFAULT_FEATURED_JSON)
    }

    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }
}

/// Build catalog entries from `apt-cache pkgnames`-style output.
///
/// Blank and single-character lines are skipped, as are names that would
/// fail stream validation. Output is sorted and capped at `limit`.
pub fn parse_available(output: &str, limit: usize) -> Vec<PackageDescriptor> {
    let mut names: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|name| name.len() > 1 && PackageName::is_valid(name))
        .collect();
    names.sort_unstable();
    names.dedup();

    names
        .into_iter()
        .take(limit)
        .map(|name| PackageDescriptor::new(name, infer_category(name)))
        .collect()
}

/// Extract installed package names from `pkg list-installed` output.
///
/// Each line contributes its leading `[A-Za-z0-9.+-]+` token, so
/// `htop/stable,now 3.3.0 aarch64 [installed]` yields `htop`. The dots are
/// part of the token, so the `Listing...` banner comes through whole, as the
/// UI has always received it. Duplicates are dropped, first occurrence wins.
pub fn parse_installed(output: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    output
        .lines()
        .filter_map(|line| LEADING_NAME_RE.find(line))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Repository name for a source definition file, or `None` if the file
/// does not carry the expected extension.
pub fn repo_name(file_name: &str, extension: &str) -> Option<String> {
    file_name
        .trim()
        .strip_suffix(extension)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
