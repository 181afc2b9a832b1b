//! JSON response bodies.
//!
//! Every catalog endpoint answers `{ "ok": true, <field>: [...] }`; the
//! browser UI checks `ok` and reads the list field.

use pkgstore_core::PackageDescriptor;
use serde::{Deserialize, Serialize};

/// `GET /api/featured`, `/api/packages` and `/api/all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagesResponse {
    pub ok: bool,
    pub packages: Vec<PackageDescriptor>,
}

impl PackagesResponse {
    pub const fn new(packages: Vec<PackageDescriptor>) -> Self {
        Self { ok: true, packages }
    }
}

/// `GET /api/installed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledResponse {
    pub ok: bool,
    pub installed: Vec<String>,
}

impl InstalledResponse {
    pub const fn new(installed: Vec<String>) -> Self {
        Self {
            ok: true,
            installed,
        }
    }
}

/// `GET /api/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReposResponse {
    pub ok: bool,
    pub repos: Vec<String>,
}

impl ReposResponse {
    pub const fn new(repos: Vec<String>) -> Self {
        Self { ok: true, repos }
    }
}

/// Query string of `GET /api/stream`.
///
/// Missing parameters deserialize as empty strings so that they fail
/// validation with the same 400 as malformed ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub pkg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_response_shape() {
        let body = PackagesResponse::new(vec![PackageDescriptor::new("git", "Dev")]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "packages": [{"name": "git", "category": "Dev"}]})
        );
    }
}
