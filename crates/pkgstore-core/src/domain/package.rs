//! Package identity types.
//!
//! Package names end up interpolated into a shell command line, so the only
//! way to obtain a [`PackageName`] is through validation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PACKAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.+-]+$").expect("package name pattern is valid")
});

/// Rejected user input for a stream request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package name is empty or contains characters outside `[A-Za-z0-9.+-]`.
    #[error("Invalid package: {0:?}")]
    InvalidPackage(String),

    /// Action is neither `install` nor `remove`.
    #[error("Invalid action: {0:?}")]
    InvalidAction(String),
}

/// A package name that is safe to pass to the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Validate and wrap a raw package name.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidPackage(raw.to_string()))
        }
    }

    /// Check a name against the allowed pattern without allocating.
    pub fn is_valid(raw: &str) -> bool {
        PACKAGE_NAME_RE.is_match(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// What the client asked the package manager to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    Install,
    Remove,
}

impl PackageAction {
    /// Wire name of the action (`install` / `remove`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Remove => "remove",
        }
    }

    /// Sub-command understood by `pkg` for this action.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Remove => "uninstall",
        }
    }
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "remove" => Ok(Self::Remove),
            other => Err(ValidationError::InvalidAction(other.to_string())),
        }
    }
}

/// One entry of the package catalog shown by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub category: String,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_package_names() {
        for name in ["htop", "openjdk-21", "g++", "libc++", "python3.11", "X11-Repo"] {
            assert!(PackageName::parse(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_shell_metacharacters() {
        for name in ["", "rm -rf /", "htop;reboot", "a/b", "vim nano", "$(id)", "pkg\n"] {
            assert_eq!(
                PackageName::parse(name),
                Err(ValidationError::InvalidPackage(name.to_string())),
            );
        }
    }

    #[test]
    fn action_parses_exact_names_only() {
        assert_eq!("install".parse(), Ok(PackageAction::Install));
        assert_eq!("remove".parse(), Ok(PackageAction::Remove));
        assert!("Install".parse::<PackageAction>().is_err());
        assert!("uninstall".parse::<PackageAction>().is_err());
        assert!("".parse::<PackageAction>().is_err());
    }

    #[test]
    fn remove_maps_to_uninstall_verb() {
        assert_eq!(PackageAction::Install.verb(), "install");
        assert_eq!(PackageAction::Remove.verb(), "uninstall");
    }

    #[test]
    fn package_name_deserialization_validates() {
        let ok: Result<PackageName, _> = serde_json::from_str("\"curl\"");
        assert!(ok.is_ok());
        let bad: Result<PackageName, _> = serde_json::from_str("\"curl; ls\"");
        assert!(bad.is_err());
    }
}
