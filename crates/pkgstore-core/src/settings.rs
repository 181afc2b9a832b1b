//! Store settings and validation.
//!
//! These are pure domain types; the CLI fills them from flags and
//! environment variables, adapters read them at bootstrap.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DEFAULT_CATALOG_LIMIT;
use crate::domain::{PackageAction, PackageName};
use crate::ports::CommandSpec;

/// Default HTTP port, same as the historical Termux store.
pub const DEFAULT_PORT: u16 = 8080;

/// Termux installation prefix used when `$PREFIX` is unset.
pub const DEFAULT_TERMUX_PREFIX: &str = "/data/data/com.termux/files/usr";

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// How the store talks to the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Shell used to run package-manager command lines.
    pub shell: String,
    /// Flag passing the command line to the shell (`-lc` for a login shell).
    pub shell_flag: String,
    /// Package manager executable (`pkg`).
    pub package_manager: String,
    /// Pipe `yes` into install/remove so prompts are auto-confirmed.
    pub auto_confirm: bool,
    /// Command line listing installed packages.
    pub list_installed_command: String,
    /// Command line listing every available package name.
    pub list_available_command: String,
    /// Directory holding apt source definitions.
    pub sources_dir: PathBuf,
    /// Extension stripped from source files to get repository names.
    pub repo_extension: String,
    /// Cap on entries returned for the full catalog.
    pub catalog_limit: usize,
    /// Period of `timer` events on a stream, in milliseconds.
    pub timer_interval_ms: u64,
    /// Grace period between SIGTERM and SIGKILL when a client disconnects.
    pub shutdown_grace_ms: u64,
    /// Allow at most one active stream per package name.
    pub exclusive_sessions: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            shell_flag: "-lc".to_string(),
            package_manager: "pkg".to_string(),
            auto_confirm: true,
            list_installed_command: "pkg list-installed".to_string(),
            list_available_command: "apt-cache pkgnames".to_string(),
            sources_dir: default_sources_dir(),
            repo_extension: ".list".to_string(),
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            timer_interval_ms: 1000,
            shutdown_grace_ms: 5000,
            exclusive_sessions: false,
        }
    }
}

impl StoreSettings {
    /// Command line that performs `action` on `package`.
    pub fn operation_command(&self, action: PackageAction, package: &PackageName) -> CommandSpec {
        let invocation = format!("{} {} {}", self.package_manager, action.verb(), package);
        let script = if self.auto_confirm {
            format!("yes | {invocation}")
        } else {
            invocation
        };
        self.shell_command(script)
    }

    /// Wrap an arbitrary command line in the configured shell.
    pub fn shell_command(&self, script: impl Into<String>) -> CommandSpec {
        CommandSpec::shell(&self.shell, &self.shell_flag, script)
    }

    pub const fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// `$PREFIX/etc/apt/sources.list.d`, falling back to the stock Termux prefix.
pub fn default_sources_dir() -> PathBuf {
    let prefix = std::env::var("PREFIX").unwrap_or_else(|_| DEFAULT_TERMUX_PREFIX.to_string());
    PathBuf::from(prefix).join("etc/apt/sources.list.d")
}

/// Reject settings that would make every stream fail.
pub fn validate_settings(settings: &StoreSettings) -> Result<(), SettingsError> {
    let required = [
        ("shell", &settings.shell),
        ("package_manager", &settings.package_manager),
        ("list_installed_command", &settings.list_installed_command),
        ("list_available_command", &settings.list_available_command),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(SettingsError::Empty { field });
        }
    }

    if settings.timer_interval_ms == 0 {
        return Err(SettingsError::Zero {
            field: "timer_interval_ms",
        });
    }
    if settings.catalog_limit == 0 {
        return Err(SettingsError::Zero {
            field: "catalog_limit",
        });
    }

    Ok(())
}
