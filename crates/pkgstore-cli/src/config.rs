//! Command-line and environment configuration.
//!
//! Every option can also be set through an environment variable (or a
//! `.env` file). Options left unset fall back to [`StoreSettings`] defaults.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Args;
use pkgstore_axum::{CorsConfig, ServerConfig};
use pkgstore_core::{DEFAULT_PORT, StoreSettings};

/// How to reach the package manager; shared by `serve` and `stream`.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Shell used to run package-manager command lines
    #[arg(long, env = "PKGSTORE_SHELL")]
    pub shell: Option<String>,

    /// Flag that passes the command line to the shell
    #[arg(long, env = "PKGSTORE_SHELL_FLAG", allow_hyphen_values = true)]
    pub shell_flag: Option<String>,

    /// Package manager executable
    #[arg(long, env = "PKGSTORE_PACKAGE_MANAGER")]
    pub package_manager: Option<String>,

    /// Do not pipe `yes` into install/remove
    #[arg(long, env = "PKGSTORE_NO_AUTO_CONFIRM")]
    pub no_auto_confirm: bool,

    /// Command line listing installed packages
    #[arg(long, env = "PKGSTORE_LIST_INSTALLED")]
    pub list_installed: Option<String>,

    /// Command line listing every available package name
    #[arg(long, env = "PKGSTORE_LIST_AVAILABLE")]
    pub list_available: Option<String>,

    /// Directory holding apt source definitions
    #[arg(long, env = "PKGSTORE_SOURCES_DIR")]
    pub sources_dir: Option<PathBuf>,

    /// Extension stripped from source files to get repository names
    #[arg(long, env = "PKGSTORE_REPO_EXTENSION")]
    pub repo_extension: Option<String>,

    /// Maximum number of packages returned by /api/all
    #[arg(long, env = "PKGSTORE_CATALOG_LIMIT")]
    pub catalog_limit: Option<usize>,

    /// Period of timer events, in milliseconds
    #[arg(long, env = "PKGSTORE_TIMER_INTERVAL_MS")]
    pub timer_interval_ms: Option<u64>,

    /// Grace period between SIGTERM and SIGKILL, in milliseconds
    #[arg(long, env = "PKGSTORE_SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: Option<u64>,

    /// Refuse a second stream for a package that is already streaming
    #[arg(long, env = "PKGSTORE_EXCLUSIVE_SESSIONS")]
    pub exclusive_sessions: bool,
}

impl StoreArgs {
    /// Overlay the given options on the default settings.
    pub fn into_settings(self) -> StoreSettings {
        let defaults = StoreSettings::default();
        StoreSettings {
            shell: self.shell.unwrap_or(defaults.shell),
            shell_flag: self.shell_flag.unwrap_or(defaults.shell_flag),
            package_manager: self.package_manager.unwrap_or(defaults.package_manager),
            auto_confirm: !self.no_auto_confirm,
            list_installed_command: self
                .list_installed
                .unwrap_or(defaults.list_installed_command),
            list_available_command: self
                .list_available
                .unwrap_or(defaults.list_available_command),
            sources_dir: self.sources_dir.unwrap_or(defaults.sources_dir),
            repo_extension: self.repo_extension.unwrap_or(defaults.repo_extension),
            catalog_limit: self.catalog_limit.unwrap_or(defaults.catalog_limit),
            timer_interval_ms: self.timer_interval_ms.unwrap_or(defaults.timer_interval_ms),
            shutdown_grace_ms: self.shutdown_grace_ms.unwrap_or(defaults.shutdown_grace_ms),
            exclusive_sessions: self.exclusive_sessions,
        }
    }
}

/// Arguments of `pkgstore serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind (loopback only unless set)
    #[arg(long, env = "PKGSTORE_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// JSON file with the featured package list (bundled list if omitted)
    #[arg(long, env = "PKGSTORE_FEATURED_FILE")]
    pub featured_file: Option<PathBuf>,

    /// Directory with a built UI to serve, with SPA fallback to index.html
    #[arg(long, env = "PKGSTORE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Allowed CORS origins, comma separated (all origins if omitted)
    #[arg(long, env = "PKGSTORE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl ServeArgs {
    pub fn into_server_config(self) -> ServerConfig {
        let cors = if self.cors_origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(self.cors_origins)
        };
        ServerConfig {
            host: self.host,
            port: self.port,
            settings: self.store.into_settings(),
            featured_file: self.featured_file,
            static_dir: self.static_dir,
            cors,
        }
    }
}

/// Arguments of `pkgstore stream`.
#[derive(Debug, Clone, Args)]
pub struct StreamArgs {
    /// `install` or `remove`
    pub action: String,

    /// Package name
    pub package: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::parse_from(argv);
        match cli.command {
            Some(Commands::Serve(args)) => args,
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn unset_options_keep_defaults() {
        assert_eq!(StoreArgs::default().into_settings(), StoreSettings::default());
    }

    #[test]
    fn serve_binds_loopback_by_default() {
        let config = serve_args(&["pkgstore", "serve"]).into_server_config();
        assert!(config.host.is_loopback());
        assert_eq!(config.host, ServerConfig::default().host);
    }

    #[test]
    fn serve_options_override_defaults() {
        let args = serve_args(&[
            "pkgstore",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
            "--shell",
            "sh",
            "--shell-flag",
            "-c",
            "--no-auto-confirm",
            "--exclusive-sessions",
            "--cors-origins",
            "http://a.test,http://b.test",
        ]);
        let config = args.into_server_config();

        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.settings.shell, "sh");
        assert_eq!(config.settings.shell_flag, "-c");
        assert!(!config.settings.auto_confirm);
        assert!(config.settings.exclusive_sessions);
        assert!(matches!(
            config.cors,
            CorsConfig::AllowOrigins(ref origins) if origins.len() == 2
        ));
    }

    #[test]
    fn stream_takes_action_and_package() {
        let cli = Cli::parse_from(["pkgstore", "stream", "remove", "vim", "--package-manager", "apt"]);
        let Some(Commands::Stream(args)) = cli.command else {
            panic!("expected stream");
        };
        assert_eq!(args.action, "remove");
        assert_eq!(args.package, "vim");
        assert_eq!(args.store.into_settings().package_manager, "apt");
    }
}
