//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::future::Future;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pkgstore_core::{
    CommandRunner, DEFAULT_PORT, FeaturedCatalog, PackageCatalogPort, SessionController,
    StoreSettings, validate_settings,
};
use axum::Router;
use pkgstore_runtime::{PkgCatalog, ShellCommandRunner, shutdown_signal};
use tokio::net::TcpListener;
use tracing::info;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind. Loopback by default; the API has no authentication.
    pub host: IpAddr,
    /// Port for the HTTP server.
    pub port: u16,
    /// Package-manager and session settings.
    pub settings: StoreSettings,
    /// JSON file with the featured list; the bundled list if `None`.
    pub featured_file: Option<PathBuf>,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            settings: StoreSettings::default(),
            featured_file: None,
            static_dir: None,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the Axum adapter.
///
/// Holds every service the handlers need. Built by [`bootstrap`] in
/// production and from stand-in ports in tests.
pub struct AxumContext {
    /// Opens install/remove stream sessions.
    pub controller: SessionController,
    /// Answers catalog queries.
    pub catalog: Arc<dyn PackageCatalogPort>,
}

impl AxumContext {
    pub fn new(controller: SessionController, catalog: Arc<dyn PackageCatalogPort>) -> Self {
        Self {
            controller,
            catalog,
        }
    }
}

/// Load the featured list from `path`, or the bundled one.
pub fn load_featured(path: Option<&Path>) -> Result<FeaturedCatalog> {
    let catalog = match path {
        Some(path) => FeaturedCatalog::from_file(path)
            .with_context(|| format!("loading featured catalog {}", path.display()))?,
        None => FeaturedCatalog::bundled().context("loading bundled featured catalog")?,
    };
    Ok(catalog)
}

/// Wire the runtime adapters into an [`AxumContext`].
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    validate_settings(&config.settings).context("invalid store settings")?;
    let featured = load_featured(config.featured_file.as_deref())?;
    let settings = Arc::new(config.settings.clone());

    info!(
        target: "pkgstore.bootstrap",
        shell = %settings.shell,
        package_manager = %settings.package_manager,
        sources_dir = %settings.sources_dir.display(),
        featured = featured.packages().len(),
        exclusive_sessions = settings.exclusive_sessions,
        "Axum bootstrap resolved settings"
    );

    let runner: Arc<dyn CommandRunner> =
        Arc::new(ShellCommandRunner::new(settings.shutdown_grace()));
    let controller = SessionController::new(runner, Arc::clone(&settings));
    let catalog: Arc<dyn PackageCatalogPort> = Arc::new(PkgCatalog::new(settings, featured));

    Ok(AxumContext::new(controller, catalog))
}

/// Start the web server and serve until Ctrl-C or SIGTERM.
///
/// If `config.static_dir` is set, serves static assets with SPA fallback.
/// Otherwise, serves only the API endpoints.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let controller = ctx.controller.clone();

    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr = (config.host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    let local = listener.local_addr()?;

    if config.static_dir.is_some() {
        info!("pkgstore web server (with UI) listening on http://{}", local);
    } else {
        info!("pkgstore web server (API only) listening on http://{}", local);
    }

    serve(listener, app, controller, shutdown_signal()).await
}

/// Serve `app` until `signal` resolves.
///
/// Open stream sessions are then terminated and their processes reaped
/// before in-flight responses are drained.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    controller: SessionController,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Shutdown requested, stopping stream sessions");
            controller.shutdown().await;
        })
        .await?;

    info!("pkgstore web server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_with_defaults_uses_bundled_catalog() {
        let ctx = bootstrap(&ServerConfig::default()).unwrap();
        assert!(ctx.controller.registry().is_none());
    }

    #[test]
    fn default_config_binds_loopback() {
        assert!(ServerConfig::default().host.is_loopback());
    }

    #[test]
    fn bootstrap_rejects_invalid_settings() {
        let mut config = ServerConfig::default();
        config.settings.timer_interval_ms = 0;
        assert!(bootstrap(&config).is_err());
    }

    #[test]
    fn missing_featured_file_fails_bootstrap() {
        let config = ServerConfig {
            featured_file: Some(PathBuf::from("/nonexistent/featured.json")),
            ..ServerConfig::default()
        };
        let err = bootstrap(&config).err().unwrap();
        assert!(format!("{err:#}").contains("featured"));
    }
}
