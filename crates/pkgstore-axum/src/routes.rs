//! Route definitions and router construction.
//!
//! This module defines the HTTP routes and creates the main router.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build all API routes without `/api` prefix (for nesting under /api).
///
/// The caller must apply `.with_state()` before nesting.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/featured", get(handlers::packages::featured))
        .route("/packages", get(handlers::packages::featured))
        .route("/all", get(handlers::packages::all))
        .route("/installed", get(handlers::packages::installed))
        .route("/repos", get(handlers::packages::repos))
        // Progress stream (SSE)
        .route("/stream", get(handlers::stream::stream))
}

/// Create the main Axum router with all API routes.
///
/// This creates the API routes only. For serving a prebuilt UI, use
/// [`create_spa_router`] which adds static file serving with SPA fallback.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .route("/logos/default.svg", get(handlers::logos::default_logo))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Create a router with API routes and static asset serving.
///
/// 1. Serves API routes under `/api/*`, `/health` and the fallback logo
/// 2. Serves static assets from `static_dir` for matching files
/// 3. Falls back to `index.html` for client-side routing (SPA mode)
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    // API routes take priority, then fallback to static/SPA serving
    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
