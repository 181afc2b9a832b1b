//! Offline fallback icon for packages without a logo.

use axum::http::header;
use axum::response::IntoResponse;

const DEFAULT_LOGO_SVG: &str = include_str!("../../assets/default.svg");

pub async fn default_logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], DEFAULT_LOGO_SVG)
}
