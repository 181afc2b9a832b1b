//! Catalog handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::{InstalledResponse, PackagesResponse, ReposResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Curated packages (also served as `/api/packages`).
pub async fn featured(State(state): State<AppState>) -> Result<Json<PackagesResponse>, HttpError> {
    let packages = state.catalog.featured().await?;
    Ok(Json(PackagesResponse::new(packages)))
}

/// Every package the enabled repositories offer.
pub async fn all(State(state): State<AppState>) -> Result<Json<PackagesResponse>, HttpError> {
    let packages = state.catalog.available().await?;
    Ok(Json(PackagesResponse::new(packages)))
}

pub async fn installed(
    State(state): State<AppState>,
) -> Result<Json<InstalledResponse>, HttpError> {
    let installed = state.catalog.installed().await?;
    Ok(Json(InstalledResponse::new(installed)))
}

pub async fn repos(State(state): State<AppState>) -> Result<Json<ReposResponse>, HttpError> {
    let repos = state.catalog.repos().await?;
    Ok(Json(ReposResponse::new(repos)))
}
