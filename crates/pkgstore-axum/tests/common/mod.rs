//! Shared fixtures for pkgstore-axum route tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use pkgstore_axum::{AxumContext, CorsConfig, create_router};
use pkgstore_core::testing::ScriptedRunner;
use pkgstore_core::{
    CoreError, PackageCatalogPort, PackageDescriptor, SessionController, StoreSettings,
};
use tower::ServiceExt;

/// Catalog with fixed answers; `None` makes the query fail as if the
/// package manager were missing.
#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    pub featured: Vec<PackageDescriptor>,
    pub available: Option<Vec<PackageDescriptor>>,
    pub installed: Option<Vec<String>>,
    pub repos: Vec<String>,
}

#[async_trait]
impl PackageCatalogPort for StubCatalog {
    async fn featured(&self) -> Result<Vec<PackageDescriptor>, CoreError> {
        Ok(self.featured.clone())
    }

    async fn available(&self) -> Result<Vec<PackageDescriptor>, CoreError> {
        self.available
            .clone()
            .ok_or_else(|| CoreError::ExternalService("apt-cache not found".to_string()))
    }

    async fn installed(&self) -> Result<Vec<String>, CoreError> {
        self.installed
            .clone()
            .ok_or_else(|| CoreError::ExternalService("pkg not found".to_string()))
    }

    async fn repos(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.repos.clone())
    }
}

pub fn router_with(runner: &ScriptedRunner, catalog: StubCatalog, settings: StoreSettings) -> Router {
    let controller = SessionController::new(Arc::new(runner.clone()), Arc::new(settings));
    let ctx = AxumContext::new(controller, Arc::new(catalog));
    create_router(ctx, &CorsConfig::AllowAll)
}

pub fn router(runner: &ScriptedRunner, catalog: StubCatalog) -> Router {
    router_with(runner, catalog, StoreSettings::default())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
