//! Serving the prebuilt single-page app.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use super::config::{Env, ServerConfig};

/// A router serving the app bundle under `base_path`, with any unknown path
/// falling back to `dist/index.html` so client-side routes resolve.
///
/// Returns `None` when no base path is configured.
pub fn static_router(config: &ServerConfig) -> Option<Router> {
    let base_path = config.base_path.as_deref()?;
    Some(match config.env {
        Env::Production => production_router(base_path),
        Env::Development => development_router(base_path),
    })
}

fn dist_service(base_path: &Path) -> ServeDir<ServeFile> {
    let dist = base_path.join("dist");
    ServeDir::new(&dist).fallback(ServeFile::new(dist.join("index.html")))
}

fn production_router(base_path: &Path) -> Router {
    info!("Serving static files from {:?}", base_path.join("dist"));
    Router::new().fallback_service(dist_service(base_path))
}

fn development_router(base_path: &Path) -> Router {
    info!(
        "Serving static files from {:?} and {:?}",
        base_path.join("public"),
        base_path.join("dist")
    );
    let public = ServeDir::new(base_path.join("public")).fallback(dist_service(base_path));
    Router::new().fallback_service(public)
}
