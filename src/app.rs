use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{AppState, SessionAuth};
use crate::backend::{AssetBackend, RemoteShareValidator};
use crate::cache::ScopedCache;
use crate::config::Config;
use crate::database::DbPool;
use crate::logging::request_logger;
use crate::provider::{CatalogProvider, CatalogShareStore, RemoteProvider};
use crate::routes::{api_router, page_router};
use crate::share::middleware::access_middleware;
use crate::share::policy::AccessPolicy;
use crate::VERSION;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
    version: String,
    mode: String,
}

/// State for serving from the local catalog.
pub fn catalog_state(config: Arc<Config>, pool: DbPool) -> AppState {
    AppState {
        policy: AccessPolicy::from_config(&config),
        validator: Arc::new(CatalogShareStore::new(pool.clone())),
        photos: Arc::new(CatalogProvider::new(pool)),
        session: SessionAuth::new(&config.security),
        config,
    }
}

/// State for serving from a remote asset backend.
pub fn remote_state(config: Arc<Config>, backend: Arc<dyn AssetBackend>) -> AppState {
    let cache = ScopedCache::new(&config.cache);

    AppState {
        policy: AccessPolicy::from_config(&config),
        validator: Arc::new(RemoteShareValidator::new(backend.clone())),
        photos: Arc::new(RemoteProvider::new(
            backend,
            cache,
            config.backend.media_base_url(),
        )),
        session: SessionAuth::new(&config.security),
        config,
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mode = if state.config.backend.mode.is_remote() {
        "remote"
    } else {
        "catalog"
    };
    let healthcheck = move || async move {
        Json(HealthcheckResponse {
            status: "healthy".to_string(),
            version: VERSION.to_string(),
            mode: mode.to_string(),
        })
    };

    let api_routes = Router::new()
        .route("/healthcheck", get(healthcheck))
        .merge(api_router());

    let routes = Router::new()
        .nest("/api/v1", api_routes)
        .merge(page_router())
        .with_state(state.clone());

    // Routing happens inside the fallback so the access middleware can
    // rewrite the URI first.
    Router::new().fallback_service(routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(middleware::from_fn(request_logger))
            .layer(middleware::from_fn_with_state(state, access_middleware)),
    )
}
