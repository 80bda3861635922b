mod gallery;
mod photos;

use axum::Router;
use crate::auth::AppState;

/// JSON data routes, mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new().merge(photos::router())
}

/// Page routes at the site root.
pub fn page_router() -> Router<AppState> {
    gallery::router()
}
