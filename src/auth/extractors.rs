use crate::auth::session::SessionAuth;
use crate::config::Config;
use crate::error::AppError;
use crate::provider::PhotoProvider;
use crate::share::policy::AccessPolicy;
use crate::share::ShareValidator;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub policy: AccessPolicy,
    pub validator: Arc<dyn ShareValidator>,
    pub photos: Arc<dyn PhotoProvider>,
    pub session: SessionAuth,
}

/// The signed-in administrator.
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub username: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let claims = app_state
            .session
            .authenticate(&parts.uri, &parts.headers)
            .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

        if claims.sub != app_state.config.security.admin_username {
            return Err(AppError::Authentication("Admin access required".to_string()));
        }

        Ok(AdminSession {
            username: claims.sub,
        })
    }
}

// Helper trait for extracting AppState from state
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
