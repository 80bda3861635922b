use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;

use crate::auth::{AppState, FromRef};
use crate::share::codec::{read_cookies, read_headers};
use crate::share::ShareContext;

/// Where the current operation runs, together with the one carrier that side
/// can see.
#[derive(Debug, Clone, Copy)]
pub enum ExecutionSide<'a> {
    /// Request handling after the access middleware populated the headers.
    Server(&'a HeaderMap),
    /// Anything that only has the browser's cookie store.
    Client(&'a CookieJar),
}

/// Assembles the effective share context. Performs no validation: whoever
/// wrote the carrier already did.
pub fn resolve(side: ExecutionSide<'_>, default_share_key: &str) -> ShareContext {
    let (credentials, share_key) = match side {
        ExecutionSide::Server(headers) => {
            let credentials = read_headers(headers);
            let key = credentials.share_key.clone();
            (credentials, key)
        }
        ExecutionSide::Client(jar) => {
            let credentials = read_cookies(jar);
            let key = if credentials.share_key.is_empty() {
                default_share_key.to_string()
            } else {
                credentials.share_key.clone()
            };
            (credentials, key)
        }
    };

    ShareContext {
        share_key,
        album_id: credentials.album_id,
        allow_download: credentials.allow_download.unwrap_or(true),
        expires_at: None,
    }
}

/// Request extension set by the access middleware when it has written the
/// share headers for this request.
#[derive(Debug, Clone, Copy)]
pub struct ShareForwarded;

/// Extractor yielding the request's share context.
///
/// Uses the header carrier when the middleware forwarded one for this exact
/// request, and the cookie carrier otherwise. Headers that arrived from the
/// client without that marker are never read.
#[derive(Debug, Clone)]
pub struct ResolvedShare(pub ShareContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ResolvedShare
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let default_key = &app_state.config.share.default_share_key;

        let ctx = if parts.extensions.get::<ShareForwarded>().is_some() {
            resolve(ExecutionSide::Server(&parts.headers), default_key)
        } else {
            let jar = CookieJar::from_headers(&parts.headers);
            resolve(ExecutionSide::Client(&jar), default_key)
        };

        Ok(ResolvedShare(ctx))
    }
}
