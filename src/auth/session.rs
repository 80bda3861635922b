use axum::http::{header::AUTHORIZATION, HeaderMap, Uri};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::jwt::{decode_session_token, Claims};
use crate::config::SecurityConfig;
use crate::constants::{PATH_ADMIN, PATH_SIGN_IN, SESSION_COOKIE};
use crate::share::policy::is_under;

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Session token from the `Authorization` header, the session cookie, or a
/// `token` query parameter, in that order.
pub fn session_token(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    if let Some(auth_value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(bearer_token) = auth_value.strip_prefix("Bearer ") {
            return Some(bearer_token.to_string());
        }
    }

    if let Some(cookie) = CookieJar::from_headers(headers).get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    uri.query()
        .and_then(|query| serde_urlencoded::from_str::<TokenQuery>(query).ok())
        .and_then(|params| params.token)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionVerdict {
    Allow,
    /// Redirect here to sign in.
    SignIn(String),
}

/// The session layer requests fall through to when no share rule applies.
/// Only admin pages need a session; everything else passes.
#[derive(Clone)]
pub struct SessionAuth {
    secret_key: String,
}

impl SessionAuth {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret_key: security.secret_key.clone(),
        }
    }

    pub fn authenticate(&self, uri: &Uri, headers: &HeaderMap) -> Option<Claims> {
        session_token(uri, headers).and_then(|token| decode_session_token(&token, &self.secret_key))
    }

    pub fn check(&self, uri: &Uri, headers: &HeaderMap) -> SessionVerdict {
        let path = uri.path();
        if !is_under(path, PATH_ADMIN) || self.authenticate(uri, headers).is_some() {
            return SessionVerdict::Allow;
        }

        SessionVerdict::SignIn(format!(
            "{}?next={}",
            PATH_SIGN_IN,
            urlencoding::encode(path)
        ))
    }
}
