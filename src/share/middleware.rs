use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::auth::{AppState, SessionVerdict};
use crate::constants::UNGUARDED_PREFIXES;
use crate::error::{AppError, ValidationError};
use crate::share::codec::{append_set_cookies, read_cookies, strip_headers, write_headers};
use crate::share::policy::{is_under, Action, Decision};
use crate::share::{redact_key, validate_share_key, ShareContext, ShareForwarded};

/// Runs the access policy for every request outside the unguarded prefixes.
///
/// Must wrap the router (not be a route layer) so rewrites happen before
/// routing.
pub async fn access_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_unguarded(&path) {
        return next.run(request).await;
    }

    let policy = &state.policy;
    let action = match policy.decide(&path) {
        Decision::Act(action) => action,
        Decision::ActivateShare(share_key) => {
            let outcome = validate_share_key(state.validator.as_ref(), share_key).await;
            let now = Utc::now();
            log_activation(share_key, &outcome, now);
            policy.activation(share_key, outcome, now)
        }
        Decision::ForwardCookies { rewrite } => {
            let cookies = read_cookies(&CookieJar::from_headers(request.headers()));
            let now = Utc::now();
            let share_key = policy.claimed_key(&cookies);
            let recheck = if policy.revalidate_on_request && !share_key.is_empty() {
                let outcome = validate_share_key(state.validator.as_ref(), share_key).await;
                log_recheck(share_key, &outcome, now);
                Some(outcome)
            } else {
                None
            };
            policy.forward(rewrite, cookies, recheck, now)
        }
    };

    apply(action, &state, request, next).await
}

fn is_unguarded(path: &str) -> bool {
    UNGUARDED_PREFIXES
        .iter()
        .any(|prefix| is_under(path, prefix))
}

async fn apply(action: Action, state: &AppState, mut request: Request, next: Next) -> Response {
    match action {
        Action::Redirect {
            location,
            set_cookies,
            share_headers,
        } => {
            let mut response = Redirect::temporary(&location).into_response();
            append_set_cookies(response.headers_mut(), &set_cookies);
            if let Some(credentials) = share_headers {
                write_headers(response.headers_mut(), &credentials);
            }
            response
        }
        Action::Rewrite { path } => {
            if let Err(response) = rewrite_request(&mut request, &path) {
                return response;
            }
            strip_headers(request.headers_mut());
            next.run(request).await
        }
        Action::Forward {
            rewrite,
            credentials,
            set_cookies,
        } => {
            if let Some(path) = rewrite {
                if let Err(response) = rewrite_request(&mut request, &path) {
                    return response;
                }
            }
            write_headers(request.headers_mut(), &credentials);
            request.extensions_mut().insert(ShareForwarded);

            let mut response = next.run(request).await;
            append_set_cookies(response.headers_mut(), &set_cookies);
            response
        }
        Action::Delegate => {
            strip_headers(request.headers_mut());
            match state.session.check(request.uri(), request.headers()) {
                SessionVerdict::Allow => next.run(request).await,
                SessionVerdict::SignIn(location) => Redirect::temporary(&location).into_response(),
            }
        }
    }
}

fn rewrite_request(request: &mut Request, path: &str) -> Result<(), Response> {
    let uri = rewrite_uri(request.uri(), path)
        .map_err(|e| AppError::BadRequest(format!("Invalid path: {}", e)).into_response())?;
    debug!("Rewriting {} to {}", request.uri().path(), path);
    *request.uri_mut() = uri;
    Ok(())
}

fn rewrite_uri(uri: &Uri, path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse()?);
    Ok(Uri::from_parts(parts)?)
}

fn log_activation(
    share_key: &str,
    outcome: &Result<Option<ShareContext>, ValidationError>,
    now: DateTime<Utc>,
) {
    let key = redact_key(share_key);
    match outcome {
        Ok(Some(ctx)) if ctx.is_expired_at(now) => info!("Share {} has expired", key),
        Ok(Some(ctx)) => info!("Share {} activated for album {:?}", key, ctx.album_id),
        Ok(None) => warn!("Unknown share key {}", key),
        Err(e) => error!("Share {} could not be validated: {}", key, e),
    }
}

fn log_recheck(
    share_key: &str,
    outcome: &Result<Option<ShareContext>, ValidationError>,
    now: DateTime<Utc>,
) {
    let key = redact_key(share_key);
    match outcome {
        Ok(Some(ctx)) if ctx.is_expired_at(now) => {
            info!("Share {} expired, clearing cookies", key)
        }
        Ok(Some(_)) => debug!("Share {} still valid", key),
        Ok(None) => info!("Share {} no longer exists, clearing cookies", key),
        Err(e) => warn!("Share {} recheck failed, keeping cookie values: {}", key, e),
    }
}
