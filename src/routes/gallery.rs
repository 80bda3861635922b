//! JSON stand-ins for the gallery pages. Each returns the data its page
//! would render for the request's share context.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use cookie::{Cookie, SameSite};
use serde::Serialize;

use crate::auth::{AdminSession, AppState};
use crate::constants::{
    PATH_ADMIN_PHOTOS, PATH_GRID, PATH_OG_SAMPLE, PATH_ROOT, PATH_SIGN_IN, PATH_SIGN_OUT,
    PATH_UNAUTHORIZED, SESSION_COOKIE,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    GetPhotosOptions, HiddenFilter, Photo, PhotoListResponse, UnauthorizedQuery,
    UnauthorizedResponse,
};
use crate::share::codec::{append_set_cookies, removal_cookies};
use crate::share::ResolvedShare;

const OG_SAMPLE_SIZE: usize = 4;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(PATH_ROOT, get(home))
        .route(PATH_GRID, get(home))
        .route("/p/:id", get(photo_page))
        .route("/tag/:tag", get(tag_page))
        .route(PATH_UNAUTHORIZED, get(unauthorized))
        .route(PATH_OG_SAMPLE, get(og_sample))
        .route(PATH_ADMIN_PHOTOS, get(admin_photos))
        .route(PATH_SIGN_IN, get(sign_in))
        .route(PATH_SIGN_OUT, get(sign_out))
}

async fn home(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<PhotoListResponse>> {
    let photos = state
        .photos
        .get_photos(&ctx, &GetPhotosOptions::default())
        .await?;
    Ok(Json(photos.into()))
}

async fn photo_page(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    Path(id): Path<String>,
) -> AppResult<Json<Photo>> {
    state
        .photos
        .get_photo(&ctx, &id, false)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
}

async fn tag_page(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    Path(tag): Path<String>,
) -> AppResult<Json<PhotoListResponse>> {
    let options = GetPhotosOptions {
        tag: Some(tag),
        ..Default::default()
    };
    let photos = state.photos.get_photos(&ctx, &options).await?;
    Ok(Json(photos.into()))
}

async fn unauthorized(Query(query): Query<UnauthorizedQuery>) -> Response {
    let body = UnauthorizedResponse {
        detail: "Access to this gallery was denied".to_string(),
        reason: query.reason.filter(|reason| !reason.is_empty()),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

async fn og_sample(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(
        state
            .photos
            .get_public_photo_ids(&ctx, Some(OG_SAMPLE_SIZE))
            .await?,
    ))
}

async fn admin_photos(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    _admin: AdminSession,
) -> AppResult<Json<PhotoListResponse>> {
    let options = GetPhotosOptions {
        hidden: HiddenFilter::Include,
        ..Default::default()
    };
    let photos = state.photos.get_photos(&ctx, &options).await?;
    Ok(Json(photos.into()))
}

#[derive(Serialize)]
struct SignInResponse {
    detail: String,
}

async fn sign_in() -> (StatusCode, Json<SignInResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(SignInResponse {
            detail: "Sign in required".to_string(),
        }),
    )
}

/// Drops the share and the session. In remote mode the access middleware
/// answers this path before it gets here.
async fn sign_out(State(state): State<AppState>) -> Response {
    let secure = state.policy.secure_cookies;
    let mut cookies = removal_cookies(secure);
    cookies.push(
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(secure)
            .http_only(true)
            .max_age(time::Duration::ZERO)
            .build(),
    );

    let mut response = Redirect::temporary(PATH_ROOT).into_response();
    append_set_cookies(response.headers_mut(), &cookies);
    response
}
