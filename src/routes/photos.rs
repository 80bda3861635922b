use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::auth::{AdminSession, AppState};
use crate::constants::DEFAULT_NEAR_LIMIT;
use crate::error::{AppError, AppResult};
use crate::models::{
    CameraCount, FilmCount, FocalLengthCount, GetPhotosOptions, HiddenFilter, LensCount, Photo,
    PhotoGetQuery, PhotoIdsQuery, PhotoListResponse, PhotoStamp, PhotosMeta, PhotosNear,
    RecipeCount, ShareStatusResponse, TagCount,
};
use crate::share::ResolvedShare;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photos", get(list_photos))
        .route("/photos/meta", get(photos_meta))
        .route("/photos/:id", get(get_photo))
        .route("/photos/:id/near", get(photos_near))
        .route("/tags", get(list_tags))
        .route("/cameras", get(list_cameras))
        .route("/lenses", get(list_lenses))
        .route("/focal-lengths", get(list_focal_lengths))
        .route("/films", get(list_films))
        .route("/recipes", get(list_recipes))
        .route("/photo-ids", get(list_photo_ids))
        .route("/sitemap", get(sitemap))
        .route("/share", get(share_status))
}

/// Hidden photos are only listed for the administrator.
fn visible_options(mut options: GetPhotosOptions, admin: &Option<AdminSession>) -> GetPhotosOptions {
    if admin.is_none() {
        options.hidden = HiddenFilter::Exclude;
    }
    options
}

async fn list_photos(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    admin: Option<AdminSession>,
    Query(options): Query<GetPhotosOptions>,
) -> AppResult<Json<PhotoListResponse>> {
    let options = visible_options(options, &admin);
    let photos = state.photos.get_photos(&ctx, &options).await?;
    Ok(Json(photos.into()))
}

async fn photos_meta(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    admin: Option<AdminSession>,
    Query(options): Query<GetPhotosOptions>,
) -> AppResult<Json<PhotosMeta>> {
    let options = visible_options(options, &admin);
    Ok(Json(state.photos.get_photos_meta(&ctx, &options).await?))
}

async fn get_photo(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    admin: Option<AdminSession>,
    Path(id): Path<String>,
    Query(query): Query<PhotoGetQuery>,
) -> AppResult<Json<Photo>> {
    let include_hidden = query.include_hidden && admin.is_some();

    state
        .photos
        .get_photo(&ctx, &id, include_hidden)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
}

/// `limit` sizes the window; paging does not apply.
async fn photos_near(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    admin: Option<AdminSession>,
    Path(id): Path<String>,
    Query(options): Query<GetPhotosOptions>,
) -> AppResult<Json<PhotosNear>> {
    let mut options = visible_options(options, &admin);
    let limit = options.limit.take().unwrap_or(DEFAULT_NEAR_LIMIT);
    options.offset = None;

    Ok(Json(
        state
            .photos
            .get_photos_near_id(&ctx, &id, &options, limit)
            .await?,
    ))
}

async fn list_tags(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<TagCount>>> {
    Ok(Json(state.photos.get_unique_tags(&ctx).await?))
}

async fn list_cameras(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<CameraCount>>> {
    Ok(Json(state.photos.get_unique_cameras(&ctx).await?))
}

async fn list_lenses(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<LensCount>>> {
    Ok(Json(state.photos.get_unique_lenses(&ctx).await?))
}

async fn list_focal_lengths(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<FocalLengthCount>>> {
    Ok(Json(state.photos.get_unique_focal_lengths(&ctx).await?))
}

async fn list_films(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<FilmCount>>> {
    Ok(Json(state.photos.get_unique_films(&ctx).await?))
}

async fn list_recipes(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<RecipeCount>>> {
    Ok(Json(state.photos.get_unique_recipes(&ctx).await?))
}

async fn list_photo_ids(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
    Query(query): Query<PhotoIdsQuery>,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(
        state.photos.get_public_photo_ids(&ctx, query.limit).await?,
    ))
}

async fn sitemap(
    State(state): State<AppState>,
    ResolvedShare(ctx): ResolvedShare,
) -> AppResult<Json<Vec<PhotoStamp>>> {
    Ok(Json(state.photos.get_photo_ids_and_updated_at(&ctx).await?))
}

async fn share_status(ResolvedShare(ctx): ResolvedShare) -> Json<ShareStatusResponse> {
    Json(ShareStatusResponse::from(&ctx))
}
