use async_trait::async_trait;
use chrono::Utc;

use crate::database::{catalog, get_connection, DbPool};
use crate::error::{AppResult, BackendError, ValidationError};
use crate::models::{
    CameraCount, FilmCount, FocalLengthCount, GetPhotosOptions, LensCount, Photo, PhotoStamp,
    PhotosMeta, PhotosNear, RecipeCount, TagCount,
};
use crate::provider::{query, PhotoProvider};
use crate::share::{ShareContext, ShareValidator};

/// Photos served from the local SQLite catalog.
///
/// Without a share every photo is visible (hidden ones only on request). With a
/// share the catalog's own `share_links` row decides the album; unknown or
/// expired keys see nothing.
#[derive(Clone)]
pub struct CatalogProvider {
    pool: DbPool,
}

impl CatalogProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn context_photos(&self, ctx: &ShareContext) -> AppResult<Vec<Photo>> {
        let conn = get_connection(&self.pool)?;

        if !ctx.is_shared() {
            return catalog::all_photos(&conn);
        }

        let share = match catalog::find_share_link(&conn, &ctx.share_key)? {
            Some(share) if !share.is_expired_at(Utc::now()) => share,
            _ => return Ok(Vec::new()),
        };
        if share.album_id.is_empty() {
            return Ok(Vec::new());
        }

        let mut photos = catalog::album_photos(&conn, &share.album_id)?;
        if !share.allow_download || !ctx.allow_download {
            for photo in &mut photos {
                photo.download_url = None;
            }
        }
        Ok(photos)
    }
}

#[async_trait]
impl PhotoProvider for CatalogProvider {
    async fn get_photos(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<Vec<Photo>> {
        Ok(query::apply_options(self.context_photos(ctx)?, options))
    }

    async fn get_photo(
        &self,
        ctx: &ShareContext,
        id: &str,
        include_hidden: bool,
    ) -> AppResult<Option<Photo>> {
        Ok(self
            .context_photos(ctx)?
            .into_iter()
            .find(|photo| photo.id == id)
            .filter(|photo| include_hidden || !photo.hidden))
    }

    async fn get_photos_meta(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<PhotosMeta> {
        Ok(query::photos_meta(self.context_photos(ctx)?, options))
    }

    async fn get_photos_near_id(
        &self,
        ctx: &ShareContext,
        photo_id: &str,
        options: &GetPhotosOptions,
        limit: usize,
    ) -> AppResult<PhotosNear> {
        Ok(query::photos_near(
            self.context_photos(ctx)?,
            photo_id,
            options,
            limit,
        ))
    }

    async fn get_unique_tags(&self, ctx: &ShareContext) -> AppResult<Vec<TagCount>> {
        Ok(query::unique_tags(&self.context_photos(ctx)?))
    }

    async fn get_unique_cameras(&self, ctx: &ShareContext) -> AppResult<Vec<CameraCount>> {
        Ok(query::unique_cameras(&self.context_photos(ctx)?))
    }

    async fn get_unique_lenses(&self, ctx: &ShareContext) -> AppResult<Vec<LensCount>> {
        Ok(query::unique_lenses(&self.context_photos(ctx)?))
    }

    async fn get_unique_focal_lengths(
        &self,
        ctx: &ShareContext,
    ) -> AppResult<Vec<FocalLengthCount>> {
        Ok(query::unique_focal_lengths(&self.context_photos(ctx)?))
    }

    async fn get_unique_films(&self, ctx: &ShareContext) -> AppResult<Vec<FilmCount>> {
        Ok(query::unique_films(&self.context_photos(ctx)?))
    }

    async fn get_unique_recipes(&self, ctx: &ShareContext) -> AppResult<Vec<RecipeCount>> {
        Ok(query::unique_recipes(&self.context_photos(ctx)?))
    }

    async fn get_public_photo_ids(
        &self,
        ctx: &ShareContext,
        limit: Option<usize>,
    ) -> AppResult<Vec<String>> {
        let photos = self.get_photos(ctx, &GetPhotosOptions::default()).await?;
        Ok(query::photo_ids(&photos, limit))
    }

    async fn get_photo_ids_and_updated_at(
        &self,
        ctx: &ShareContext,
    ) -> AppResult<Vec<PhotoStamp>> {
        let photos = self.get_photos(ctx, &GetPhotosOptions::default()).await?;
        Ok(query::photo_stamps(&photos))
    }
}

/// Share validation against the catalog's `share_links` table.
#[derive(Clone)]
pub struct CatalogShareStore {
    pool: DbPool,
}

impl CatalogShareStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareValidator for CatalogShareStore {
    async fn lookup(&self, share_key: &str) -> Result<Option<ShareContext>, ValidationError> {
        get_connection(&self.pool)
            .and_then(|conn| catalog::find_share_link(&conn, share_key))
            .map_err(|e| ValidationError(BackendError::Catalog(e.to_string())))
    }
}
