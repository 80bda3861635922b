use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{mapper::asset_to_photo, AssetBackend};
use crate::cache::ScopedCache;
use crate::error::{AppResult, BackendError};
use crate::models::{
    CameraCount, FilmCount, FocalLengthCount, GetPhotosOptions, LensCount, Photo, PhotoStamp,
    PhotosMeta, PhotosNear, RecipeCount, TagCount,
};
use crate::provider::{query, PhotoProvider};
use crate::share::ShareContext;

/// Photos served from the remote asset backend. Every read goes through the
/// share-scoped cache except single-photo lookups.
pub struct RemoteProvider {
    backend: Arc<dyn AssetBackend>,
    cache: ScopedCache,
    media_base_url: String,
}

impl RemoteProvider {
    pub fn new(backend: Arc<dyn AssetBackend>, cache: ScopedCache, media_base_url: &str) -> Self {
        Self {
            backend,
            cache,
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Everything the context can see: the shared album, or the assets
    /// attached to the link itself when the share has no album.
    async fn fetch_context_photos(&self, ctx: &ShareContext) -> Result<Vec<Photo>, BackendError> {
        if ctx.share_key.is_empty() {
            return Ok(Vec::new());
        }

        let assets = if !ctx.album_id.is_empty() {
            self.backend
                .album(&ctx.album_id, &ctx.share_key)
                .await?
                .map(|album| album.assets)
                .unwrap_or_default()
        } else {
            self.backend
                .shared_link(&ctx.share_key)
                .await?
                .map(|link| link.assets)
                .unwrap_or_default()
        };

        Ok(assets
            .into_iter()
            .map(|asset| asset_to_photo(asset, &self.media_base_url, ctx))
            .collect())
    }

    async fn context_photos(&self, ctx: &ShareContext) -> Result<Vec<Photo>, BackendError> {
        self.cache
            .memoize("assets", &(), ctx, || self.fetch_context_photos(ctx))
            .await
    }
}

#[async_trait]
impl PhotoProvider for RemoteProvider {
    async fn get_photos(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<Vec<Photo>> {
        let photos = self
            .cache
            .memoize("photos", options, ctx, || async {
                Ok(query::apply_options(self.context_photos(ctx).await?, options))
            })
            .await?;
        Ok(photos)
    }

    async fn get_photo(
        &self,
        ctx: &ShareContext,
        id: &str,
        include_hidden: bool,
    ) -> AppResult<Option<Photo>> {
        if ctx.share_key.is_empty() {
            return Ok(None);
        }

        let photo = self
            .backend
            .asset(id, &ctx.share_key)
            .await?
            .map(|asset| asset_to_photo(asset, &self.media_base_url, ctx))
            .filter(|photo| include_hidden || !photo.hidden);
        Ok(photo)
    }

    async fn get_photos_meta(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<PhotosMeta> {
        let meta = self
            .cache
            .memoize("meta", options, ctx, || async {
                Ok(query::photos_meta(self.context_photos(ctx).await?, options))
            })
            .await?;
        Ok(meta)
    }

    async fn get_photos_near_id(
        &self,
        ctx: &ShareContext,
        photo_id: &str,
        options: &GetPhotosOptions,
        limit: usize,
    ) -> AppResult<PhotosNear> {
        let near = self
            .cache
            .memoize("near", &(photo_id, options, limit), ctx, || async {
                let photos = self.context_photos(ctx).await?;
                Ok(query::photos_near(photos, photo_id, options, limit))
            })
            .await?;
        Ok(near)
    }

    async fn get_unique_tags(&self, ctx: &ShareContext) -> AppResult<Vec<TagCount>> {
        let tags = self
            .cache
            .memoize("tags", &(), ctx, || async {
                Ok(query::unique_tags(&self.context_photos(ctx).await?))
            })
            .await?;
        Ok(tags)
    }

    async fn get_unique_cameras(&self, ctx: &ShareContext) -> AppResult<Vec<CameraCount>> {
        let cameras = self
            .cache
            .memoize("cameras", &(), ctx, || async {
                Ok(query::unique_cameras(&self.context_photos(ctx).await?))
            })
            .await?;
        Ok(cameras)
    }

    async fn get_unique_lenses(&self, ctx: &ShareContext) -> AppResult<Vec<LensCount>> {
        let lenses = self
            .cache
            .memoize("lenses", &(), ctx, || async {
                Ok(query::unique_lenses(&self.context_photos(ctx).await?))
            })
            .await?;
        Ok(lenses)
    }

    async fn get_unique_focal_lengths(
        &self,
        ctx: &ShareContext,
    ) -> AppResult<Vec<FocalLengthCount>> {
        let focal_lengths = self
            .cache
            .memoize("focal_lengths", &(), ctx, || async {
                Ok(query::unique_focal_lengths(
                    &self.context_photos(ctx).await?,
                ))
            })
            .await?;
        Ok(focal_lengths)
    }

    // The remote backend has no film simulation or recipe metadata.
    async fn get_unique_films(&self, _ctx: &ShareContext) -> AppResult<Vec<FilmCount>> {
        Ok(Vec::new())
    }

    async fn get_unique_recipes(&self, _ctx: &ShareContext) -> AppResult<Vec<RecipeCount>> {
        Ok(Vec::new())
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
