//! The photo read contract used by every route.
//!
//! Each operation receives the caller's [`ShareContext`] explicitly and only
//! returns photos that context may see.

pub mod catalog;
pub mod query;
pub mod remote;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    CameraCount, FilmCount, FocalLengthCount, GetPhotosOptions, LensCount, Photo, PhotoStamp,
    PhotosMeta, PhotosNear, RecipeCount, TagCount,
};
use crate::share::ShareContext;

pub use catalog::{CatalogProvider, CatalogShareStore};
pub use remote::RemoteProvider;

#[async_trait]
pub trait PhotoProvider: Send + Sync {
    async fn get_photos(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<Vec<Photo>>;

    /// `None` when the photo is unknown, outside the context, or hidden and
    /// `include_hidden` is false.
    async fn get_photo(
        &self,
        ctx: &ShareContext,
        id: &str,
        include_hidden: bool,
    ) -> AppResult<Option<Photo>>;

    async fn get_photos_meta(
        &self,
        ctx: &ShareContext,
        options: &GetPhotosOptions,
    ) -> AppResult<PhotosMeta>;

    async fn get_photos_near_id(
        &self,
        ctx: &ShareContext,
        photo_id: &str,
        options: &GetPhotosOptions,
        limit: usize,
    ) -> AppResult<PhotosNear>;

    async fn get_unique_tags(&self, ctx: &ShareContext) -> AppResult<Vec<TagCount>>;

    async fn get_unique_cameras(&self, ctx: &ShareContext) -> AppResult<Vec<CameraCount>>;

    async fn get_unique_lenses(&self, ctx: &ShareContext) -> AppResult<Vec<LensCount>>;

    async fn get_unique_focal_lengths(
        &self,
        ctx: &ShareContext,
    ) -> AppResult<Vec<FocalLengthCount>>;

    async fn get_unique_films(&self, ctx: &ShareContext) -> AppResult<Vec<FilmCount>>;

    async fn get_unique_recipes(&self, ctx: &ShareContext) -> AppResult<Vec<RecipeCount>>;

    /// Ids of visible photos in default order, capped by `limit` when positive.
    async fn get_public_photo_ids(
        &self,
        ctx: &ShareContext,
        limit: Option<usize>,
    ) -> AppResult<Vec<String>>;

    async fn get_photo_ids_and_updated_at(&self, ctx: &ShareContext)
        -> AppResult<Vec<PhotoStamp>>;
}
