//! The remote asset backend: wire types, the HTTP client and the mapping
//! from backend assets to gallery photos.

mod client;
pub mod mapper;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{BackendError, ValidationError};
use crate::share::{ShareContext, ShareValidator};

pub use client::RemoteClient;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifInfo {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub focal_length: Option<f64>,
    pub f_number: Option<f64>,
    pub iso: Option<i32>,
    pub exposure_time: Option<String>,
    pub date_time_original: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub original_file_name: Option<String>,
    pub file_created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// `timeline`, `archive`, `hidden` or `locked`.
    pub visibility: Option<String>,
    pub exif_info: Option<ExifInfo>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLink {
    pub id: String,
    pub key: String,
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_allow_download")]
    pub allow_download: bool,
}

fn default_allow_download() -> bool {
    true
}

impl SharedLink {
    pub fn to_context(&self, share_key: &str) -> ShareContext {
        ShareContext {
            share_key: share_key.to_string(),
            album_id: self
                .album
                .as_ref()
                .map(|album| album.id.clone())
                .unwrap_or_default(),
            allow_download: self.allow_download,
            expires_at: self.expires_at,
        }
    }
}

/// Read access to the remote asset backend. Every call carries the share key
/// so the backend enforces the share itself. `Ok(None)` means the backend
/// refused or did not know the resource.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    async fn shared_link(&self, share_key: &str) -> Result<Option<SharedLink>, BackendError>;

    async fn album(&self, album_id: &str, share_key: &str) -> Result<Option<Album>, BackendError>;

    async fn asset(&self, asset_id: &str, share_key: &str) -> Result<Option<Asset>, BackendError>;
}

/// Validates share keys against the backend's shared-link endpoint.
pub struct RemoteShareValidator {
    backend: Arc<dyn AssetBackend>,
}

impl RemoteShareValidator {
    pub fn new(backend: Arc<dyn AssetBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ShareValidator for RemoteShareValidator {
    async fn lookup(&self, share_key: &str) -> Result<Option<ShareContext>, ValidationError> {
        let link = self.backend.shared_link(share_key).await?;
        Ok(link.map(|link| link.to_context(share_key)))
    }
}
