#![cfg(test)]

use crate::app::{catalog_state, create_app, remote_state};
use crate::backend::{Album, AlbumRef, Asset, AssetBackend, SharedLink};
use crate::config::{BackendMode, Config};
use crate::database::{execute_query, init_database, queries, DbPool};
use crate::error::{BackendError, ValidationError};
use crate::models::Photo;
use crate::share::{ShareContext, ShareValidator};
use crate::utils::{format_datetime, parse_datetime};
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Create an in-memory SQLite database pool with full schema applied
pub fn create_test_db() -> DbPool {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(())
    });

    // One connection, since every in-memory connection is its own database.
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create test database pool");

    let conn = pool.get().expect("Failed to get connection from pool");
    init_database(&conn).expect("Failed to initialize test database schema");

    pool
}

pub fn test_config(mode: BackendMode) -> Config {
    let mut config = Config::default();
    config.backend.mode = mode;
    config.backend.base_url = "http://backend.test".to_string();
    config.security.secret_key = "test-secret".to_string();
    config
}

/// Create a catalog-mode test app with an in-memory database
pub fn create_test_app() -> (Router, DbPool) {
    create_test_app_with(test_config(BackendMode::Catalog))
}

pub fn create_test_app_with(config: Config) -> (Router, DbPool) {
    let pool = create_test_db();
    let app = create_app(catalog_state(Arc::new(config), pool.clone()));
    (app, pool)
}

/// Create a remote-mode test app in front of `backend`
pub fn create_remote_test_app(backend: Arc<FakeBackend>) -> Router {
    create_remote_test_app_with(test_config(BackendMode::Remote), backend)
}

pub fn create_remote_test_app_with(config: Config, backend: Arc<FakeBackend>) -> Router {
    create_app(remote_state(Arc::new(config), backend))
}

fn timestamp(value: &str) -> DateTime<Utc> {
    parse_datetime(value).expect("Invalid test timestamp")
}

/// Test fixture: a visible photo with every optional field empty
pub fn photo(id: &str, taken_at: &str) -> Photo {
    let taken_at = timestamp(taken_at);
    Photo {
        id: id.to_string(),
        title: None,
        url: format!("/media/{}/preview", id),
        download_url: Some(format!("/media/{}/original", id)),
        taken_at,
        created_at: taken_at,
        updated_at: taken_at,
        hidden: false,
        favorite: false,
        make: None,
        model: None,
        lens_make: None,
        lens_model: None,
        focal_length: None,
        f_number: None,
        iso: None,
        exposure_time: None,
        film: None,
        recipe_title: None,
        tags: Vec::new(),
    }
}

/// Test fixture: store a photo and put it in `albums`
pub fn insert_photo(pool: &DbPool, photo: &Photo, albums: &[&str]) {
    let conn = pool.get().expect("Failed to get connection");
    let tags = photo.tags.join(",");

    execute_query(
        &conn,
        queries::photos::INSERT,
        &[
            &photo.id,
            &photo.title,
            &photo.url,
            &photo.download_url,
            &format_datetime(&photo.taken_at),
            &format_datetime(&photo.created_at),
            &format_datetime(&photo.updated_at),
            &photo.hidden,
            &photo.favorite,
            &photo.make,
            &photo.model,
            &photo.lens_make,
            &photo.lens_model,
            &photo.focal_length,
            &photo.f_number,
            &photo.iso,
            &photo.exposure_time,
            &photo.film,
            &photo.recipe_title,
            &tags,
        ],
    )
    .expect("Failed to insert test photo");

    for album_id in albums {
        execute_query(&conn, queries::albums::ADD_PHOTO, &[album_id, &photo.id])
            .expect("Failed to add test photo to album");
    }
}

/// Test fixture: store a share link
pub fn insert_share_link(
    pool: &DbPool,
    key: &str,
    album_id: &str,
    allow_download: bool,
    expires_at: Option<DateTime<Utc>>,
) {
    let conn = pool.get().expect("Failed to get connection");
    let expires_at = expires_at.map(|dt| format_datetime(&dt));

    execute_query(
        &conn,
        queries::share_links::INSERT,
        &[&key, &album_id, &allow_download, &expires_at],
    )
    .expect("Failed to insert test share link");
}

/// Test fixture: a backend asset on the timeline
pub fn asset(id: &str, created_at: &str) -> Asset {
    let created_at = timestamp(created_at);
    Asset {
        id: id.to_string(),
        original_file_name: Some(format!("{}.jpg", id)),
        file_created_at: created_at,
        updated_at: created_at,
        is_favorite: false,
        is_archived: false,
        visibility: Some("timeline".to_string()),
        exif_info: None,
        tags: Vec::new(),
    }
}

/// Share validator answering from a fixed table.
#[derive(Default)]
pub struct StaticShares {
    shares: HashMap<String, ShareContext>,
    failing: bool,
    lookups: AtomicUsize,
}

impl StaticShares {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_share(
        mut self,
        key: &str,
        album_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.shares.insert(
            key.to_string(),
            ShareContext {
                share_key: key.to_string(),
                album_id: album_id.to_string(),
                allow_download: true,
                expires_at,
            },
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShareValidator for StaticShares {
    async fn lookup(&self, share_key: &str) -> Result<Option<ShareContext>, ValidationError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ValidationError(BackendError::Transport(
                "connection refused".to_string(),
            )));
        }
        Ok(self.shares.get(share_key).cloned())
    }
}

/// In-memory asset backend that enforces share keys like the real one:
/// an album or asset is only returned for a key whose link grants it.
#[derive(Default)]
pub struct FakeBackend {
    links: HashMap<String, SharedLink>,
    albums: HashMap<String, Vec<Asset>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(
        mut self,
        key: &str,
        album_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.links.insert(
            key.to_string(),
            SharedLink {
                id: format!("link-{}", key),
                key: key.to_string(),
                album: album_id.map(|id| AlbumRef { id: id.to_string() }),
                assets: Vec::new(),
                expires_at,
                allow_download: true,
            },
        );
        self
    }

    pub fn without_downloads(mut self, key: &str) -> Self {
        if let Some(link) = self.links.get_mut(key) {
            link.allow_download = false;
        }
        self
    }

    pub fn with_album(mut self, album_id: &str, assets: Vec<Asset>) -> Self {
        self.albums.insert(album_id.to_string(), assets);
        self
    }

    pub fn with_link_assets(mut self, key: &str, assets: Vec<Asset>) -> Self {
        if let Some(link) = self.links.get_mut(key) {
            link.assets = assets;
        }
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(BackendError::Status(503))
        } else {
            Ok(())
        }
    }

    fn granted_assets(&self, share_key: &str) -> Vec<Asset> {
        let Some(link) = self.links.get(share_key) else {
            return Vec::new();
        };
        match &link.album {
            Some(album) => self.albums.get(&album.id).cloned().unwrap_or_default(),
            None => link.assets.clone(),
        }
    }
}

#[async_trait]
impl AssetBackend for FakeBackend {
    async fn shared_link(&self, share_key: &str) -> Result<Option<SharedLink>, BackendError> {
        self.enter()?;
        Ok(self.links.get(share_key).cloned())
    }

    async fn album(&self, album_id: &str, share_key: &str) -> Result<Option<Album>, BackendError> {
        self.enter()?;
        let granted = self
            .links
            .get(share_key)
            .and_then(|link| link.album.as_ref())
            .is_some_and(|album| album.id == album_id);
        if !granted {
            return Ok(None);
        }

        Ok(Some(Album {
            id: album_id.to_string(),
            assets: self.albums.get(album_id).cloned().unwrap_or_default(),
        }))
    }

    async fn asset(&self, asset_id: &str, share_key: &str) -> Result<Option<Asset>, BackendError> {
        self.enter()?;
        Ok(self
            .granted_assets(share_key)
            .into_iter()
            .find(|asset| asset.id == asset_id))
    }
}
