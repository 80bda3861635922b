use once_cell::sync::Lazy;
use std::path::PathBuf;

pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("GALLERY_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/data"))
});

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| DATA_DIR.join("config.yaml"));
pub static DATABASE_PATH: Lazy<PathBuf> = Lazy::new(|| DATA_DIR.join("catalog.sqlite"));

// Paths with fixed meaning
pub const PATH_ROOT: &str = "/";
pub const PATH_GRID: &str = "/grid";
pub const PATH_SIGN_IN: &str = "/sign-in";
pub const PATH_SIGN_OUT: &str = "/sign-out";
pub const PATH_ADMIN: &str = "/admin";
pub const PATH_ADMIN_PHOTOS: &str = "/admin/photos";
pub const PATH_OG: &str = "/og";
pub const PATH_OG_SAMPLE: &str = "/og/sample";
pub const PATH_UNAUTHORIZED: &str = "/unauthorized";
pub const PREFIX_PHOTO: &str = "/p";
pub const PREFIX_TAG: &str = "/tag";
pub const PREFIX_SHARE: &str = "/share";
pub const PREFIX_LEGACY_PHOTO: &str = "/photos";
pub const PREFIX_LEGACY_TAG: &str = "/t";

/// Paths the access middleware never sees.
pub const UNGUARDED_PREFIXES: [&str; 3] = ["/api/auth", "/static", "/favicon.ico"];

// Share credential carriers
pub const SHARE_KEY_COOKIE: &str = "share-key";
pub const SHARE_ALBUM_ID_COOKIE: &str = "share-album-id";
pub const SHARE_ALLOW_DOWNLOAD_COOKIE: &str = "share-allow-download";
pub const SHARE_KEY_HEADER: &str = "x-share-key";
pub const SHARE_ALBUM_ID_HEADER: &str = "x-share-album-id";
pub const SHARE_ALLOW_DOWNLOAD_HEADER: &str = "x-share-allow-download";

pub const SESSION_COOKIE: &str = "session";

pub const DEFAULT_SHARE_TTL_HOURS: i64 = 240;

pub const REASON_VALIDATION_FAILED: &str = "Failed to validate share key";
pub const REASON_EXPIRED: &str = "expired";

pub const DEFAULT_NEAR_LIMIT: usize = 3;
