use crate::constants::DEFAULT_SHARE_TTL_HOURS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_environment() -> String {
    "development".to_string()
}

impl ServerConfig {
    /// Share cookies carry the `Secure` attribute only in production.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_session_expire_minutes")]
    pub session_expire_minutes: i64,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
}

fn default_secret_key() -> String {
    "change-me-in-production-use-openssl-rand-hex-32".to_string()
}

fn default_session_expire_minutes() -> i64 {
    60 * 24
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            session_expire_minutes: default_session_expire_minutes(),
            admin_username: default_admin_username(),
        }
    }
}

/// Where photos and share records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Local SQLite catalog, session sign-in governs the admin area.
    #[default]
    Catalog,
    /// External asset-management backend; access is share-link only.
    Remote,
}

impl BackendMode {
    pub fn is_remote(self) -> bool {
        self == BackendMode::Remote
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "catalog" | "local" | "false" => Some(BackendMode::Catalog),
            "remote" | "true" => Some(BackendMode::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base for media URLs handed to browsers; falls back to `base_url`.
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:2283".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl BackendConfig {
    pub fn media_base_url(&self) -> &str {
        let url = if self.public_url.is_empty() {
            &self.base_url
        } else {
            &self.public_url
        };
        url.trim_end_matches('/')
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            base_url: default_base_url(),
            public_url: String::new(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Operator-configured "public default album" key, read on the cookie side only.
    #[serde(default)]
    pub default_share_key: String,
    #[serde(default = "default_revalidate_on_request")]
    pub revalidate_on_request: bool,
    #[serde(default = "default_ttl_hours")]
    pub default_ttl_hours: i64,
}

fn default_revalidate_on_request() -> bool {
    true
}

fn default_ttl_hours() -> i64 {
    DEFAULT_SHARE_TTL_HOURS
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_share_key: String::new(),
            revalidate_on_request: default_revalidate_on_request(),
            default_ttl_hours: default_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Zero keeps entries until capacity eviction.
    #[serde(default)]
    pub time_to_live_seconds: u64,
}

fn default_max_capacity() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_live_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

pub fn load_config(config_path: &Path) -> Config {
    let mut config = read_config_file(config_path);
    apply_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

fn read_config_file(config_path: &Path) -> Config {
    if !config_path.exists() {
        return Config::default();
    }

    match fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring invalid config {:?}: {}", config_path, e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

/// Environment switches win over the config file.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup("GALLERY_BACKEND_MODE") {
        match BackendMode::parse(&mode) {
            Some(mode) => config.backend.mode = mode,
            None => warn!("Unknown GALLERY_BACKEND_MODE value: {}", mode),
        }
    }

    if let Some(url) = lookup("GALLERY_BACKEND_URL") {
        config.backend.base_url = url;
    }

    if let Some(key) = lookup("GALLERY_BACKEND_API_KEY") {
        config.backend.api_key = Some(key);
    }

    if let Some(key) = lookup("GALLERY_DEFAULT_SHARE_KEY") {
        config.share.default_share_key = key;
    }

    if let Some(environment) = lookup("GALLERY_ENV") {
        config.server.environment = environment;
    }
}

pub fn save_default_config(config_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    fs::write(config_path, yaml)
}
