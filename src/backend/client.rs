use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::{Album, Asset, AssetBackend, SharedLink};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::share::redact_key;

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        share_key: &str,
    ) -> Result<Option<T>, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} (share {})", url, redact_key(share_key));

        let mut request = self.http.get(&url);
        if !share_key.is_empty() {
            request = request.query(&[("key", share_key)]);
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }
        if !status.is_success() {
            warn!("Backend returned {} for {}", status.as_u16(), path);
            return Err(BackendError::Status(status.as_u16()));
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl AssetBackend for RemoteClient {
    async fn shared_link(&self, share_key: &str) -> Result<Option<SharedLink>, BackendError> {
        self.get_json("/api/shared-links/me", share_key).await
    }

    async fn album(&self, album_id: &str, share_key: &str) -> Result<Option<Album>, BackendError> {
        self.get_json(&format!("/api/albums/{}", album_id), share_key)
            .await
    }

    async fn asset(&self, asset_id: &str, share_key: &str) -> Result<Option<Asset>, BackendError> {
        self.get_json(&format!("/api/assets/{}", asset_id), share_key)
            .await
    }
}
