use chrono::{DateTime, Utc};
use serde::Serialize;

/// The authorization unit for one request.
///
/// An empty `share_key` means "no active share". Contexts with a key are only
/// built by a validator or by reading carriers a validator populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContext {
    pub share_key: String,
    pub album_id: String,
    pub allow_download: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for ShareContext {
    fn default() -> Self {
        Self {
            share_key: String::new(),
            album_id: String::new(),
            allow_download: true,
            expires_at: None,
        }
    }
}

impl ShareContext {
    pub fn is_shared(&self) -> bool {
        !self.share_key.is_empty()
    }

    /// A context without an expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

/// Short prefix of a share key, safe to put in logs.
pub fn redact_key(share_key: &str) -> String {
    let prefix: String = share_key.chars().take(4).collect();
    if prefix.len() < share_key.len() {
        format!("{}…", prefix)
    } else {
        prefix
    }
}
