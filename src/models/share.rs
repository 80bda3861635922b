use serde::{Deserialize, Serialize};

use crate::share::ShareContext;

#[derive(Debug, Deserialize)]
pub struct UnauthorizedQuery {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnauthorizedResponse {
    pub detail: String,
    pub reason: Option<String>,
}

/// The share a request resolved to, as seen by the pages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatusResponse {
    pub shared: bool,
    pub album_id: String,
    pub allow_download: bool,
}

impl From<&ShareContext> for ShareStatusResponse {
    fn from(ctx: &ShareContext) -> Self {
        Self {
            shared: ctx.is_shared(),
            album_id: ctx.album_id.clone(),
            allow_download: ctx.allow_download,
        }
    }
}
