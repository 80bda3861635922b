use async_trait::async_trait;

use crate::error::ValidationError;
use crate::share::ShareContext;

/// Looks up a share record for a key.
///
/// `Ok(None)` is a definitive "no such share". `Err` means the lookup itself
/// failed and says nothing about the key.
#[async_trait]
pub trait ShareValidator: Send + Sync {
    async fn lookup(&self, share_key: &str) -> Result<Option<ShareContext>, ValidationError>;
}

/// Validates a key, treating an empty key as "no share" without a lookup.
pub async fn validate_share_key(
    validator: &dyn ShareValidator,
    share_key: &str,
) -> Result<Option<ShareContext>, ValidationError> {
    if share_key.is_empty() {
        return Ok(None);
    }
    validator.lookup(share_key).await
}
