//! Share-scoped memoization of backend reads.
//!
//! Entries are keyed by operation name, serialized arguments and the full
//! [`ShareContext`]. Two contexts that differ in any field never see each
//! other's entries, even when operation and arguments are identical.
//!
//! Concurrent misses on the same key are coalesced into one fetch. Failed
//! fetches are not stored.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::BackendError;
use crate::share::{redact_key, ShareContext};

type CachedValue = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    operation: &'static str,
    arguments: String,
    context: ShareContext,
}

#[derive(Clone)]
pub struct ScopedCache {
    entries: Cache<CacheKey, CachedValue>,
}

impl ScopedCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);
        if config.time_to_live_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(config.time_to_live_seconds));
        }

        Self {
            entries: builder.build(),
        }
    }

    /// Returns the cached result for `(operation, arguments, context)` or runs
    /// `fetch` and stores its value.
    ///
    /// Each operation name must always produce the same `T`.
    pub async fn memoize<T, A, F, Fut>(
        &self,
        operation: &'static str,
        arguments: &A,
        context: &ShareContext,
        fetch: F,
    ) -> Result<T, BackendError>
    where
        T: Clone + Send + Sync + 'static,
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let arguments =
            serde_json::to_string(arguments).map_err(|e| BackendError::Decode(e.to_string()))?;
        let key = CacheKey {
            operation,
            arguments,
            context: context.clone(),
        };

        let value = self
            .entries
            .try_get_with(key, async move {
                debug!(
                    "Cache miss for {} (share {})",
                    operation,
                    redact_key(&context.share_key)
                );
                fetch().await.map(|value| Arc::new(value) as CachedValue)
            })
            .await
            .map_err(|e| (*e).clone())?;

        value.downcast_ref::<T>().cloned().ok_or_else(|| {
            BackendError::Decode(format!("cached value for {} has an unexpected type", operation))
        })
    }
}
