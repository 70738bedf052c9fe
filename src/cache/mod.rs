mod derived;
pub mod scope;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::CacheKey;

pub use derived::DerivedDataCache;

/// Trait for cache operations
///
/// Only the invalidation side is needed by the observer; readers of the
/// derived data talk to the concrete cache directly.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Invalidate the entry, or the entries, addressed by `key`.
    /// Invalidating an absent entry is not an error.
    async fn invalidate(&self, key: &CacheKey) -> Result<()>;
}

/// Cache that holds nothing
///
/// Used when caching is disabled in the settings.
pub struct NoOpCache;

#[async_trait]
impl Cache for NoOpCache {
    async fn invalidate(&self, _key: &CacheKey) -> Result<()> {
        Ok(())
    }
}
