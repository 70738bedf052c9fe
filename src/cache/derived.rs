use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::{cache::Cache, domain::CacheKey};

/// In-process store of derived course data (progress, completion counts...)
#[derive(Clone)]
pub struct DerivedDataCache {
    inner: MokaCache<CacheKey, Arc<str>>,
}

impl DerivedDataCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(max_capacity)
            .support_invalidation_closures()
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: impl Into<Arc<str>>) {
        self.inner.insert(key, value.into()).await;
    }
}

#[async_trait]
impl Cache for DerivedDataCache {
    #[tracing::instrument(name = "cache::invalidate", skip(self, key), fields(key = %key))]
    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        if key.is_course_wide() {
            let wide = *key;
            self.inner
                .invalidate_entries_if(move |cached, _| wide.covers(cached))
                .context("Failed to register invalidation predicate")?;
            self.inner.run_pending_tasks().await;
        } else {
            self.inner.invalidate(key).await;
        }

        Ok(())
    }
}
