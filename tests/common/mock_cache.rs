use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use format_observer::{cache::Cache, domain::CacheKey};

#[derive(Clone, Default)]
pub struct RecordingCache {
    keys: Arc<Mutex<Vec<CacheKey>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl RecordingCache {
    pub fn keys(&self) -> Vec<CacheKey> {
        self.keys.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.keys().iter().map(ToString::to_string).collect()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }
}

#[async_trait]
impl Cache for RecordingCache {
    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(anyhow!("Simulated cache failure"));
        }
        self.keys.lock().unwrap().push(*key);
        Ok(())
    }
}
