use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    cache::{Cache, DerivedDataCache, NoOpCache},
    config::Settings,
    domain::Event,
    format::FormatDefaults,
    observer::{EventObserver, RequestContext},
    store::{PgStore, connect_to_db},
};

/// Counts of one intake run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntakeStats {
    pub handled: u64,
    pub failed: u64,
}

/// Derived data cache sized from the settings.
///
/// The embedding application reads derived data through this cache and hands
/// a clone of it to [`build_observer`].
pub fn build_cache(settings: &Settings) -> DerivedDataCache {
    DerivedDataCache::new(settings.cache_capacity)
}

/// Wire an observer that invalidates entries of the host's `cache`.
pub fn build_observer(
    settings: &Settings,
    pool: PgPool,
    cache: &DerivedDataCache,
) -> EventObserver {
    let store = Arc::new(PgStore::new(
        pool,
        settings.format.clone(),
        settings.section_options.clone(),
    ));

    let cache: Arc<dyn Cache> = if settings.cache_enabled {
        Arc::new(cache.clone())
    } else {
        tracing::warn!("Derived data cache is disabled");
        Arc::new(NoOpCache)
    };

    let defaults = Arc::new(FormatDefaults::new(settings.section_defaults.clone()));

    EventObserver::new(
        settings.format.clone(),
        store.clone(),
        store,
        cache,
        defaults,
    )
}

/// Connect to the database and build the observer together with the cache it keeps fresh.
pub async fn setup(settings: &Settings) -> Result<(EventObserver, DerivedDataCache)> {
    let pool = connect_to_db(settings.database_url.as_str()).await?;
    let cache = build_cache(settings);
    let observer = build_observer(settings, pool, &cache);

    tracing::info!(
        format = observer.format(),
        capacity = settings.cache_capacity,
        "Observer ready"
    );

    Ok((observer, cache))
}

/// Feed newline-delimited JSON events to the observer until the reader is exhausted.
///
/// A bad line or a failing handler is logged and skipped; only read errors end the run.
pub async fn process_events<R>(observer: &EventObserver, reader: R) -> Result<IntakeStats>
where
    R: AsyncBufRead + Unpin,
{
    let ctx = RequestContext::default();
    let mut stats = IntakeStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match Event::from_json(line) {
            Ok(event) => observer.handle(&event, &ctx).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => stats.handled += 1,
            Err(e) => {
                tracing::error!(error = %e, "Failed to process event");
                stats.failed += 1;
            }
        }
    }

    tracing::debug!(
        handled = stats.handled,
        failed = stats.failed,
        "Event stream closed"
    );

    Ok(stats)
}
