//! Stop lookup for one run, backed by the API client and caches.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::{debug, info, warn};

use super::cache::StopCache;
use super::client::StopClient;
use super::error::StopError;
use super::table::{StopRecord, StopTable};
use crate::domain::{BoundingBox, StopCode};

/// Configuration for the in-memory lookup cache.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// TTL for cached single-stop lookups, including misses
    pub ttl_secs: u64,
    pub max_capacity: u64,
    /// Single-stop lookups in flight at once
    pub batch_size: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60,
            max_capacity: 10_000,
            batch_size: 16,
        }
    }
}

impl DirectoryConfig {
    pub fn new(ttl_secs: u64, max_capacity: u64, batch_size: usize) -> Self {
        Self {
            ttl_secs,
            max_capacity,
            batch_size,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Stop lookups for a single run.
///
/// Area listings go through the optional disk cache. Single-stop lookups
/// are memoised in memory, misses included, so each unknown code is
/// requested at most once per run.
pub struct StopDirectory {
    client: StopClient,
    disk: Option<StopCache>,
    lookups: MokaCache<StopCode, Option<Arc<StopRecord>>>,
    batch_size: usize,
}

impl StopDirectory {
    pub fn new(client: StopClient, disk: Option<StopCache>, config: &DirectoryConfig) -> Self {
        let lookups = MokaCache::builder()
            .time_to_live(config.ttl())
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            disk,
            lookups,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Every stop inside `bbox`, from the disk cache when it is fresh.
    pub async fn load_area(&self, bbox: &BoundingBox) -> Result<StopTable, StopError> {
        if let Some(stops) = self.disk.as_ref().and_then(|d| d.load(bbox)) {
            info!(stops = stops.len(), "Loaded stops from cache");
            return Ok(StopTable::from_records(stops));
        }

        let stops = self.client.fetch_area(bbox).await?;
        info!(stops = stops.len(), bounding_box = %bbox, "Fetched stops");

        if let Some(disk) = &self.disk
            && let Err(e) = disk.save(bbox, &stops)
        {
            warn!(path = %disk.path().display(), error = %e, "Failed to save stop cache");
        }

        Ok(StopTable::from_records(stops))
    }

    /// Look up one stop, memoising the result.
    ///
    /// Lookup failures are logged and cached as misses.
    pub async fn lookup(&self, code: &StopCode) -> Option<Arc<StopRecord>> {
        self.lookups
            .get_with_by_ref(code, async {
                match self.client.fetch_stop(code).await {
                    Ok(Some(record)) => Some(Arc::new(record)),
                    Ok(None) => {
                        debug!(stop = %code, "Stop not in directory");
                        None
                    }
                    Err(e) => {
                        warn!(stop = %code, error = %e, "Failed to look up stop");
                        None
                    }
                }
            })
            .await
    }

    /// Whether a lookup for `code` has already been made this run.
    pub fn has_looked_up(&self, code: &StopCode) -> bool {
        self.lookups.contains_key(code)
    }

    /// Add any of `codes` missing from `table`, looked up one by one.
    ///
    /// Returns the number of stops added.
    pub async fn complete<'a>(
        &self,
        table: &mut StopTable,
        codes: impl IntoIterator<Item = &'a StopCode>,
    ) -> usize {
        let missing = table.missing(codes);
        if missing.is_empty() {
            return 0;
        }
        debug!(missing = missing.len(), "Looking up stops outside the area");

        let mut added = 0;
        for batch in missing.chunks(self.batch_size) {
            let found = join_all(batch.iter().map(|code| self.lookup(code))).await;
            for record in found.into_iter().flatten() {
                if table.insert(StopRecord::clone(&record)) {
                    added += 1;
                }
            }
        }

        info!(added, requested = missing.len(), "Completed stop table");
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stops::StopClientConfig;
    use crate::stops::table::fixtures::record;
    use crate::stops::{StopCache, StopCacheConfig};

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    /// A client pointed at a port nothing listens on.
    fn unreachable_client() -> StopClient {
        let mut config = StopClientConfig::new("token").with_base_url("http://127.0.0.1:9");
        config.timeout_secs = 2;
        StopClient::new(config).unwrap()
    }

    fn area() -> BoundingBox {
        "0.1,52.1,0.2,52.3".parse().unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = DirectoryConfig::default();
        assert_eq!(config.ttl_secs, 3600);
        assert_eq!(config.max_capacity, 10_000);
        assert_eq!(config.batch_size, 16);
    }

    #[test]
    fn duration_methods() {
        let config = DirectoryConfig::new(90, 10, 4);
        assert_eq!(config.ttl(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn area_served_from_disk_cache() {
        let dir = tempfile::tempdir().unwrap();
        let disk = StopCache::new(StopCacheConfig::new(dir.path().join("stops.json")));
        disk.save(&area(), &[record("0500SMILT010", "Milton P&R", None, 52.245, 0.151)])
            .unwrap();

        let directory =
            StopDirectory::new(unreachable_client(), Some(disk), &DirectoryConfig::default());
        let table = directory.load_area(&area()).await.unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.contains(&code("0500SMILT010")));
    }

    #[tokio::test]
    async fn area_fetch_failure_is_an_error() {
        let directory = StopDirectory::new(unreachable_client(), None, &DirectoryConfig::default());
        let err = directory.load_area(&area()).await.unwrap_err();
        assert!(matches!(err, StopError::Http(_)));
    }

    #[tokio::test]
    async fn failed_lookups_are_memoised() {
        let directory = StopDirectory::new(unreachable_client(), None, &DirectoryConfig::default());
        let mut table = StopTable::from_records([record("A1", "Here", None, 52.2, 0.1)]);

        let wanted = [code("A1"), code("B2"), code("C3")];
        let added = directory.complete(&mut table, &wanted).await;

        assert_eq!(added, 0);
        assert_eq!(table.len(), 1);
        assert!(!directory.has_looked_up(&code("A1")));
        assert!(directory.has_looked_up(&code("B2")));
        assert!(directory.has_looked_up(&code("C3")));
        assert!(directory.lookup(&code("B2")).await.is_none());
    }

    #[tokio::test]
    async fn nothing_missing_makes_no_requests() {
        let directory = StopDirectory::new(unreachable_client(), None, &DirectoryConfig::default());
        let mut table = StopTable::from_records([record("A1", "Here", None, 52.2, 0.1)]);

        assert_eq!(directory.complete(&mut table, &[code("A1")]).await, 0);
        assert!(!directory.has_looked_up(&code("A1")));
    }
}
