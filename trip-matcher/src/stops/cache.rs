//! On-disk copy of the last area listing fetched from the stop directory.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::StopError;
use super::table::StopRecord;
use crate::domain::BoundingBox;

#[derive(Debug, Clone)]
pub struct StopCacheConfig {
    pub path: PathBuf,
    pub ttl_secs: u64,
}

impl StopCacheConfig {
    /// A cache at `path` that stays fresh for a day.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl_secs: 24 * 60 * 60,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for StopCacheConfig {
    fn default() -> Self {
        Self::new("stops_cache.json")
    }
}

/// The file's contents: one area and when it was fetched.
#[derive(Debug, Serialize, Deserialize)]
struct CachedArea {
    fetched_at: DateTime<Utc>,
    bounding_box: BoundingBox,
    stops: Vec<StopRecord>,
}

impl CachedArea {
    fn usable_for(&self, bbox: &BoundingBox, ttl: Duration, now: DateTime<Utc>) -> bool {
        if self.bounding_box != *bbox {
            debug!(cached = %self.bounding_box, wanted = %bbox, "Stop cache covers another area");
            return false;
        }
        let age = (now - self.fetched_at).to_std().unwrap_or_default();
        if age >= ttl {
            debug!(age_secs = age.as_secs(), "Stop cache expired");
            return false;
        }
        true
    }
}

fn cache_error(action: &str, e: impl Display) -> StopError {
    StopError::Cache {
        message: format!("failed to {action}: {e}"),
    }
}

/// Holds a single area listing. Saving a new area replaces the old one.
#[derive(Debug, Clone)]
pub struct StopCache {
    config: StopCacheConfig,
}

impl StopCache {
    pub fn new(config: StopCacheConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The cached stops for `bbox`, if the file holds a fresh listing of
    /// exactly that area. Unreadable files count as misses.
    pub fn load(&self, bbox: &BoundingBox) -> Option<Vec<StopRecord>> {
        self.load_at(bbox, Utc::now())
    }

    fn load_at(&self, bbox: &BoundingBox, now: DateTime<Utc>) -> Option<Vec<StopRecord>> {
        let text = fs::read_to_string(&self.config.path).ok()?;
        let cached: CachedArea = match serde_json::from_str(&text) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(path = %self.config.path.display(), error = %e, "Ignoring unreadable stop cache");
                return None;
            }
        };
        cached
            .usable_for(bbox, self.config.ttl(), now)
            .then_some(cached.stops)
    }

    pub fn save(&self, bbox: &BoundingBox, stops: &[StopRecord]) -> Result<(), StopError> {
        self.save_at(bbox, stops, Utc::now())
    }

    fn save_at(
        &self,
        bbox: &BoundingBox,
        stops: &[StopRecord],
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StopError> {
        let cached = CachedArea {
            fetched_at,
            bounding_box: *bbox,
            stops: stops.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&cached).map_err(|e| cache_error("encode stops", e))?;

        let path = &self.config.path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| cache_error("create cache directory", e))?;
        }
        fs::write(path, json).map_err(|e| cache_error("write cache file", e))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use tempfile::tempdir;

    use super::*;
    use crate::stops::table::fixtures::record;

    fn area() -> BoundingBox {
        "0.007896,52.155610,0.225048,52.267842".parse().unwrap()
    }

    fn stops() -> Vec<StopRecord> {
        vec![
            record("0500SMILT010", "Milton P&R", None, 52.245, 0.151),
            record("0500CCITY486", "Drummer Street", Some("Bay 12"), 52.205, 0.125),
        ]
    }

    fn cache_in(dir: &Path) -> StopCache {
        StopCache::new(StopCacheConfig::new(dir.join("stops.json")))
    }

    #[test]
    fn saved_area_loads_back() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        cache.save(&area(), &stops()).unwrap();
        assert_eq!(cache.load(&area()), Some(stops()));
    }

    #[test]
    fn other_area_misses() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache.save(&area(), &stops()).unwrap();

        let elsewhere: BoundingBox = "-0.2,51.4,0.1,51.6".parse().unwrap();
        assert!(cache.load(&elsewhere).is_none());
    }

    #[test]
    fn fresh_until_ttl() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());
        let fetched = Utc::now();
        cache.save_at(&area(), &stops(), fetched).unwrap();

        let day = TimeDelta::hours(24);
        assert!(cache.load_at(&area(), fetched + day - TimeDelta::seconds(1)).is_some());
        assert!(cache.load_at(&area(), fetched + day).is_none());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let dir = tempdir().unwrap();
        let config = StopCacheConfig {
            ttl_secs: 0,
            ..StopCacheConfig::new(dir.path().join("stops.json"))
        };
        let cache = StopCache::new(config);
        cache.save(&area(), &stops()).unwrap();

        assert!(cache.load(&area()).is_none());
    }

    #[test]
    fn missing_or_corrupt_file_misses() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());
        assert!(cache.load(&area()).is_none());

        fs::write(cache.path(), "not json").unwrap();
        assert!(cache.load(&area()).is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("stops.json");
        let cache = StopCache::new(StopCacheConfig::new(&path));

        cache.save(&area(), &stops()).unwrap();
        assert!(path.exists());
        assert_eq!(cache.path(), path);
        assert_eq!(StopCacheConfig::default().ttl(), Duration::from_secs(86_400));
    }
}
