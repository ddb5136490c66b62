//! File-per-location record store

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use wxfuse_core::{format_coordinate, AggregateRecord};

use crate::CacheResult;

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

const FILE_PREFIX: &str = "weather_";
const FILE_EXTENSION: &str = "json";

/// Cache key for a coordinate pair. Coordinates are rounded to two decimals,
/// so requests that differ only in trailing precision share an entry.
pub fn cache_key(latitude: f64, longitude: f64) -> String {
    format!(
        "{}_{}",
        format_coordinate(latitude),
        format_coordinate(longitude)
    )
}

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    pub fn new<P: AsRef<Path>>(dir: P, ttl: Duration) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entry_path(&self, latitude: f64, longitude: f64) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            FILE_PREFIX,
            cache_key(latitude, longitude),
            FILE_EXTENSION
        ))
    }

    /// Fresh cached record for the location, if any
    pub fn get(&self, latitude: f64, longitude: f64) -> Option<AggregateRecord> {
        self.get_at(latitude, longitude, SystemTime::now())
    }

    /// Lookup as of `now`. Expired entries are deleted; unreadable or corrupt
    /// ones are reported as a miss.
    pub fn get_at(&self, latitude: f64, longitude: f64, now: SystemTime) -> Option<AggregateRecord> {
        let path = self.entry_path(latitude, longitude);

        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache entry unreadable");
                return None;
            }
        };

        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age > self.ttl {
            info!(path = %path.display(), age_secs = age.as_secs(), "removing expired cache entry");
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "failed to remove expired cache entry");
            }
            return None;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache entry unreadable");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => {
                debug!(path = %path.display(), "cache hit");
                Some(record)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Store a record, replacing any previous entry atomically
    pub fn put(&self, latitude: f64, longitude: f64, record: &AggregateRecord) -> CacheResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.entry_path(latitude, longitude);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(record)?;

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), "cache entry written");
        Ok(())
    }

    /// Remove every cache entry, returning how many were deleted
    pub fn purge(&self) -> CacheResult<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_entry = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX))
                .unwrap_or(false)
                && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);

            if is_entry {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        info!(removed, dir = %self.dir.display(), "cache purged");
        Ok(removed)
    }
}
