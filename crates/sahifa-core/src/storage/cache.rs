//! Local JSON cache
//!
//! Mirrors each collection to `{data_dir}/cache/<collection>.json` so the
//! reader still has content when the data store cannot be reached, and so
//! local mode keeps its data between runs.
//!
//! Files are written atomically (temp file, fsync, rename). Timestamps are
//! stored as RFC 3339 strings and parsed back into dates on load.
//!
//! Each collection loads on its own. A file that is not valid JSON is moved
//! to `<collection>.json.bak` so the next write cannot destroy it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{Access, CacheError, CacheResult};
use crate::config::Config;
use crate::models::Snapshot;
use crate::remote::collections::{BOOKMARKS, CHAPTERS, NOTES, TESTIMONIALS};

/// On-disk size of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of collection files present
    pub files: usize,
    /// Total size in bytes
    pub total_bytes: u64,
}

impl CacheStats {
    pub fn total_size_human(&self) -> String {
        let bytes = self.total_bytes as f64;
        if bytes >= 1024.0 * 1024.0 {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        } else if bytes >= 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else {
            format!("{} B", self.total_bytes)
        }
    }
}

/// The outcome of reading every collection from the cache
#[derive(Debug, Default)]
pub struct CacheLoad {
    /// Records from every collection that could be read
    pub snapshot: Snapshot,
    /// Collections that had a cache file, readable or not
    pub found: Vec<&'static str>,
    /// Collections whose file could not be read
    pub failed: Vec<(&'static str, CacheError)>,
}

impl CacheLoad {
    /// True when no collection has ever been cached
    pub fn is_fresh(&self) -> bool {
        self.found.is_empty()
    }

    /// Collections whose unread data is still at its cache path
    pub fn unread(&self) -> Vec<&'static str> {
        self.failed
            .iter()
            .filter(|(_, e)| !matches!(e, CacheError::Corrupt { .. }))
            .map(|(key, _)| *key)
            .collect()
    }
}

/// JSON file cache, one file per collection
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Replace the cached records for `key`
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> CacheResult<()> {
        let json = serde_json::to_vec_pretty(items).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        atomic_write(&self.path(key), &json)?;
        debug!("Cached {} {} record(s)", items.len(), key);
        Ok(())
    }

    /// Cached records for `key`, or `None` when nothing was cached yet
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<Vec<T>>> {
        let path = self.path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::from_io(e, path, Access::Read)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(Some(items)),
            Err(e) => Err(set_aside(path, e.to_string())),
        }
    }

    /// Write all four collections
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> CacheResult<()> {
        self.save(CHAPTERS, &snapshot.chapters)?;
        self.save(BOOKMARKS, &snapshot.bookmarks)?;
        self.save(NOTES, &snapshot.notes)?;
        self.save(TESTIMONIALS, &snapshot.testimonials)?;
        Ok(())
    }

    /// Read all four collections, each independently
    ///
    /// Missing files load as empty collections. A failure in one collection
    /// is recorded in [`CacheLoad::failed`] and does not affect the others.
    pub fn load_snapshot(&self) -> CacheLoad {
        let mut load = CacheLoad::default();
        let chapters = self.load_collection(CHAPTERS, &mut load);
        let bookmarks = self.load_collection(BOOKMARKS, &mut load);
        let notes = self.load_collection(NOTES, &mut load);
        let testimonials = self.load_collection(TESTIMONIALS, &mut load);
        load.snapshot = Snapshot {
            chapters,
            bookmarks,
            notes,
            testimonials,
        };
        load
    }

    fn load_collection<T: DeserializeOwned>(
        &self,
        key: &'static str,
        load: &mut CacheLoad,
    ) -> Vec<T> {
        match self.load(key) {
            Ok(Some(items)) => {
                load.found.push(key);
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                load.found.push(key);
                load.failed.push((key, e));
                Vec::new()
            }
        }
    }

    /// Delete every cached collection
    pub fn clear(&self) -> CacheResult<()> {
        for key in [CHAPTERS, BOOKMARKS, NOTES, TESTIMONIALS] {
            let path = self.path(key);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::from_io(e, path, Access::Write)),
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        [CHAPTERS, BOOKMARKS, NOTES, TESTIMONIALS]
            .iter()
            .filter_map(|key| fs::metadata(self.path(key)).ok())
            .fold(CacheStats::default(), |mut stats, meta| {
                stats.files += 1;
                stats.total_bytes += meta.len();
                stats
            })
    }
}

/// Move an unparseable cache file to `<name>.json.bak`
///
/// When the move fails the file stays where it is and `InvalidFormat` is
/// returned instead of `Corrupt`.
fn set_aside(path: PathBuf, details: String) -> CacheError {
    let backup_path = path.with_extension("json.bak");
    match fs::rename(&path, &backup_path) {
        Ok(()) => {
            warn!("Moved corrupted cache file {:?} to {:?}", path, backup_path);
            CacheError::Corrupt {
                path,
                backup_path,
                details,
            }
        }
        Err(e) => {
            warn!("Could not move corrupted cache file {:?} aside: {}", path, e);
            CacheError::InvalidFormat { path, details }
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync it to disk
/// 3. Rename it over the target
fn atomic_write(path: &Path, data: &[u8]) -> CacheResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CacheError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| CacheError::from_io(e, temp_path.clone(), Access::Write))?;
    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| CacheError::from_io(e, temp_path.clone(), Access::Write))?;

    fs::rename(&temp_path, path).map_err(|source| CacheError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
