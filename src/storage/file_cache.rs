//! Two-level ledger cache: an in-memory map in front of a directory of
//! compressed JSON files, with a creator callback for misses.
//!
//! - Reads populate memory (from a memory or disk hit).
//! - Created values are written to disk only when asked to, and never to
//!   memory, so provisional ledgers are refetched instead of served stale.

use crate::storage::codec::Codec;
use crate::utils::{Result, METRICS};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Produces the value for a cache key on a miss.
pub type Creator<V> = Box<dyn Fn(&str) -> Result<V> + Send + Sync>;

pub struct FileCache<V> {
    dir: PathBuf,
    codec: Codec,
    creator: Creator<V>,
    memory: RwLock<HashMap<String, V>>,
}

impl<V> FileCache<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>, codec: Codec, creator: Creator<V>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            codec,
            creator,
            memory: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, self.codec.suffix()))
    }

    /// Look `name` up in memory, then on disk, then (if `can_create`) via the
    /// creator. Returns `None` when nothing is obtainable.
    pub fn get_data(&self, name: &str, save_in_cache: bool, can_create: bool) -> Result<Option<V>> {
        if let Some(v) = self.memory.read().get(name) {
            METRICS.inc_counter("cache.memory_hit");
            trace!(name, "memory hit");
            return Ok(Some(v.clone()));
        }

        let path = self.file_path(name);
        if path.exists() {
            let value: V = self.codec.read(&path)?;
            METRICS.inc_counter("cache.disk_hit");
            trace!(name, path = %path.display(), "disk hit");
            self.memory.write().insert(name.to_string(), value.clone());
            return Ok(Some(value));
        }

        if !can_create {
            METRICS.inc_counter("cache.miss");
            debug!(name, "cache miss, creation not allowed");
            return Ok(None);
        }

        let value = (self.creator)(name)?;
        METRICS.inc_counter("cache.create");
        if save_in_cache {
            self.codec.write(&path, &value)?;
            METRICS.inc_counter("cache.persist");
            debug!(name, path = %path.display(), "persisted");
        } else {
            debug!(name, "created, not persisted");
        }
        Ok(Some(value))
    }

    /// Delete every file in the cache directory and empty memory.
    pub fn clear(&self) -> Result<()> {
        self.memory.write().clear();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        debug!(dir = %self.dir.display(), "cache cleared");
        Ok(())
    }

    /// Number of cache entries on disk.
    pub fn file_count(&self) -> Result<usize> {
        Ok(self.cache_list()?.len())
    }

    /// Keys of the entries on disk, in numeric order where they are numbers.
    pub fn cache_list(&self) -> Result<Vec<String>> {
        let suffix = self.codec.suffix();
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name().into_string().unwrap_or_default();
            if let Some(name) = file_name.strip_suffix(suffix) {
                names.push(name.to_string());
            }
        }
        names.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        });
        Ok(names)
    }
}
