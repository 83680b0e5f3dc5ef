// src/cache.rs

use crate::error::Result;
use crate::table::CanonicalTable;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::debug;

type Key = (PathBuf, String);

/// Process-lifetime memo of canonical tables, keyed by (file path, rule-set name).
///
/// There is no file-change detection: entries live until [`TableCache::clear`]
/// or process exit. Failed loads are not stored.
#[derive(Default)]
pub struct TableCache {
    map: RwLock<HashMap<Key, Arc<CanonicalTable>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for (`path`, `rule_set`), or run `load` and keep its result.
    pub fn get_or_load<F>(&self, path: &Path, rule_set: &str, load: F) -> Result<Arc<CanonicalTable>>
    where
        F: FnOnce() -> Result<CanonicalTable>,
    {
        let key = (path.to_path_buf(), rule_set.to_string());

        // 1) Fast path under the read lock
        {
            let map_r = self.map.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = map_r.get(&key) {
                debug!(path = %path.display(), rule_set, "cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        // 2) Load without holding any lock; a racing loader just overwrites with an equal table
        debug!(path = %path.display(), rule_set, "cache miss");
        let table = Arc::new(load()?);

        let mut map_w = self.map.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(map_w.entry(key).or_insert(table)))
    }

    pub fn clear(&self) {
        self.map.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::normalize::households;
    use anyhow::Result;
    use std::cell::Cell;

    #[test]
    fn second_lookup_skips_the_loader() -> Result<()> {
        let cache = TableCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            households::table()
        };

        let a = cache.get_or_load(Path::new("embedded"), "households", load)?;
        let b = cache.get_or_load(Path::new("embedded"), "households", load)?;
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));

        // a different rule set over the same path is a separate entry
        cache.get_or_load(Path::new("embedded"), "other", load)?;
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_load(Path::new("embedded"), "households", load)?;
        assert_eq!(calls.get(), 3);
        Ok(())
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = TableCache::new();
        let res = cache.get_or_load(Path::new("x.csv"), "crime", || {
            Err(PipelineError::JoinEmpty {
                unmatched_left: 0,
                unmatched_right: 0,
            })
        });
        assert!(res.is_err());
        assert!(cache.is_empty());
    }
}
