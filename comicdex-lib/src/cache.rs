//! Best-effort cache of assembled comic aggregates.
//!
//! Callers treat every [`CacheError`] as a miss: failures are logged and the
//! primary read or write goes on without the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use comicdex_catalog::Comic;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::CacheError;

pub trait CacheBackend: Send + Sync {
    fn get(&self, code: &str) -> Result<Option<Comic>, CacheError>;
    fn put(&self, comic: Comic) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
    /// Drop expired entries, returning how many were removed.
    fn sweep(&self) -> Result<usize, CacheError>;
}

struct Entry {
    stored: Instant,
    comic: Comic,
}

/// In-process TTL cache keyed by comic code.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Poisoned)
    }

    fn expired(&self, entry: &Entry) -> bool {
        entry.stored.elapsed() >= self.ttl
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, code: &str) -> Result<Option<Comic>, CacheError> {
        let mut entries = self.lock()?;
        match entries.get(code) {
            Some(entry) if !self.expired(entry) => Ok(Some(entry.comic.clone())),
            Some(_) => {
                entries.remove(code);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, comic: Comic) -> Result<(), CacheError> {
        let entry = Entry {
            stored: Instant::now(),
            comic,
        };
        self.lock()?.insert(entry.comic.code.clone(), entry);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.clear();
        Ok(())
    }

    fn sweep(&self) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored.elapsed() < self.ttl);
        Ok(before - entries.len())
    }
}

/// Sweep `cache` every `every` until the returned task is aborted.
pub fn spawn_sweeper(cache: Arc<dyn CacheBackend>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cache.sweep() {
                Ok(0) => {}
                Ok(n) => log::debug!("cache sweep removed {n} expired entries"),
                Err(e) => log::warn!("cache sweep failed: {e}"),
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
