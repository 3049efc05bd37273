//! Per-key page cache with stale-while-revalidate semantics
//!
//! An entry younger than the revalidate interval is served as-is. The first
//! request that finds an older entry still gets the old value immediately,
//! and a single background task regenerates it. A key that was never
//! generated is generated while the request waits ("blocking" fallback).

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A cached value and when it was generated
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub generated_at: Instant,
}

/// How a lookup was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a fresh entry
    Hit,
    /// Served from an expired entry; regeneration was scheduled
    Stale,
    /// Generated while the request waited
    Miss,
}

/// Revalidating cache of generated pages
pub struct PageCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    regenerating: Mutex<HashSet<String>>,
    revalidate: Duration,
}

impl<T> PageCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(revalidate: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            regenerating: Mutex::new(HashSet::new()),
            revalidate,
        }
    }

    /// Store a freshly generated value
    pub async fn insert(&self, key: &str, value: T) {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                generated_at: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// The cached entry for a key, regardless of age
    pub async fn peek(&self, key: &str) -> Option<CacheEntry<T>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether a background regeneration of `key` is in flight
    pub fn is_regenerating(&self, key: &str) -> bool {
        self.regenerating
            .lock()
            .map(|set| set.contains(key))
            .unwrap_or(false)
    }

    /// Get a value, generating or regenerating it as needed.
    ///
    /// `generate` resolves to `Ok(None)` when the key does not exist; that
    /// result is returned to the caller but never cached. Errors from a
    /// blocking generation are returned; errors from a background
    /// regeneration are logged and the stale entry is kept.
    pub async fn get_or_generate<F, Fut>(
        self: &Arc<Self>,
        key: &str,
        generate: F,
    ) -> Result<Option<(T, CacheStatus)>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        if let Some(entry) = self.peek(key).await {
            if entry.generated_at.elapsed() < self.revalidate {
                return Ok(Some((entry.value, CacheStatus::Hit)));
            }
            self.spawn_regeneration(key, generate);
            return Ok(Some((entry.value, CacheStatus::Stale)));
        }

        tracing::debug!("Generating {} on demand", key);
        match generate().await? {
            Some(value) => {
                self.insert(key, value.clone()).await;
                Ok(Some((value, CacheStatus::Miss)))
            }
            None => Ok(None),
        }
    }

    fn spawn_regeneration<F, Fut>(self: &Arc<Self>, key: &str, generate: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        {
            let mut in_flight = self.regenerating.lock().unwrap_or_else(|e| e.into_inner());
            if !in_flight.insert(key.to_string()) {
                return;
            }
        }

        tracing::debug!("Regenerating {} in the background", key);
        let cache = Arc::clone(self);
        let key = key.to_string();
        tokio::spawn(async move {
            let _in_flight = InFlight {
                cache: Arc::clone(&cache),
                key: key.clone(),
            };
            match generate().await {
                Ok(Some(value)) => {
                    cache.insert(&key, value).await;
                    tracing::info!("Regenerated {}", key);
                }
                Ok(None) => {
                    cache.remove(&key).await;
                    tracing::info!("{} no longer exists, evicted", key);
                }
                Err(e) => {
                    tracing::warn!("Failed to regenerate {}: {:#}", key, e);
                }
            }
        });
    }
}

/// Clears a key from the in-flight set when its regeneration ends, even by panic
struct InFlight<T> {
    cache: Arc<PageCache<T>>,
    key: String,
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        self.cache
            .regenerating
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
