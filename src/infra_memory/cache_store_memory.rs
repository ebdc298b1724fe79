use crate::domain_port::{CacheError, CacheStore, SetOptions};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

struct StoredValue {
    data: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn live(data: String, ttl_seconds: Option<u64>) -> Self {
        StoredValue {
            data,
            // Same floor as the Redis adapter: a zero TTL still outlives the
            // write that created it.
            expires_at: ttl_seconds.map(|s| Instant::now() + Duration::from_secs(s.max(1))),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// In-process [`CacheStore`] on a sharded map. Expiry is checked on access
/// rather than swept in the background; per-key atomicity comes from the
/// shard lock held by the entry API, which is never held across an await.
pub struct MemoryCacheStore {
    entries: DashMap<String, StoredValue>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        MemoryCacheStore {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.entries.remove_if(key, |_, value| value.is_expired());
        Ok(self
            .entries
            .get(key)
            .filter(|value| !value.is_expired())
            .map(|value| value.data.clone()))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        options: &SetOptions,
    ) -> Result<bool, CacheError> {
        let stored = StoredValue::live(value.to_string(), options.time_to_live_seconds);
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if options.only_if_not_exists && !occupied.get().is_expired() {
                    return Ok(false);
                }
                occupied.insert(stored);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoredValue::live("0".to_string(), None));
        if entry.is_expired() {
            *entry = StoredValue::live("0".to_string(), None);
        }
        let next = entry
            .data
            .parse::<i64>()
            .map_err(|e| CacheError::Codec(e.to_string()))?
            + 1;
        entry.data = next.to_string();
        Ok(next)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, CacheError> {
        Ok(self
            .entries
            .get(key)
            .filter(|value| !value.is_expired())
            .and_then(|value| value.expires_at)
            .map(|at| {
                let remaining = at.saturating_duration_since(Instant::now());
                // Live keys report at least 1, matching Redis' TTL rounding.
                remaining.as_secs().max(1)
            }))
    }

    async fn try_acquire(
        &self,
        key: &str,
        owner_token: &str,
        ttl_seconds: u64,
    ) -> Result<bool, CacheError> {
        let stored = StoredValue::live(owner_token.to_string(), Some(ttl_seconds));
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(stored);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str, owner_token: &str) -> Result<bool, CacheError> {
        Ok(self
            .entries
            .remove_if(key, |_, value| {
                !value.is_expired() && value.data == owner_token
            })
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_key_reads_as_absent() {
        let store = MemoryCacheStore::new();
        store
            .set_raw("k", "v", &SetOptions::ttl(1))
            .await
            .unwrap();
        assert_eq!(store.get_raw("k").await.unwrap(), Some("v".to_string()));

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(store.get_raw("k").await.unwrap(), None);
        assert_eq!(store.ttl("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn conditional_set_respects_live_keys_only() {
        let store = MemoryCacheStore::new();
        let nx = SetOptions {
            time_to_live_seconds: Some(30),
            only_if_not_exists: true,
        };
        assert!(store.set_raw("k", "first", &nx).await.unwrap());
        assert!(!store.set_raw("k", "second", &nx).await.unwrap());
        assert_eq!(
            store.get_raw("k").await.unwrap(),
            Some("first".to_string())
        );
    }

    #[tokio::test]
    async fn concurrent_increments_lose_nothing() {
        let store = std::sync::Arc::new(MemoryCacheStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.incr("hits").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.incr("hits").await.unwrap(), 33);
    }

    #[tokio::test]
    async fn release_requires_matching_owner() {
        let store = MemoryCacheStore::new();
        assert!(store.try_acquire("lock:a", "owner-1", 30).await.unwrap());
        assert!(!store.try_acquire("lock:a", "owner-2", 30).await.unwrap());

        assert!(!store.release("lock:a", "owner-2").await.unwrap());
        assert!(store.release("lock:a", "owner-1").await.unwrap());
        assert!(store.try_acquire("lock:a", "owner-2", 30).await.unwrap());
    }
}
