use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Another holder currently owns the lock. Distinct from transport
    /// failures so callers can tell "contended" from "cache unavailable".
    #[error("lock '{0}' is held by another owner")]
    LockNotAcquired(String),
    #[error("cache transport error: {0}")]
    Transport(String),
    #[error("cache codec error: {0}")]
    Codec(String),
}

#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Key is guaranteed inaccessible after this many seconds. `None` means
    /// the key persists until explicitly deleted.
    pub time_to_live_seconds: Option<u64>,
    /// Conditional write: succeeds only if the key was absent.
    pub only_if_not_exists: bool,
}

impl SetOptions {
    pub fn ttl(seconds: u64) -> Self {
        SetOptions {
            time_to_live_seconds: Some(seconds),
            only_if_not_exists: false,
        }
    }
}

/// Raw backend operations behind the [`Cache`] facade. Implementations see
/// opaque strings only; every operation may suspend on a network round-trip.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value at `key`. Absent and expired keys are both `None`,
    /// never an error.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Write `value` under `key`, honoring TTL and conditional-write options.
    /// Returns whether the intended write actually occurred.
    async fn set_raw(&self, key: &str, value: &str, options: &SetOptions)
    -> Result<bool, CacheError>;
    /// Idempotent removal; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    /// Atomic increment, creating the counter at 0 if absent. Must not lose
    /// updates under concurrent callers.
    async fn incr(&self, key: &str) -> Result<i64, CacheError>;
    /// Remaining time-to-live in seconds; `None` when the key is absent or
    /// has no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<u64>, CacheError>;
    /// Store `owner_token` at `key` only if no live holder exists.
    async fn try_acquire(
        &self,
        key: &str,
        owner_token: &str,
        ttl_seconds: u64,
    ) -> Result<bool, CacheError>;
    /// Compare-and-delete executed as one indivisible step: remove `key` only
    /// while it still holds `owner_token`. Returns whether a delete happened.
    async fn release(&self, key: &str, owner_token: &str) -> Result<bool, CacheError>;
}

/// Typed facade over a [`CacheStore`]. Values round-trip through JSON; the
/// backing store never learns their shape.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Cache { store }
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        match self.store.get_raw(key).await? {
            Some(raw) => {
                let value =
                    serde_json::from_str(&raw).map_err(|e| CacheError::Codec(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T, options: SetOptions) -> Result<bool, CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value).map_err(|e| CacheError::Codec(e.to_string()))?;
        self.store.set_raw(key, &raw, &options).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await
    }

    pub async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        self.store.incr(key).await
    }

    pub async fn ttl(&self, key: &str) -> Result<Option<u64>, CacheError> {
        self.store.ttl(key).await
    }

    /// Run `critical_section` under a mutual-exclusion lock shared by every
    /// process instance talking to the same store.
    ///
    /// Fails fast with [`CacheError::LockNotAcquired`] when another holder
    /// owns `lock_key`; there is no queueing or retry here. The lock carries
    /// a fresh random ownership token, and `lock_ttl_seconds` bounds how long
    /// an abandoned holder can block successors — size it above the critical
    /// section's worst case, since a section outliving the TTL loses the lock
    /// and may run concurrently with the next holder.
    ///
    /// Release is compare-and-delete on the ownership token, so a holder that
    /// outlived its TTL cannot delete a successor's lock. A skipped or failed
    /// release is logged, not surfaced: the critical section already ran.
    pub async fn with_lock<F, Fut, T>(
        &self,
        lock_key: &str,
        lock_ttl_seconds: u64,
        critical_section: F,
    ) -> Result<T, CacheError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        let key = format!("lock:{}", lock_key);
        let owner_token = nanoid::nanoid!();

        if !self
            .store
            .try_acquire(&key, &owner_token, lock_ttl_seconds)
            .await?
        {
            return Err(CacheError::LockNotAcquired(lock_key.to_string()));
        }

        let result = critical_section().await;

        match self.store.release(&key, &owner_token).await {
            Ok(true) => {}
            Ok(false) => warn!(lock_key, "lock release skipped: ownership token no longer matches"),
            Err(e) => warn!(lock_key, error = %e, "lock release failed"),
        }

        Ok(result)
    }
}
