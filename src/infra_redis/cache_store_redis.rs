use crate::domain_port::{CacheError, CacheStore, SetOptions};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const UNLOCK: &str = include_str!("unlock.lua");

pub struct RedisCacheStore {
    conn: ConnectionManager,
    prefix: String,
    unlock: Script,
}

impl RedisCacheStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisCacheStore {
            conn,
            prefix: prefix.into(),
            unlock: Script::new(UNLOCK),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCacheStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(value)
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        options: &SetOptions,
    ) -> Result<bool, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(value);
        if let Some(ttl) = options.time_to_live_seconds {
            // EX 0 is a command error; the facade contract floors at 1s.
            cmd.arg("EX").arg(ttl.max(1));
        }
        if options.only_if_not_exists {
            cmd.arg("NX");
        }
        // SET replies nil when NX suppressed the write.
        let reply: Option<String> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: u64 = conn
            .del(&key)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        conn.incr(&key, 1i64)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        // TTL replies -2 for a missing key and -1 for a key without expiry.
        let ttl: i64 = conn
            .ttl(&key)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        if ttl < 0 { Ok(None) } else { Ok(Some(ttl as u64)) }
    }

    async fn try_acquire(
        &self,
        key: &str,
        owner_token: &str,
        ttl_seconds: u64,
    ) -> Result<bool, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(&key)
            .arg(owner_token)
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .arg("NX");
        let reply: Option<String> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(reply.is_some())
    }

    async fn release(&self, key: &str, owner_token: &str) -> Result<bool, CacheError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .unlock
            .key(&key)
            .arg(owner_token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(deleted == 1)
    }
}
