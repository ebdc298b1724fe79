use crate::application_port::{
    IssuedSession, RefreshToken, RotatedSession, SessionError, SessionService, TokenCodec,
};
use crate::domain_model::{SessionId, SessionMeta, SessionRecord, UserId};
use crate::domain_port::{Cache, SetOptions};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn record_key(session_id: SessionId) -> String {
    format!("refresh-token:{}", session_id)
}

fn index_key(user_id: UserId) -> String {
    format!("user:{}:refresh-tokens", user_id)
}

fn ttl_secs(until: DateTime<Utc>) -> u64 {
    let now = Utc::now();
    let secs = (until - now).num_seconds();
    if secs <= 0 { 1 } else { secs as u64 }
}

pub struct RealSessionService {
    cache: Cache,
    token_codec: Arc<dyn TokenCodec>,
}

impl RealSessionService {
    pub fn new(cache: Cache, token_codec: Arc<dyn TokenCodec>) -> Self {
        Self { cache, token_codec }
    }

    /// Flip a loaded record to Revoked, keeping whatever TTL the key has
    /// left. Records are always written with a TTL, so a missing TTL means
    /// the key expired under us and expiry already revokes.
    async fn mark_revoked(&self, key: &str, record: SessionRecord) -> Result<(), SessionError> {
        if let Some(remaining) = self.cache.ttl(key).await? {
            self.cache
                .set(key, &record.revoked(), SetOptions::ttl(remaining))
                .await?;
        }
        Ok(())
    }

    /// Drop `session_id` from the user's index. Read-modify-write without a
    /// lock: the index is advisory, and a racing writer can at worst leave a
    /// stale id behind or drop a concurrent append.
    async fn prune_index(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> Result<(), SessionError> {
        let key = index_key(user_id);
        if let Some(mut ids) = self.cache.get::<Vec<SessionId>>(&key).await? {
            ids.retain(|id| *id != session_id);
            if ids.is_empty() {
                self.cache.delete(&key).await?;
            } else {
                let remaining = self.cache.ttl(&key).await?;
                let options = SetOptions {
                    time_to_live_seconds: remaining,
                    only_if_not_exists: false,
                };
                self.cache.set(&key, &ids, options).await?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn issue(
        &self,
        user_id: UserId,
        meta: SessionMeta,
    ) -> Result<IssuedSession, SessionError> {
        let session_id = SessionId::generate();
        let (refresh_token, expires_at) = self
            .token_codec
            .issue_refresh_token(user_id, session_id)
            .await?;
        let ttl = ttl_secs(expires_at);

        let record = SessionRecord::active(user_id, &meta);
        self.cache
            .set(&record_key(session_id), &record, SetOptions::ttl(ttl))
            .await?;

        // The index follows the youngest session's TTL and is rewritten
        // wholesale on every issue.
        let key = index_key(user_id);
        let mut ids: Vec<SessionId> = self.cache.get(&key).await?.unwrap_or_default();
        ids.push(session_id);
        self.cache.set(&key, &ids, SetOptions::ttl(ttl)).await?;

        debug!(%user_id, %session_id, "issued refresh session");
        Ok(IssuedSession {
            refresh_token,
            session_id,
            expires_at,
        })
    }

    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        meta: SessionMeta,
    ) -> Result<RotatedSession, SessionError> {
        // Verification failures are resolved locally; no cache access.
        let claims = self.token_codec.verify_refresh_token(refresh_token).await?;

        let key = record_key(claims.session_id);
        let record = match self.cache.get::<SessionRecord>(&key).await? {
            Some(record) if record.is_active() && record.user_id == claims.user_id => record,
            // Missing, revoked, or mismatched record: someone is replaying a
            // token we already rotated out. Burn the whole family.
            _ => {
                warn!(
                    user_id = %claims.user_id,
                    session_id = %claims.session_id,
                    "refresh token reuse detected, revoking all sessions"
                );
                self.revoke_all(claims.user_id).await?;
                return Err(SessionError::ReusedOrRevoked);
            }
        };

        // Single-use enforcement: the presented token rotates at most once.
        // A crash between this write and the issue below logs the user out
        // without compromising anything.
        self.mark_revoked(&key, record).await?;

        let issued = self.issue(claims.user_id, meta).await?;
        Ok(RotatedSession {
            user_id: claims.user_id,
            refresh_token: issued.refresh_token,
            session_id: issued.session_id,
            expires_at: issued.expires_at,
        })
    }

    async fn revoke_by_token(&self, refresh_token: &RefreshToken) -> Result<(), SessionError> {
        let claims = match self.token_codec.verify_refresh_token(refresh_token).await {
            Ok(claims) => Some(claims),
            // An expired signature must not block logout cleanup.
            Err(_) => self.token_codec.decode_refresh_token(refresh_token).await,
        };
        match claims {
            Some(claims) => self.revoke_one(claims.session_id).await,
            None => Ok(()),
        }
    }

    async fn revoke_one(&self, session_id: SessionId) -> Result<(), SessionError> {
        let key = record_key(session_id);
        let record = match self.cache.get::<SessionRecord>(&key).await? {
            Some(record) if record.is_active() => record,
            _ => return Ok(()),
        };
        let user_id = record.user_id;
        self.mark_revoked(&key, record).await?;
        self.prune_index(user_id, session_id).await?;
        debug!(%user_id, %session_id, "revoked refresh session");
        Ok(())
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<(), SessionError> {
        let index = index_key(user_id);
        let ids: Vec<SessionId> = self.cache.get(&index).await?.unwrap_or_default();
        for session_id in &ids {
            let key = record_key(*session_id);
            // Stale index entries whose records already expired are expected.
            if let Some(record) = self.cache.get::<SessionRecord>(&key).await? {
                if record.is_active() {
                    self.mark_revoked(&key, record).await?;
                }
            }
        }
        self.cache.delete(&index).await?;
        info!(%user_id, count = ids.len(), "revoked all refresh sessions");
        Ok(())
    }
}
