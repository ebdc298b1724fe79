use crate::domain_model::{SessionId, SessionMeta, UserId};
use crate::domain_port::CacheError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The refresh token failed signature or expiry verification. Resolved
    /// locally; the cache is never touched.
    #[error("refresh token invalid or expired")]
    InvalidOrExpired,
    /// Structurally valid token whose session record is missing or already
    /// revoked. Every session of the user has been revoked as a side effect
    /// before this error is returned.
    #[error("refresh token reused or revoked")]
    ReusedOrRevoked,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CacheError> for SessionError {
    fn from(error: CacheError) -> Self {
        SessionError::Store(error.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub refresh_token: RefreshToken,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotatedSession {
    pub user_id: UserId,
    pub refresh_token: RefreshToken,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

/// Refresh-session lifecycle: issuance, single-use rotation with reuse
/// detection, and revocation. All shared state lives in the cache; callers
/// must treat `InvalidOrExpired`/`ReusedOrRevoked` from `rotate` as a
/// terminated session and force re-authentication, never retry.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Mint a fresh session and its signed refresh token for `user_id`.
    async fn issue(&self, user_id: UserId, meta: SessionMeta)
    -> Result<IssuedSession, SessionError>;
    /// Exchange a valid refresh token for a new one, revoking the old
    /// session. A token presented twice is a replay signal: every session of
    /// that user is revoked and `ReusedOrRevoked` is returned.
    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        meta: SessionMeta,
    ) -> Result<RotatedSession, SessionError>;
    /// Best-effort revoke for logout. An expired signature does not prevent
    /// cleanup; a token with no recoverable session id is a no-op.
    async fn revoke_by_token(&self, refresh_token: &RefreshToken) -> Result<(), SessionError>;
    /// Revoke a single session. No-op for absent or already-revoked ids.
    async fn revoke_one(&self, session_id: SessionId) -> Result<(), SessionError>;
    /// Revoke every session of `user_id`.
    async fn revoke_all(&self, user_id: UserId) -> Result<(), SessionError>;
}
