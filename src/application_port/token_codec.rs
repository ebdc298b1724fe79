use crate::application_port::{RefreshToken, SessionError};
use crate::domain_model::{SessionId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub session_id: SessionId,
}

/// Signs and verifies refresh tokens. `user_id` and `session_id` must
/// round-trip unchanged through sign -> verify.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_refresh_token(
        &self,
        user: UserId,
        session_id: SessionId,
    ) -> Result<(RefreshToken, DateTime<Utc>), SessionError>;
    async fn verify_refresh_token(&self, token: &RefreshToken)
    -> Result<TokenClaims, SessionError>;
    /// Unauthenticated decode: signature and expiry checks disabled. Used
    /// only to recover claims for best-effort revocation cleanup.
    async fn decode_refresh_token(&self, token: &RefreshToken) -> Option<TokenClaims>;
}
