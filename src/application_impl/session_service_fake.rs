use crate::application_port::{
    IssuedSession, RefreshToken, RotatedSession, SessionError, SessionService,
};
use crate::domain_model::{SessionId, SessionMeta, UserId};
use chrono::{Duration, Utc};

#[derive(Debug)]
pub struct FakeSessionService;

impl FakeSessionService {
    pub fn new() -> Self {
        Self
    }
}

// Minimal fake implementation for basic use only.
// Extend to simulate rotation races and revocation when needed.
#[async_trait::async_trait]
impl SessionService for FakeSessionService {
    async fn issue(
        &self,
        user_id: UserId,
        _meta: SessionMeta,
    ) -> Result<IssuedSession, SessionError> {
        let session_id = SessionId::generate();
        Ok(IssuedSession {
            refresh_token: fake_token(user_id, session_id),
            session_id,
            expires_at: Utc::now() + Duration::days(30),
        })
    }

    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        _meta: SessionMeta,
    ) -> Result<RotatedSession, SessionError> {
        let (user_id, _) = parse_fake_token(refresh_token).ok_or(SessionError::InvalidOrExpired)?;
        let session_id = SessionId::generate();
        Ok(RotatedSession {
            user_id,
            refresh_token: fake_token(user_id, session_id),
            session_id,
            expires_at: Utc::now() + Duration::days(30),
        })
    }

    async fn revoke_by_token(&self, _refresh_token: &RefreshToken) -> Result<(), SessionError> {
        Ok(())
    }

    async fn revoke_one(&self, _session_id: SessionId) -> Result<(), SessionError> {
        Ok(())
    }

    async fn revoke_all(&self, _user_id: UserId) -> Result<(), SessionError> {
        Ok(())
    }
}

fn fake_token(user_id: UserId, session_id: SessionId) -> RefreshToken {
    RefreshToken(format!("fake-refresh-token:{}:{}", user_id, session_id))
}

fn parse_fake_token(token: &RefreshToken) -> Option<(UserId, SessionId)> {
    let rest = token.0.strip_prefix("fake-refresh-token:")?;
    let (user, session) = rest.split_once(':')?;
    Some((user.parse().ok()?, session.parse().ok()?))
}
