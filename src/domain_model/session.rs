use crate::domain_model::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random identifier embedded in a refresh token's claims, used to locate the
/// matching [`SessionRecord`] in the cache.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(SessionId)
    }
}

/// A session flips Active -> Revoked exactly once and never back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Revoked,
}

/// Cache-resident state of one refresh-token family. The record exists in the
/// cache iff its TTL has not elapsed; expiry is implicit revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub status: SessionStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionRecord {
    pub fn active(user_id: UserId, meta: &SessionMeta) -> Self {
        SessionRecord {
            user_id,
            status: SessionStatus::Active,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn revoked(mut self) -> Self {
        self.status = SessionStatus::Revoked;
        self
    }
}

/// Request provenance carried into the session record for audit. Never used
/// for any security decision.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
