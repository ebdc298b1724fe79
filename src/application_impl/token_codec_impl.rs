use crate::application_port::{RefreshToken, SessionError, TokenClaims, TokenCodec};
use crate::domain_model::{SessionId, UserId};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: String, // user id as string
    sid: String, // session id, locates the cache record
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

fn encode_refresh(
    user: UserId,
    session_id: SessionId,
    cfg: &JwtConfig,
) -> Result<(String, DateTime<Utc>), SessionError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + cfg.refresh_ttl;
    let claims = RefreshClaims {
        sub: user.to_string(),
        sid: session_id.to_string(),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.signing_key),
    )
    .map_err(|e| SessionError::Internal(e.to_string()))?;
    Ok((token, exp_dt))
}

fn decode_refresh(token: &str, cfg: &JwtConfig) -> Result<RefreshClaims, SessionError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.set_audience(&[cfg.audience.clone()]);
    v.set_issuer(&[cfg.issuer.clone()]);
    let data = decode::<RefreshClaims>(token, &DecodingKey::from_secret(&cfg.signing_key), &v)
        .map_err(|_| SessionError::InvalidOrExpired)?;
    Ok(data.claims)
}

fn decode_refresh_unverified(token: &str) -> Option<RefreshClaims> {
    let mut v = Validation::new(Algorithm::HS256);
    v.insecure_disable_signature_validation();
    v.validate_exp = false;
    v.validate_aud = false;
    let data = decode::<RefreshClaims>(token, &DecodingKey::from_secret(&[]), &v).ok()?;
    Some(data.claims)
}

fn claims_ids(claims: &RefreshClaims) -> Option<TokenClaims> {
    let user_id = claims.sub.parse::<UserId>().ok()?;
    let session_id = claims.sid.parse::<SessionId>().ok()?;
    Some(TokenClaims {
        user_id,
        session_id,
    })
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_refresh_token(
        &self,
        user: UserId,
        session_id: SessionId,
    ) -> Result<(RefreshToken, DateTime<Utc>), SessionError> {
        let (token, exp_dt) = encode_refresh(user, session_id, &self.cfg)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<TokenClaims, SessionError> {
        let claims = decode_refresh(&token.0, &self.cfg)?;
        claims_ids(&claims).ok_or(SessionError::InvalidOrExpired)
    }

    async fn decode_refresh_token(&self, token: &RefreshToken) -> Option<TokenClaims> {
        let claims = decode_refresh_unverified(&token.0)?;
        claims_ids(&claims)
    }
}
