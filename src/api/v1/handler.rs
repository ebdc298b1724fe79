use super::error::*;
use crate::application_port::{
    CredentialVerifier, RefreshToken, SessionService, TokenCodec,
};
use crate::domain_model::{SessionId, SessionMeta, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

fn session_meta(addr: Option<SocketAddr>, user_agent: Option<String>) -> SessionMeta {
    SessionMeta {
        ip_address: addr.map(|a| a.ip().to_string()),
        user_agent,
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: UserId,
    pub refresh_token: RefreshToken,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    addr: Option<SocketAddr>,
    user_agent: Option<String>,
    credential_verifier: Arc<dyn CredentialVerifier>,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = credential_verifier
        .verify_credentials(&body.username, &body.password)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let issued = session_service
        .issue(user_id, session_meta(addr, user_agent))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = SessionResponse {
        user_id,
        refresh_token: issued.refresh_token,
        session_id: issued.session_id,
        expires_at: issued.expires_at,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    addr: Option<SocketAddr>,
    user_agent: Option<String>,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let rotated = session_service
        .rotate(
            &RefreshToken(body.refresh_token),
            session_meta(addr, user_agent),
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = SessionResponse {
        user_id: rotated.user_id,
        refresh_token: rotated.refresh_token,
        session_id: rotated.session_id,
        expires_at: rotated.expires_at,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub all_devices: bool,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    body: LogoutRequest,
    session_service: Arc<dyn SessionService>,
    token_codec: Arc<dyn TokenCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = RefreshToken(body.refresh_token);

    if body.all_devices {
        match token_codec.verify_refresh_token(&token).await {
            Ok(claims) => session_service
                .revoke_all(claims.user_id)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?,
            // Unverifiable token: fall back to single-session cleanup.
            Err(_) => session_service
                .revoke_by_token(&token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?,
        }
    } else {
        session_service
            .revoke_by_token(&token)
            .await
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)?;
    }

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}
