use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Resolves a login to a user identity. Entity storage lives outside this
/// service; the port exists so the HTTP layer has a swappable seam.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserId, CredentialError>;
}
