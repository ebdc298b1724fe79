use crate::application_port::{CredentialError, CredentialVerifier};
use crate::domain_model::UserId;

#[derive(Debug)]
pub struct FakeCredentialVerifier;

impl FakeCredentialVerifier {
    pub fn new() -> Self {
        Self
    }
}

// Deterministic identities for development: any non-empty password is
// accepted and the user id is derived from the username.
#[async_trait::async_trait]
impl CredentialVerifier for FakeCredentialVerifier {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserId, CredentialError> {
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::InvalidCredentials);
        }
        Ok(UserId(uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_OID,
            username.as_bytes(),
        )))
    }
}
