use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::{Cache, CacheStore};
use crate::infra_memory::MemoryCacheStore;
use crate::infra_redis::RedisCacheStore;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the refresh-token signing secret. Its
/// absence is a startup failure, never a per-request error.
pub const SIGNING_KEY_ENV: &str = "REFRESH_SIGNING_KEY";

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub credential_verifier: Arc<dyn CredentialVerifier>,
    pub token_codec: Arc<dyn TokenCodec>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let cache_store: Arc<dyn CacheStore> = match settings.cache.backend.as_str() {
            "redis" => {
                let redis_client = redis::Client::open(settings.cache.redis_url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisCacheStore::new(
                    redis_manager,
                    settings.cache.key_prefix.clone(),
                ))
            }
            "memory" => Arc::new(MemoryCacheStore::new()),
            other => return Err(anyhow::anyhow!("Unknown cache backend: {}", other)),
        };
        let cache = Cache::new(cache_store);

        let signing_key = match std::env::var(SIGNING_KEY_ENV) {
            Ok(key) if !key.is_empty() => key.into_bytes(),
            _ => {
                return Err(anyhow::anyhow!(
                    "{} must be set before the server can start",
                    SIGNING_KEY_ENV
                ));
            }
        };
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.session.issuer.clone(),
            audience: settings.session.audience.clone(),
            refresh_ttl: Duration::from_secs(settings.session.refresh_ttl_secs),
            signing_key,
        }));

        let session_service: Arc<dyn SessionService> = match settings.session.backend.as_str() {
            "fake" => Arc::new(FakeSessionService::new()),
            "real" => Arc::new(RealSessionService::new(cache.clone(), token_codec.clone())),
            other => return Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        };

        let credential_verifier: Arc<dyn CredentialVerifier> =
            match settings.identity.backend.as_str() {
                "fake" => Arc::new(FakeCredentialVerifier::new()),
                other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
            };

        info!("server started");

        Ok(Self {
            session_service,
            credential_verifier,
            token_codec,
        })
    }
}
