/// Example demonstrating the refresh-session lifecycle against the in-memory
/// cache backend: issue, rotate, replay detection, cascading revocation.
///
/// ```text
/// $ cargo run --bin session_demo
/// ```
use pompadour::application_impl::{JwtConfig, JwtHs256Codec, RealSessionService};
use pompadour::application_port::{SessionService, TokenCodec};
use pompadour::domain_model::{SessionMeta, UserId};
use pompadour::domain_port::Cache;
use pompadour::infra_memory::MemoryCacheStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("session_demo=debug,pompadour=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let cache = Cache::new(Arc::new(MemoryCacheStore::new()));
    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
        issuer: "pompadour.auth".to_string(),
        audience: "salon-client".to_string(),
        refresh_ttl: Duration::from_secs(60 * 60), // 1 hour
        signing_key: b"demo-signing-key".to_vec(),
    }));
    let sessions = RealSessionService::new(cache, token_codec);

    let user = UserId(uuid::Uuid::new_v4());

    let first = sessions.issue(user, SessionMeta::default()).await?;
    println!("issued session {}", first.session_id);

    let second = sessions.issue(user, SessionMeta::default()).await?;
    println!("issued second session {}", second.session_id);

    let rotated = sessions
        .rotate(&first.refresh_token, SessionMeta::default())
        .await?;
    println!("rotated {} -> {}", first.session_id, rotated.session_id);

    // Presenting the already-rotated token again is a replay signal and
    // burns every session of the user.
    let replay = sessions
        .rotate(&first.refresh_token, SessionMeta::default())
        .await;
    println!("replay of superseded token: {:?}", replay.err());

    let after_cascade = sessions
        .rotate(&rotated.refresh_token, SessionMeta::default())
        .await;
    println!("rotation after cascade: {:?}", after_cascade.err());

    let other_after_cascade = sessions
        .rotate(&second.refresh_token, SessionMeta::default())
        .await;
    println!(
        "second session after cascade: {:?}",
        other_after_cascade.err()
    );

    Ok(())
}
