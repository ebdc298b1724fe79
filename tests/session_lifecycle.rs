use pompadour::application_impl::{JwtConfig, JwtHs256Codec, RealSessionService};
use pompadour::application_port::{SessionError, SessionService, TokenCodec};
use pompadour::domain_model::{SessionId, SessionMeta, UserId};
use pompadour::domain_port::Cache;
use pompadour::infra_memory::MemoryCacheStore;
use std::sync::Arc;
use std::time::Duration;

fn service() -> (RealSessionService, Cache) {
    let cache = Cache::new(Arc::new(MemoryCacheStore::new()));
    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
        issuer: "pompadour.auth".to_string(),
        audience: "salon-client".to_string(),
        refresh_ttl: Duration::from_secs(3600),
        signing_key: b"test-signing-key".to_vec(),
    }));
    (
        RealSessionService::new(cache.clone(), token_codec),
        cache,
    )
}

fn user() -> UserId {
    UserId(uuid::Uuid::new_v4())
}

fn meta() -> SessionMeta {
    SessionMeta::default()
}

#[tokio::test]
async fn rotation_returns_a_fresh_token_and_session() {
    let (sessions, _) = service();
    let user = user();

    let issued = sessions.issue(user, meta()).await.unwrap();
    let rotated = sessions.rotate(&issued.refresh_token, meta()).await.unwrap();

    assert_eq!(rotated.user_id, user);
    assert_ne!(rotated.session_id, issued.session_id);
    assert_ne!(rotated.refresh_token.0, issued.refresh_token.0);
}

#[tokio::test]
async fn rotation_is_single_use_and_replay_burns_the_family() {
    let (sessions, _) = service();
    let user = user();

    let issued = sessions.issue(user, meta()).await.unwrap();
    let rotated = sessions.rotate(&issued.refresh_token, meta()).await.unwrap();

    // Presenting the superseded token again is a replay.
    let replay = sessions.rotate(&issued.refresh_token, meta()).await;
    assert!(matches!(replay, Err(SessionError::ReusedOrRevoked)));

    // The replay cascaded: even the legitimately rotated descendant is dead.
    let descendant = sessions.rotate(&rotated.refresh_token, meta()).await;
    assert!(matches!(descendant, Err(SessionError::ReusedOrRevoked)));
}

#[tokio::test]
async fn reuse_revokes_every_other_session_of_the_user() {
    let (sessions, _) = service();
    let user = user();

    let a = sessions.issue(user, meta()).await.unwrap();
    let b = sessions.issue(user, meta()).await.unwrap();
    let c = sessions.issue(user, meta()).await.unwrap();

    sessions.rotate(&a.refresh_token, meta()).await.unwrap();
    let replay = sessions.rotate(&a.refresh_token, meta()).await;
    assert!(matches!(replay, Err(SessionError::ReusedOrRevoked)));

    for token in [&b.refresh_token, &c.refresh_token] {
        let result = sessions.rotate(token, meta()).await;
        assert!(matches!(result, Err(SessionError::ReusedOrRevoked)));
    }
}

#[tokio::test]
async fn sessions_of_other_users_survive_a_cascade() {
    let (sessions, _) = service();
    let victim = user();
    let bystander = user();

    let stolen = sessions.issue(victim, meta()).await.unwrap();
    let unrelated = sessions.issue(bystander, meta()).await.unwrap();

    sessions.rotate(&stolen.refresh_token, meta()).await.unwrap();
    let _ = sessions.rotate(&stolen.refresh_token, meta()).await;

    sessions
        .rotate(&unrelated.refresh_token, meta())
        .await
        .unwrap();
}

#[tokio::test]
async fn garbage_token_fails_before_touching_the_cache() {
    let (sessions, _) = service();

    let bogus = pompadour::application_port::RefreshToken("not-a-jwt".to_string());
    let result = sessions.rotate(&bogus, meta()).await;
    assert!(matches!(result, Err(SessionError::InvalidOrExpired)));
}

#[tokio::test]
async fn revoke_one_is_idempotent() {
    let (sessions, _) = service();
    let user = user();

    // Never-issued id: nothing to do, no error.
    sessions.revoke_one(SessionId::generate()).await.unwrap();

    let issued = sessions.issue(user, meta()).await.unwrap();
    sessions.revoke_one(issued.session_id).await.unwrap();
    sessions.revoke_one(issued.session_id).await.unwrap();

    let result = sessions.rotate(&issued.refresh_token, meta()).await;
    assert!(matches!(result, Err(SessionError::ReusedOrRevoked)));
}

#[tokio::test]
async fn revoke_all_kills_three_issued_sessions() {
    let (sessions, _) = service();
    let user = user();

    let a = sessions.issue(user, meta()).await.unwrap();
    let b = sessions.issue(user, meta()).await.unwrap();
    let c = sessions.issue(user, meta()).await.unwrap();

    sessions.revoke_all(user).await.unwrap();

    for token in [&a.refresh_token, &b.refresh_token, &c.refresh_token] {
        let result = sessions.rotate(token, meta()).await;
        assert!(matches!(result, Err(SessionError::ReusedOrRevoked)));
    }
}

#[tokio::test]
async fn revoke_all_on_a_user_with_no_sessions_is_a_noop() {
    let (sessions, _) = service();
    sessions.revoke_all(user()).await.unwrap();
}

#[tokio::test]
async fn revoke_by_token_tolerates_garbage() {
    let (sessions, _) = service();
    let bogus = pompadour::application_port::RefreshToken("definitely-not-a-jwt".to_string());
    sessions.revoke_by_token(&bogus).await.unwrap();
}

#[tokio::test]
async fn revoke_by_token_kills_the_session() {
    let (sessions, _) = service();
    let user = user();

    let issued = sessions.issue(user, meta()).await.unwrap();
    sessions.revoke_by_token(&issued.refresh_token).await.unwrap();

    let result = sessions.rotate(&issued.refresh_token, meta()).await;
    assert!(matches!(result, Err(SessionError::ReusedOrRevoked)));
}

// The user index is advisory, not a source of truth: revoke_one prunes it,
// while rotation leaves the superseded id behind on purpose. Stale ids are
// tolerated by every reader, so the mismatch below is expected behavior
// rather than a bug to fix with extra locking.
#[tokio::test]
async fn index_is_best_effort() {
    let (sessions, cache) = service();
    let user = user();
    let index_key = format!("user:{}:refresh-tokens", user);

    let a = sessions.issue(user, meta()).await.unwrap();
    let b = sessions.issue(user, meta()).await.unwrap();

    let ids: Vec<SessionId> = cache.get(&index_key).await.unwrap().unwrap();
    assert_eq!(ids, vec![a.session_id, b.session_id]);

    sessions.revoke_one(a.session_id).await.unwrap();
    let ids: Vec<SessionId> = cache.get(&index_key).await.unwrap().unwrap();
    assert_eq!(ids, vec![b.session_id]);

    let rotated = sessions.rotate(&b.refresh_token, meta()).await.unwrap();
    let ids: Vec<SessionId> = cache.get(&index_key).await.unwrap().unwrap();
    assert!(ids.contains(&b.session_id), "stale id lingers after rotation");
    assert!(ids.contains(&rotated.session_id));
}

#[tokio::test]
async fn session_records_carry_provenance_for_audit() {
    let (sessions, cache) = service();
    let user = user();

    let issued = sessions
        .issue(
            user,
            SessionMeta {
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: Some("pompadour-test/1.0".to_string()),
            },
        )
        .await
        .unwrap();

    let record: pompadour::domain_model::SessionRecord = cache
        .get(&format!("refresh-token:{}", issued.session_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.user_id, user);
    assert!(record.is_active());
    assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(record.user_agent.as_deref(), Some("pompadour-test/1.0"));
}
