use pompadour::domain_port::{Cache, CacheError, SetOptions};
use pompadour::infra_memory::MemoryCacheStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

fn cache() -> Cache {
    Cache::new(Arc::new(MemoryCacheStore::new()))
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct Slot {
    chair: u32,
    taken: bool,
}

#[tokio::test]
async fn typed_values_round_trip_through_json() {
    let cache = cache();
    let slot = Slot {
        chair: 3,
        taken: true,
    };

    cache.set("slot:3", &slot, SetOptions::ttl(60)).await.unwrap();
    let loaded: Slot = cache.get("slot:3").await.unwrap().unwrap();
    assert_eq!(loaded, slot);

    cache.delete("slot:3").await.unwrap();
    assert_eq!(cache.get::<Slot>("slot:3").await.unwrap(), None);
}

#[tokio::test]
async fn conditional_set_reports_whether_the_write_happened() {
    let cache = cache();
    let options = SetOptions {
        time_to_live_seconds: Some(60),
        only_if_not_exists: true,
    };

    assert!(cache.set("k", &1u32, options.clone()).await.unwrap());
    assert!(!cache.set("k", &2u32, options).await.unwrap());
    assert_eq!(cache.get::<u32>("k").await.unwrap(), Some(1));
}

#[tokio::test]
async fn ttl_reports_remaining_lifetime_only_for_expiring_keys() {
    let cache = cache();

    cache.set("expiring", &1u32, SetOptions::ttl(60)).await.unwrap();
    cache
        .set("persistent", &1u32, SetOptions::default())
        .await
        .unwrap();

    let remaining = cache.ttl("expiring").await.unwrap().unwrap();
    assert!((1..=60).contains(&remaining));
    assert_eq!(cache.ttl("persistent").await.unwrap(), None);
    assert_eq!(cache.ttl("missing").await.unwrap(), None);
}

#[tokio::test]
async fn with_lock_is_mutually_exclusive() {
    let cache = cache();

    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();

    let holder_cache = cache.clone();
    let holder = tokio::spawn(async move {
        holder_cache
            .with_lock("booking:chair-1", 30, move || async move {
                entered_tx.send(()).unwrap();
                release_rx.await.unwrap();
                7
            })
            .await
    });

    // Contend only once the first caller is inside its critical section.
    entered_rx.await.unwrap();
    let contended = cache
        .with_lock("booking:chair-1", 30, || async { 0 })
        .await;
    assert!(matches!(contended, Err(CacheError::LockNotAcquired(_))));

    release_tx.send(()).unwrap();
    assert_eq!(holder.await.unwrap().unwrap(), 7);

    // Released on the way out, so the next caller gets straight in.
    let free = cache
        .with_lock("booking:chair-1", 30, || async { 1 })
        .await
        .unwrap();
    assert_eq!(free, 1);
}

#[tokio::test]
async fn lock_is_released_even_when_the_critical_section_fails() {
    let cache = cache();

    let outcome: Result<(), &str> = cache
        .with_lock("booking:chair-2", 30, || async { Err("schedule clash") })
        .await
        .unwrap();
    assert!(outcome.is_err());

    cache
        .with_lock("booking:chair-2", 30, || async { Ok::<(), &str>(()) })
        .await
        .unwrap()
        .unwrap();
}

// An expired holder must never delete its successor's lock: the release is
// compare-and-delete on the ownership token, not a blind DEL.
#[tokio::test]
async fn expired_holder_cannot_release_the_successors_lock() {
    let cache = cache();

    let slow_cache = cache.clone();
    let slow_holder = tokio::spawn(async move {
        slow_cache
            .with_lock("booking:chair-4", 1, || async {
                // Outlive the lock TTL on purpose.
                tokio::time::sleep(Duration::from_millis(1300)).await;
            })
            .await
    });

    // Wait for the first holder's lock to expire, then take it over.
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let successor_cache = cache.clone();
    let successor = tokio::spawn(async move {
        successor_cache
            .with_lock("booking:chair-4", 30, move || async move {
                entered_tx.send(()).unwrap();
                release_rx.await.unwrap();
            })
            .await
    });
    entered_rx.await.unwrap();

    // First holder finishes late; its release is skipped, not applied.
    slow_holder.await.unwrap().unwrap();

    // The successor's critical section is still protected.
    let contended = cache.with_lock("booking:chair-4", 30, || async {}).await;
    assert!(matches!(contended, Err(CacheError::LockNotAcquired(_))));

    release_tx.send(()).unwrap();
    successor.await.unwrap().unwrap();

    cache
        .with_lock("booking:chair-4", 30, || async {})
        .await
        .unwrap();
}
