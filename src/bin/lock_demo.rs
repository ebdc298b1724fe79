/// Example demonstrating the distributed lock: two workers contend for the
/// same key, one runs its critical section and the other fails fast.
///
/// ```text
/// $ cargo run --bin lock_demo
/// ```
use pompadour::domain_port::Cache;
use pompadour::infra_memory::MemoryCacheStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cache = Cache::new(Arc::new(MemoryCacheStore::new()));

    let slow = cache.clone();
    let holder = tokio::spawn(async move {
        slow.with_lock("booking:chair-3", 10, || async {
            println!("worker A entered the critical section");
            tokio::time::sleep(Duration::from_millis(500)).await;
            println!("worker A leaving");
            "A finished"
        })
        .await
    });

    // Give worker A time to acquire before contending.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let contended = cache
        .with_lock("booking:chair-3", 10, || async { "B finished" })
        .await;
    println!("worker B while A holds the lock: {:?}", contended.err());

    println!("worker A result: {:?}", holder.await??);

    // The lock was released, so a later caller gets straight in.
    let free = cache
        .with_lock("booking:chair-3", 10, || async { "C finished" })
        .await?;
    println!("worker C after release: {}", free);

    Ok(())
}
