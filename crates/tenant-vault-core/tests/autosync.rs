mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tenant_vault_core::crypto::decrypt;
use tenant_vault_core::tenant::autosync::MIN_SYNC_INTERVAL;
use tenant_vault_core::AutoSyncWorker;

use common::{manager, CountingSchema, FaultyStore};

const TICK: Duration = Duration::from_millis(50);

async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(TICK).await;
    }
    condition()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_uploads_cached_tenants() {
    let dir = tempdir().unwrap();
    let store = FaultyStore::new();
    let manager = Arc::new(manager(dir.path(), Arc::clone(&store), CountingSchema::new()));

    let handle = manager.get_or_create("t1", "pw").unwrap();
    handle
        .with_connection(|conn| {
            conn.execute("INSERT INTO clients (name) VALUES ('ticked')", [])?;
            Ok(())
        })
        .unwrap();

    let worker = AutoSyncWorker::spawn(Arc::clone(&manager), TICK);
    assert!(wait_for(|| store.has_blob("t1")).await, "blob never uploaded");
    worker.shutdown().await;

    let plaintext = decrypt(&store.blob("t1"), "pw").unwrap();
    assert!(!plaintext.is_empty());
    assert!(handle.is_open().unwrap());
    assert!(handle.last_sync().unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_survives_failing_uploads() {
    let dir = tempdir().unwrap();
    let store = FaultyStore::new();
    let manager = Arc::new(manager(dir.path(), Arc::clone(&store), CountingSchema::new()));
    manager.get_or_create("t1", "pw").unwrap();

    store.fail_puts.store(true, Ordering::SeqCst);
    let worker = AutoSyncWorker::spawn(Arc::clone(&manager), TICK);

    assert!(
        wait_for(|| store.puts.load(Ordering::SeqCst) >= 2).await,
        "worker stopped retrying"
    );
    assert!(!worker.is_finished());
    assert_eq!(manager.tenant_ids().unwrap(), vec!["t1".to_string()]);

    store.fail_puts.store(false, Ordering::SeqCst);
    assert!(wait_for(|| store.has_blob("t1")).await);
    worker.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_before_first_tick() {
    let dir = tempdir().unwrap();
    let store = FaultyStore::new();
    let manager = Arc::new(manager(dir.path(), Arc::clone(&store), CountingSchema::new()));
    manager.get_or_create("t1", "pw").unwrap();

    let worker = AutoSyncWorker::spawn(manager, Duration::from_secs(3600));
    tokio::time::timeout(Duration::from_secs(5), worker.shutdown())
        .await
        .expect("shutdown should not wait for the next tick");

    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zero_interval_falls_back_to_minimum() {
    let dir = tempdir().unwrap();
    let store = FaultyStore::new();
    let manager = Arc::new(manager(dir.path(), Arc::clone(&store), CountingSchema::new()));
    manager.get_or_create("t1", "pw").unwrap();

    let worker = AutoSyncWorker::spawn(Arc::clone(&manager), Duration::ZERO);
    tokio::time::sleep(MIN_SYNC_INTERVAL / 2).await;
    assert!(!worker.is_finished(), "worker died on a zero interval");
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);

    assert!(wait_for(|| store.has_blob("t1")).await, "blob never uploaded");
    assert!(!worker.is_finished());
    worker.shutdown().await;
}
