#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use rusqlite::Connection;
use tenant_vault_core::storage::{MemoryObjectStore, ObjectMetadata, ObjectStore};
use tenant_vault_core::tenant::SchemaInitializer;
use tenant_vault_core::{Result, TenantManager, VaultConfig, VaultError};

pub const BUCKET: &str = "tenant-dbs";

pub const BASELINE_SQL: &str = "CREATE TABLE clients (id INTEGER PRIMARY KEY, name TEXT NOT NULL);";

/// Memory store with switchable failures and call counters.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryObjectStore,
    pub fail_puts: AtomicBool,
    pub fail_heads: AtomicBool,
    /// Puts whose key contains one of these fragments fail.
    pub fail_put_keys: Mutex<Vec<String>>,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    /// While set, puts block until `release_puts`.
    held: Mutex<bool>,
    released: Condvar,
    pub puts_waiting: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_puts_for(&self, fragment: &str) {
        self.fail_put_keys.lock().unwrap().push(fragment.to_string());
    }

    pub fn hold_puts(&self) {
        *self.held.lock().unwrap() = true;
    }

    pub fn release_puts(&self) {
        *self.held.lock().unwrap() = false;
        self.released.notify_all();
    }

    fn wait_if_held(&self) {
        let mut held = self.held.lock().unwrap();
        if *held {
            self.puts_waiting.fetch_add(1, Ordering::SeqCst);
            while *held {
                held = self.released.wait(held).unwrap();
            }
        }
    }

    pub fn has_blob(&self, tenant_id: &str) -> bool {
        self.inner
            .head_object(BUCKET, &format!("tenants/{}/ung.db.encrypted", tenant_id))
            .is_ok()
    }

    pub fn blob(&self, tenant_id: &str) -> Vec<u8> {
        self.inner
            .get_object(BUCKET, &format!("tenants/{}/ung.db.encrypted", tenant_id))
            .unwrap()
    }
}

impl ObjectStore for FaultyStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<()> {
        self.wait_if_held();
        self.puts.fetch_add(1, Ordering::SeqCst);
        let key_blocked = self
            .fail_put_keys
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| key.contains(fragment.as_str()));
        if self.fail_puts.load(Ordering::SeqCst) || key_blocked {
            return Err(VaultError::Storage("injected upload failure".to_string()));
        }
        self.inner.put_object(bucket, key, body, metadata)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_object(bucket, key)
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        if self.fail_heads.load(Ordering::SeqCst) {
            return Err(VaultError::Storage("injected network timeout".to_string()));
        }
        self.inner.head_object(bucket, key)
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner.delete_object(bucket, key)
    }

    fn copy_object(&self, bucket: &str, source_key: &str, destination_key: &str) -> Result<()> {
        self.inner.copy_object(bucket, source_key, destination_key)
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        self.inner.list_objects(bucket, prefix)
    }
}

/// Baseline schema that counts how often it runs.
#[derive(Default)]
pub struct CountingSchema {
    pub applied: AtomicUsize,
}

impl CountingSchema {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

impl SchemaInitializer for CountingSchema {
    fn apply(&self, conn: &Connection) -> Result<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        conn.execute_batch(BASELINE_SQL)?;
        Ok(())
    }
}

/// Route core logs through the test harness; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn manager(
    cache_dir: &Path,
    store: Arc<FaultyStore>,
    schema: Arc<CountingSchema>,
) -> TenantManager {
    init_tracing();
    let config = VaultConfig::new(cache_dir, BUCKET);
    TenantManager::new(&config, store, schema).expect("manager should build")
}

pub fn has_table(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count == 1)
    .unwrap_or(false)
}

pub fn transient_files(cache_dir: &Path) -> Vec<String> {
    std::fs::read_dir(cache_dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".encrypted") || name.ends_with(".tmp"))
        .collect()
}
