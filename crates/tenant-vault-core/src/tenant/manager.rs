//! Tenant lifecycle: load on first use, sync, close.
//!
//! ```text
//! Unloaded -> Loading -> Open <-> Sync -> Closing -> Unloaded
//! ```
//!
//! A failed load (e.g. wrong password) never leaves a cached handle behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use super::cache::TenantCache;
use super::handle::{HandleState, TenantHandle};
use super::schema::SchemaInitializer;
use crate::config::VaultConfig;
use crate::crypto::{decrypt_file, encrypt_file};
use crate::error::{Result, TenantFailure, VaultError};
use crate::fs::{remove_if_exists, write_private};
use crate::storage::{validate_tenant_id, ObjectStore, StorageGateway};

/// Outcome of one pass over all cached tenants.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    /// Tenants closed between the snapshot and their turn.
    pub skipped: usize,
    pub failed: Vec<String>,
}

/// Owns the tenant cache and drives the cipher and gateway for it.
///
/// Construct one per process (or per test) and share it behind an `Arc`.
pub struct TenantManager {
    cache_dir: PathBuf,
    gateway: StorageGateway,
    schema: Arc<dyn SchemaInitializer>,
    cache: TenantCache,
}

impl TenantManager {
    /// Build a manager from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` for bad configuration and
    /// `VaultError::Io` if the cache directory cannot be created.
    pub fn new(
        config: &VaultConfig,
        store: Arc<dyn ObjectStore>,
        schema: Arc<dyn SchemaInitializer>,
    ) -> Result<Self> {
        config.validate()?;
        let gateway = StorageGateway::new(store, config.storage.bucket.clone())?;
        std::fs::create_dir_all(&config.cache_dir)?;
        Ok(Self {
            cache_dir: config.cache_dir.clone(),
            gateway,
            schema,
            cache: TenantCache::new(),
        })
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Plaintext database path for `tenant_id`.
    pub fn local_path(&self, tenant_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.db", tenant_id))
    }

    fn encrypted_path(&self, tenant_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.db.encrypted", tenant_id))
    }

    /// Return the cached handle for `tenant_id`, loading it on first use.
    ///
    /// On a miss the remote blob is downloaded and decrypted with `password`,
    /// or, if none exists, a new database is created with the baseline
    /// schema. Concurrent first calls for one tenant perform exactly one load.
    ///
    /// A cache hit returns the existing handle without checking `password`.
    ///
    /// # Errors
    ///
    /// - `VaultError::AuthenticationFailure` for a wrong password; nothing is cached
    /// - `VaultError::Storage` / `VaultError::Io` for download or disk failures
    /// - `VaultError::Schema` if a new database cannot be initialized
    pub fn get_or_create(&self, tenant_id: &str, password: &str) -> Result<Arc<TenantHandle>> {
        validate_tenant_id(tenant_id)?;

        let cached = self.cache.get(tenant_id)?;
        if let Some(handle) = cached {
            handle.touch();
            debug!(tenant_id, "tenant cache hit");
            return Ok(handle);
        }

        let mut entries = self.cache.write()?;
        if let Some(handle) = entries.get(tenant_id) {
            handle.touch();
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(self.load(tenant_id, password)?);
        entries.insert(tenant_id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Cached handle for `tenant_id`, without loading.
    pub fn get(&self, tenant_id: &str) -> Result<Option<Arc<TenantHandle>>> {
        self.cache.get(tenant_id)
    }

    pub fn tenant_ids(&self) -> Result<Vec<String>> {
        self.cache.ids()
    }

    pub fn len(&self) -> Result<usize> {
        self.cache.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Encrypt the tenant's database and upload it as the current blob.
    ///
    /// The connection is closed for the duration so the file on disk is a
    /// consistent snapshot, and is reopened whether or not the upload worked.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::TenantNotLoaded` if the tenant is not cached.
    pub fn sync(&self, tenant_id: &str) -> Result<()> {
        let handle = self.cached(tenant_id)?;
        let mut state = handle.lock_state()?;
        self.sync_locked(&handle, &mut state)
    }

    /// Sync, then evict the tenant and delete its local plaintext file.
    ///
    /// If the sync fails the tenant stays cached and open.
    pub fn close(&self, tenant_id: &str) -> Result<()> {
        let handle = self.cached(tenant_id)?;
        let mut state = handle.lock_state()?;
        self.sync_locked(&handle, &mut state)?;

        // Held until the local file is gone so a concurrent reload cannot
        // write a fresh copy that we then delete.
        let mut entries = self.cache.write()?;
        if entries
            .get(tenant_id)
            .is_some_and(|cached| Arc::ptr_eq(cached, &handle))
        {
            entries.remove(tenant_id);
        }
        self.release(&handle, &mut state)?;
        info!(tenant_id, "closed tenant");
        Ok(())
    }

    /// Best-effort shutdown of every cached tenant.
    ///
    /// Each tenant is synced, closed and its local file removed; failures are
    /// collected rather than aborting. Every tenant in the snapshot is evicted
    /// at the end even when it failed, so a failed tenant's plaintext file
    /// stays on disk but is no longer tracked. Tenants loaded while the
    /// shutdown runs are not part of the snapshot and stay cached.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::CloseAll` listing every tenant that failed.
    pub fn close_all(&self) -> Result<()> {
        let handles: Vec<(String, Arc<TenantHandle>)> = self
            .cache
            .write()?
            .iter()
            .map(|(id, handle)| (id.clone(), Arc::clone(handle)))
            .collect();

        let mut failures = Vec::new();
        for (tenant_id, handle) in &handles {
            let outcome = handle.lock_state().and_then(|mut state| {
                self.sync_locked(handle, &mut state)?;
                self.release(handle, &mut state)
            });
            match outcome {
                Ok(()) => info!(tenant_id = %tenant_id, "closed tenant"),
                Err(error) => {
                    warn!(tenant_id = %tenant_id, error = %error, "failed to close tenant");
                    failures.push(TenantFailure {
                        tenant_id: tenant_id.clone(),
                        error,
                    });
                }
            }
        }

        // Handle locks are released by now; taking the cache lock here keeps
        // the handle-then-cache order.
        self.cache.write()?.retain(|id, cached| {
            !handles
                .iter()
                .any(|(closed_id, closed)| closed_id == id && Arc::ptr_eq(closed, cached))
        });

        if failures.is_empty() {
            Ok(())
        } else {
            Err(VaultError::CloseAll { failures })
        }
    }

    /// Sync every cached tenant in turn, logging failures.
    ///
    /// Failed tenants stay cached and open. Used by the auto-sync worker.
    pub fn sync_all(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        let tenant_ids = match self.tenant_ids() {
            Ok(ids) => ids,
            Err(err) => {
                error!(error = %err, "cannot snapshot tenant cache");
                return summary;
            }
        };

        for tenant_id in tenant_ids {
            match self.sync(&tenant_id) {
                Ok(()) => summary.synced += 1,
                Err(VaultError::TenantNotLoaded(_) | VaultError::TenantClosed(_)) => {
                    debug!(tenant_id = %tenant_id, "tenant closed before sync");
                    summary.skipped += 1;
                }
                Err(err) => {
                    error!(tenant_id = %tenant_id, error = %err, "tenant sync failed");
                    summary.failed.push(tenant_id);
                }
            }
        }
        summary
    }

    /// Snapshot the tenant's current blob under a timestamped backup key.
    pub fn backup(&self, tenant_id: &str) -> Result<String> {
        self.gateway.backup(tenant_id)
    }

    pub fn list_backups(&self, tenant_id: &str) -> Result<Vec<String>> {
        self.gateway.list_backups(tenant_id)
    }

    fn cached(&self, tenant_id: &str) -> Result<Arc<TenantHandle>> {
        self.cache
            .get(tenant_id)?
            .ok_or_else(|| VaultError::TenantNotLoaded(tenant_id.to_string()))
    }

    /// Caller holds the cache write lock.
    fn load(&self, tenant_id: &str, password: &str) -> Result<TenantHandle> {
        let local_path = self.local_path(tenant_id);

        let conn = if self.gateway.exists(tenant_id) {
            if local_path.exists() {
                warn!(tenant_id, path = %local_path.display(), "replacing stale local database with remote copy");
            }
            self.restore(tenant_id, &local_path, password)?;
            info!(tenant_id, "restored tenant from remote blob");
            open_connection(&local_path)?
        } else if local_path.exists() {
            warn!(tenant_id, path = %local_path.display(), "no remote blob; adopting existing local database");
            open_connection(&local_path)?
        } else {
            let conn = self.create(tenant_id, &local_path)?;
            info!(tenant_id, "created new tenant database");
            conn
        };

        Ok(TenantHandle::new(tenant_id, local_path, password, conn))
    }

    fn restore(&self, tenant_id: &str, local_path: &Path, password: &str) -> Result<()> {
        let encrypted = self.encrypted_path(tenant_id);
        let restored = self
            .gateway
            .get(tenant_id, &encrypted)
            .and_then(|()| decrypt_file(&encrypted, local_path, password));
        if let Err(err) = remove_if_exists(&encrypted) {
            warn!(tenant_id, error = %err, "failed to remove downloaded blob");
        }
        restored
    }

    fn create(&self, tenant_id: &str, local_path: &Path) -> Result<Connection> {
        write_private(local_path, &[])?;
        let conn = open_connection(local_path)?;
        if let Err(err) = self.schema.apply(&conn) {
            drop(conn);
            if let Err(cleanup) = remove_if_exists(local_path) {
                warn!(tenant_id, error = %cleanup, "failed to remove half-created database");
            }
            return Err(match err {
                VaultError::Schema(_) => err,
                other => VaultError::Schema(other.to_string()),
            });
        }
        Ok(conn)
    }

    fn sync_locked(&self, handle: &TenantHandle, state: &mut HandleState) -> Result<()> {
        let tenant_id = handle.tenant_id();
        let conn = state
            .conn
            .take()
            .ok_or_else(|| VaultError::TenantClosed(tenant_id.to_string()))?;
        if let Err((conn, err)) = conn.close() {
            state.conn = Some(conn);
            return Err(err.into());
        }

        let encrypted = self.encrypted_path(tenant_id);
        let result = encrypt_file(handle.local_path(), &encrypted, handle.password())
            .and_then(|()| self.gateway.put(tenant_id, &encrypted));
        if let Err(err) = remove_if_exists(&encrypted) {
            warn!(tenant_id, error = %err, "failed to remove encrypted upload file");
        }

        match open_connection(handle.local_path()) {
            Ok(conn) => state.conn = Some(conn),
            Err(reopen) => {
                error!(tenant_id, error = %reopen, "failed to reopen tenant database after sync");
                result?;
                return Err(reopen);
            }
        }

        if let Err(err) = result {
            warn!(tenant_id, error = %err, "tenant sync failed; connection reopened");
            return Err(err);
        }
        state.last_sync = Some(Utc::now());
        info!(tenant_id, "synced tenant");
        Ok(())
    }

    /// Close the connection and delete the local plaintext file.
    fn release(&self, handle: &TenantHandle, state: &mut HandleState) -> Result<()> {
        if let Some(conn) = state.conn.take() {
            conn.close().map_err(|(_, err)| VaultError::from(err))?;
        }
        remove_if_exists(handle.local_path())?;
        Ok(())
    }
}

impl std::fmt::Debug for TenantManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantManager")
            .field("cache_dir", &self.cache_dir)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    Ok(Connection::open(path)?)
}
