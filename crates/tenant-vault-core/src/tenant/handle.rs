//! Live session for one loaded tenant.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, VaultError};

/// State guarded by the handle's own lock.
pub(crate) struct HandleState {
    /// `None` only transiently during a sync, and permanently after close.
    pub(crate) conn: Option<Connection>,
    pub(crate) last_sync: Option<DateTime<Utc>>,
}

/// One tenant's open database.
///
/// Handles are shared (`Arc`) between the cache and request handlers. All
/// open/sync/close transitions and every use of the connection go through the
/// handle's own mutex, so work on one tenant never blocks another.
///
/// The password stays in memory until the tenant is closed so the background
/// sync can re-encrypt without prompting.
pub struct TenantHandle {
    tenant_id: String,
    local_path: PathBuf,
    password: SecretString,
    last_access_ms: AtomicI64,
    state: Mutex<HandleState>,
}

impl TenantHandle {
    pub(crate) fn new(
        tenant_id: &str,
        local_path: PathBuf,
        password: &str,
        conn: Connection,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            local_path,
            password: SecretString::from(password.to_string()),
            last_access_ms: AtomicI64::new(Utc::now().timestamp_millis()),
            state: Mutex::new(HandleState {
                conn: Some(conn),
                last_sync: None,
            }),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Path of the plaintext database in the cache directory.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn last_access(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_access_ms.load(Ordering::Relaxed))
            .unwrap_or_default()
    }

    /// Time of the last successful sync, `None` if never synced this session.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock_state()?.last_sync)
    }

    /// Whether the connection is open. False once the tenant was closed.
    pub fn is_open(&self) -> Result<bool> {
        Ok(self.lock_state()?.conn.is_some())
    }

    /// Run `f` against the tenant's connection under the handle lock.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::TenantClosed` if the tenant has been closed.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let state = self.lock_state()?;
        let conn = state
            .conn
            .as_ref()
            .ok_or_else(|| VaultError::TenantClosed(self.tenant_id.clone()))?;
        f(conn)
    }

    pub(crate) fn touch(&self) {
        self.last_access_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub(crate) fn lock_state(&self) -> Result<MutexGuard<'_, HandleState>> {
        self.state.lock().map_err(|_| {
            VaultError::Internal(format!("Tenant {} lock poisoned", self.tenant_id))
        })
    }
}

impl std::fmt::Debug for TenantHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantHandle")
            .field("tenant_id", &self.tenant_id)
            .field("local_path", &self.local_path)
            .field("password", &"[REDACTED]")
            .field("last_access", &self.last_access())
            .finish_non_exhaustive()
    }
}
