//! # Tenant Vault Core
//!
//! Multi-tenant encrypted database cache: one SQLite file per tenant, kept
//! encrypted in remote object storage and decrypted into a local cache
//! directory while in use.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation and AES-256-GCM blob format
//! - **storage**: object store trait, backends, and the per-tenant gateway
//! - **tenant**: handle cache, lifecycle manager, and auto-sync worker
//! - **config**: validated settings
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tenant_vault_core::storage::MemoryObjectStore;
//! use tenant_vault_core::tenant::NoSchema;
//! use tenant_vault_core::{TenantManager, VaultConfig};
//!
//! let config = VaultConfig::new("/tmp/tenant-cache", "tenant-dbs");
//! let manager = TenantManager::new(
//!     &config,
//!     Arc::new(MemoryObjectStore::new()),
//!     Arc::new(NoSchema),
//! )?;
//! let handle = manager.get_or_create("acme", "password")?;
//! handle.with_connection(|conn| Ok(conn.execute_batch("CREATE TABLE t (x)")?))?;
//! manager.close("acme")?;
//! # Ok::<(), tenant_vault_core::VaultError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod storage;
pub mod tenant;

pub use config::VaultConfig;
pub use error::{Result, TenantFailure, VaultError};
pub use storage::{ObjectStore, StorageGateway};
pub use tenant::{AutoSyncWorker, TenantHandle, TenantManager};

/// Re-exported so callers can use the connection type without a direct dependency.
pub use rusqlite;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
