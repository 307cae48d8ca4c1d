//! Tenant id -> handle map behind the cache-level reader/writer lock.
//!
//! This lock guards membership only. It is never held while waiting on a
//! handle's own lock, except by `close`, which takes it *after* the handle
//! lock; nothing takes them in the opposite order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::handle::TenantHandle;
use crate::error::{Result, VaultError};

pub(crate) type Entries = HashMap<String, Arc<TenantHandle>>;

#[derive(Default)]
pub struct TenantCache {
    entries: RwLock<Entries>,
}

impl TenantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tenant_id: &str) -> Result<Option<Arc<TenantHandle>>> {
        Ok(self.read()?.get(tenant_id).cloned())
    }

    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Entries>> {
        self.entries
            .read()
            .map_err(|_| VaultError::Internal("Tenant cache lock poisoned".to_string()))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>> {
        self.entries
            .write()
            .map_err(|_| VaultError::Internal("Tenant cache lock poisoned".to_string()))
    }
}
