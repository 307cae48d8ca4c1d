//! Tenant-level operations on the remote object store.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::keys::{backup_key, backups_prefix, blob_key, validate_tenant_id};
use super::traits::{ObjectMetadata, ObjectStore};
use crate::error::{Result, VaultError};
use crate::fs::write_private;

/// Metadata key carrying the owning tenant id.
pub const META_TENANT_ID: &str = "tenant-id";

/// Metadata key marking the object as an encrypted blob.
pub const META_ENCRYPTED: &str = "encrypted";

/// Uploads, downloads and backs up one encrypted blob per tenant.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl std::fmt::Debug for StorageGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageGateway")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl StorageGateway {
    /// Create a gateway for `bucket`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` if the bucket name is empty.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(VaultError::Validation(
                "Storage bucket name is required".to_string(),
            ));
        }
        Ok(Self { store, bucket })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload `local_file` as the tenant's current blob.
    pub fn put(&self, tenant_id: &str, local_file: &Path) -> Result<()> {
        validate_tenant_id(tenant_id)?;
        let body = std::fs::read(local_file)?;

        let mut metadata = ObjectMetadata::new();
        metadata.insert(META_TENANT_ID.to_string(), tenant_id.to_string());
        metadata.insert(META_ENCRYPTED.to_string(), "true".to_string());

        let key = blob_key(tenant_id);
        self.store
            .put_object(&self.bucket, &key, &body, &metadata)?;
        debug!(tenant_id, key = %key, bytes = body.len(), "uploaded tenant blob");
        Ok(())
    }

    /// Download the tenant's current blob to `destination`, creating parent
    /// directories as needed.
    pub fn get(&self, tenant_id: &str, destination: &Path) -> Result<()> {
        validate_tenant_id(tenant_id)?;
        let key = blob_key(tenant_id);
        let body = self.store.get_object(&self.bucket, &key)?;
        write_private(destination, &body)?;
        debug!(tenant_id, key = %key, bytes = body.len(), "downloaded tenant blob");
        Ok(())
    }

    /// Whether the tenant has a current blob.
    ///
    /// Any lookup failure, including a transient network error, reads as
    /// `false`. A caller that creates a fresh tenant on `false` can therefore
    /// shadow an existing remote blob during an outage.
    pub fn exists(&self, tenant_id: &str) -> bool {
        if validate_tenant_id(tenant_id).is_err() {
            return false;
        }
        match self.store.head_object(&self.bucket, &blob_key(tenant_id)) {
            Ok(_) => true,
            Err(err) => {
                debug!(tenant_id, error = %err, "tenant blob lookup failed; treating as absent");
                false
            }
        }
    }

    /// Remove the tenant's current blob. Backups are left in place.
    pub fn delete(&self, tenant_id: &str) -> Result<()> {
        validate_tenant_id(tenant_id)?;
        self.store.delete_object(&self.bucket, &blob_key(tenant_id))?;
        info!(tenant_id, "deleted tenant blob");
        Ok(())
    }

    /// Copy the current blob to a timestamped backup key, returning that key.
    pub fn backup(&self, tenant_id: &str) -> Result<String> {
        validate_tenant_id(tenant_id)?;
        let destination = backup_key(tenant_id, Utc::now().timestamp());
        self.store
            .copy_object(&self.bucket, &blob_key(tenant_id), &destination)?;
        info!(tenant_id, key = %destination, "backed up tenant blob");
        Ok(destination)
    }

    /// Backup keys for the tenant, in store order.
    pub fn list_backups(&self, tenant_id: &str) -> Result<Vec<String>> {
        validate_tenant_id(tenant_id)?;
        self.store
            .list_objects(&self.bucket, &backups_prefix(tenant_id))
    }
}
