//! Object store trait definition.

use std::collections::BTreeMap;

use crate::error::Result;

/// User metadata attached to a stored object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// A bucket-style key/value blob store.
///
/// Implementations must ensure:
/// - `put_object` replaces any existing object wholesale
/// - `copy_object` copies bytes and metadata without a client round trip where possible
/// - every failure surfaces as `VaultError::Storage`, including a missing key
///
/// No call takes a deadline; any timeout is the implementation's own.
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<()>;

    /// Fetch the bytes stored under `key`.
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Fetch metadata for `key` without its body.
    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Remove `key`.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Server-side copy of `source_key` to `destination_key`.
    fn copy_object(&self, bucket: &str, source_key: &str, destination_key: &str) -> Result<()>;

    /// Keys starting with `prefix`, in whatever order the store reports them.
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
}
