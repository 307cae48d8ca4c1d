//! Object store backed by a local directory tree.
//!
//! Layout: `<root>/<bucket>/<key>` with metadata in a `<key>.meta.json`
//! sidecar. Suitable for single-host deployments and for tests that want a
//! store which survives process restarts.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::traits::{ObjectMetadata, ObjectStore};
use crate::error::{Result, VaultError};
use crate::fs::{remove_if_exists, write_private};

const METADATA_SUFFIX: &str = ".meta.json";

/// Directory-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && !key.ends_with(METADATA_SUFFIX)
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if bucket.is_empty() || bucket.contains(['/', '\\']) || !well_formed {
            return Err(VaultError::Storage(format!(
                "Invalid object key: {}/{}",
                bucket, key
            )));
        }
        Ok(self.root.join(bucket).join(relative))
    }

    fn metadata_path(object_path: &Path) -> PathBuf {
        let mut raw = object_path.as_os_str().to_owned();
        raw.push(METADATA_SUFFIX);
        PathBuf::from(raw)
    }

    fn collect_keys(dir: &Path, prefix: &str, keys: &mut Vec<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let key = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            if entry.file_type()?.is_dir() {
                Self::collect_keys(&entry.path(), &key, keys)?;
            } else if !is_store_artifact(&name) {
                keys.push(key);
            }
        }
        Ok(())
    }
}

/// Metadata sidecars and in-flight temp files written by `write_private`.
fn is_store_artifact(name: &str) -> bool {
    name.ends_with(METADATA_SUFFIX) || (name.starts_with('.') && name.ends_with(".tmp"))
}

fn storage_error(action: &str, bucket: &str, key: &str, err: io::Error) -> VaultError {
    if err.kind() == io::ErrorKind::NotFound {
        VaultError::Storage(format!("Object not found: {}/{}", bucket, key))
    } else {
        VaultError::Storage(format!("Failed to {} {}/{}: {}", action, bucket, key, err))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        let encoded = serde_json::to_vec_pretty(metadata)
            .map_err(|e| VaultError::Storage(format!("Metadata encode failed: {}", e)))?;
        write_private(&Self::metadata_path(&path), &encoded)
            .map_err(|e| storage_error("write metadata for", bucket, key, e))?;
        write_private(&path, body).map_err(|e| storage_error("write", bucket, key, e))
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| storage_error("read", bucket, key, e))
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let path = self.object_path(bucket, key)?;
        if !path.is_file() {
            return Err(VaultError::Storage(format!(
                "Object not found: {}/{}",
                bucket, key
            )));
        }
        match fs::read(Self::metadata_path(&path)) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                VaultError::Storage(format!("Corrupt metadata for {}/{}: {}", bucket, key, e))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(ObjectMetadata::new()),
            Err(err) => Err(storage_error("read metadata for", bucket, key, err)),
        }
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        fs::remove_file(&path).map_err(|e| storage_error("delete", bucket, key, e))?;
        remove_if_exists(&Self::metadata_path(&path))
            .map_err(|e| storage_error("delete metadata for", bucket, key, e))
    }

    fn copy_object(&self, bucket: &str, source_key: &str, destination_key: &str) -> Result<()> {
        let metadata = self.head_object(bucket, source_key)?;
        let body = self.get_object(bucket, source_key)?;
        self.put_object(bucket, destination_key, &body, &metadata)
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) {
            return Err(VaultError::Storage(format!("Invalid bucket: {}", bucket)));
        }
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        Self::collect_keys(&bucket_dir, "", &mut keys)
            .map_err(|e| storage_error("list", bucket, prefix, e))?;
        keys.retain(|key| key.starts_with(prefix));
        Ok(keys)
    }
}
