//! In-process object store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::traits::{ObjectMetadata, ObjectStore};
use crate::error::{Result, VaultError};

#[derive(Clone)]
struct StoredObject {
    body: Vec<u8>,
    metadata: ObjectMetadata,
}

type Buckets = HashMap<String, BTreeMap<String, StoredObject>>;

/// Object store held entirely in memory. Buckets spring into existence on first write.
#[derive(Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<Buckets>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in `bucket`.
    pub fn object_count(&self, bucket: &str) -> usize {
        self.read()
            .map(|buckets| buckets.get(bucket).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Buckets>> {
        self.buckets
            .read()
            .map_err(|_| VaultError::Internal("Object store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Buckets>> {
        self.buckets
            .write()
            .map_err(|_| VaultError::Internal("Object store lock poisoned".to_string()))
    }
}

fn not_found(bucket: &str, key: &str) -> VaultError {
    VaultError::Storage(format!("Object not found: {}/{}", bucket, key))
}

impl ObjectStore for MemoryObjectStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<()> {
        self.write()?.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.read()?
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.body.clone())
            .ok_or_else(|| not_found(bucket, key))
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.read()?
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.metadata.clone())
            .ok_or_else(|| not_found(bucket, key))
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.write()?
            .get_mut(bucket)
            .and_then(|objects| objects.remove(key))
            .map(|_| ())
            .ok_or_else(|| not_found(bucket, key))
    }

    fn copy_object(&self, bucket: &str, source_key: &str, destination_key: &str) -> Result<()> {
        let mut buckets = self.write()?;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| not_found(bucket, source_key))?;
        let object = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| not_found(bucket, source_key))?;
        objects.insert(destination_key.to_string(), object);
        Ok(())
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .get(bucket)
            .map(|objects| {
                objects
                    .keys()
                    .filter(|key| key.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_replace() {
        let store = MemoryObjectStore::new();
        store
            .put_object("b", "k", b"one", &ObjectMetadata::new())
            .unwrap();
        store
            .put_object("b", "k", b"two", &ObjectMetadata::new())
            .unwrap();

        assert_eq!(store.get_object("b", "k").unwrap(), b"two");
        assert_eq!(store.object_count("b"), 1);
    }

    #[test]
    fn test_missing_object_is_storage_error() {
        let store = MemoryObjectStore::new();
        assert!(matches!(
            store.get_object("b", "missing"),
            Err(VaultError::Storage(_))
        ));
        assert!(store.head_object("b", "missing").is_err());
        assert!(store.delete_object("b", "missing").is_err());
    }

    #[test]
    fn test_copy_keeps_metadata() {
        let store = MemoryObjectStore::new();
        let mut metadata = ObjectMetadata::new();
        metadata.insert("encrypted".to_string(), "true".to_string());
        store.put_object("b", "src", b"bytes", &metadata).unwrap();

        store.copy_object("b", "src", "dst").unwrap();

        assert_eq!(store.get_object("b", "dst").unwrap(), b"bytes");
        assert_eq!(store.head_object("b", "dst").unwrap(), metadata);
    }

    #[test]
    fn test_list_filters_by_prefix_and_bucket() {
        let store = MemoryObjectStore::new();
        let metadata = ObjectMetadata::new();
        store.put_object("b", "a/1", b"", &metadata).unwrap();
        store.put_object("b", "a/2", b"", &metadata).unwrap();
        store.put_object("b", "c/1", b"", &metadata).unwrap();
        store.put_object("other", "a/3", b"", &metadata).unwrap();

        let mut keys = store.list_objects("b", "a/").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a/1".to_string(), "a/2".to_string()]);
        assert!(store.list_objects("none", "a/").unwrap().is_empty());
    }
}
