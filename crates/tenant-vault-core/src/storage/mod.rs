//! Remote object storage for encrypted tenant blobs.
//!
//! The [`StorageGateway`] maps tenant ids to well-known object keys and moves
//! opaque bytes; it never looks inside a blob. The remote store itself sits
//! behind the [`ObjectStore`] trait so the gateway can run against a real
//! bucket, a local directory tree, or memory.

pub mod gateway;
pub mod keys;
pub mod local;
pub mod memory;
pub mod traits;

pub use gateway::StorageGateway;
pub use keys::{backup_key, backups_prefix, blob_key, validate_tenant_id};
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use traits::{ObjectMetadata, ObjectStore};
