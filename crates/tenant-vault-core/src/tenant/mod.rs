//! Tenant cache and lifecycle management.
//!
//! Two levels of locking:
//! - the cache's reader/writer lock guards which tenants are loaded
//! - each [`TenantHandle`] has its own lock for open/sync/close on that tenant
//!
//! Syncing tenant A therefore never blocks a lookup or sync of tenant B.
//! Loading a new tenant holds the cache write lock for the whole download,
//! which guarantees a single load per tenant at the cost of stalling other
//! lookups meanwhile.

pub mod autosync;
pub mod cache;
pub mod handle;
pub mod manager;
pub mod schema;

pub use autosync::AutoSyncWorker;
pub use cache::TenantCache;
pub use handle::TenantHandle;
pub use manager::{SyncSummary, TenantManager};
pub use schema::{NoSchema, SchemaInitializer, SqlSchema};
