//! Baseline schema hook for newly created tenant databases.
//!
//! The business schema belongs to the application; the vault only decides
//! *when* it runs (once, on a tenant that has no remote blob yet).

use rusqlite::Connection;

use crate::error::{Result, VaultError};

/// Applies the baseline schema to a brand-new tenant database.
pub trait SchemaInitializer: Send + Sync {
    fn apply(&self, conn: &Connection) -> Result<()>;
}

/// Leaves new databases empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSchema;

impl SchemaInitializer for NoSchema {
    fn apply(&self, _conn: &Connection) -> Result<()> {
        Ok(())
    }
}

/// Runs a SQL batch against new databases.
#[derive(Debug, Clone)]
pub struct SqlSchema {
    sql: String,
}

impl SqlSchema {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

impl SchemaInitializer for SqlSchema {
    fn apply(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(&self.sql)
            .map_err(|e| VaultError::Schema(e.to_string()))
    }
}
