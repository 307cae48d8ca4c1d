//! Application context for the Tenant Vault CLI.

use std::io::IsTerminal;
use std::sync::Arc;

use tenant_vault_core::storage::LocalObjectStore;
use tenant_vault_core::tenant::{NoSchema, SchemaInitializer, SqlSchema};
use tenant_vault_core::{TenantManager, VaultConfig};

use crate::cli::Cli;

use super::resolver::{resolve_config, store_root};

/// Bundles CLI args with the resolved configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self { cli }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Prompts are allowed: stdin is a TTY and `--no-input` was not given.
    pub fn interactive(&self) -> bool {
        std::io::stdin().is_terminal() && !self.cli.no_input
    }

    pub fn config(&self) -> anyhow::Result<VaultConfig> {
        resolve_config(self.cli)
    }

    /// Build a manager over the configured local object store.
    pub fn open_manager(&self) -> anyhow::Result<TenantManager> {
        let config = self.config()?;
        self.open_manager_with(&config)
    }

    pub fn open_manager_with(&self, config: &VaultConfig) -> anyhow::Result<TenantManager> {
        let store = Arc::new(LocalObjectStore::new(store_root(config)?));
        let manager = TenantManager::new(config, store, self.schema()?)?;
        Ok(manager)
    }

    fn schema(&self) -> anyhow::Result<Arc<dyn SchemaInitializer>> {
        match &self.cli.schema {
            Some(path) => {
                let sql = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read schema {}: {}", path.display(), e)
                })?;
                Ok(Arc::new(SqlSchema::new(sql)))
            }
            None => Ok(Arc::new(NoSchema)),
        }
    }
}
