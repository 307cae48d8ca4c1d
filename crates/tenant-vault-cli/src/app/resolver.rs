//! Config path resolution and flag overrides.

use std::path::{Path, PathBuf};

use tenant_vault_core::VaultConfig;

use crate::cli::Cli;
use crate::config::{default_config_path, read_config};
use crate::errors::CliError;

/// `--config` / `$TVAULT_CONFIG`, else the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.config.clone() {
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }
    default_config_path()
}

pub fn missing_config_message(path: &Path) -> String {
    format!("No config found at {}", path.display())
}

/// Load the config file and apply flag overrides.
///
/// Without a config file, the flags alone must name the bucket, cache
/// directory and store root.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<VaultConfig> {
    let path = resolve_config_path(cli)?;
    let mut config = if path.exists() {
        read_config(&path)?
    } else {
        match (&cli.cache_dir, &cli.bucket) {
            (Some(cache_dir), Some(bucket)) => VaultConfig::new(cache_dir.clone(), bucket.clone()),
            _ => {
                return Err(CliError::not_found(
                    missing_config_message(&path),
                    "Hint: Run `tvault init --bucket <NAME> --cache-dir <DIR> --store-root <DIR>`.",
                )
                .into())
            }
        }
    };

    apply_overrides(cli, &mut config);
    config
        .validate()
        .map_err(|e| CliError::invalid_input(format!("Invalid config: {}", e)))?;
    Ok(config)
}

pub fn apply_overrides(cli: &Cli, config: &mut VaultConfig) {
    if let Some(bucket) = &cli.bucket {
        config.storage.bucket = bucket.clone();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
    if let Some(root) = &cli.store_root {
        config.storage.root = Some(root.clone());
    }
}

/// Object store root from the resolved config.
pub fn store_root(config: &VaultConfig) -> anyhow::Result<PathBuf> {
    config.storage.root.clone().ok_or_else(|| {
        CliError::invalid_input(
            "No object store root configured. Set storage.root or pass --store-root.",
        )
        .into()
    })
}
