use crate::app::{missing_config_message, resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::write_config;
use crate::errors::CliError;
use tenant_vault_core::VaultConfig;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let cli = ctx.cli();
    let path = resolve_config_path(cli)?;
    if path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}. Pass --force to overwrite.",
            path.display()
        ))
        .into());
    }

    let (Some(bucket), Some(cache_dir), Some(root)) = (&cli.bucket, &cli.cache_dir, &cli.store_root)
    else {
        return Err(CliError::invalid_input(format!(
            "{}; init needs --bucket, --cache-dir and --store-root",
            missing_config_message(&path)
        ))
        .into());
    };

    let mut config = VaultConfig::new(cache_dir.clone(), bucket.clone());
    config.storage.root = Some(root.clone());
    if let Some(interval) = args.interval {
        config.sync.interval_seconds = interval;
    }
    config
        .validate()
        .map_err(|e| CliError::invalid_input(format!("Invalid config: {}", e)))?;

    write_config(&path, &config)?;
    if !ctx.quiet() {
        println!("Wrote config to {}", path.display());
    }
    Ok(())
}
