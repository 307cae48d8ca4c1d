//! Long-running mode: keep tenants loaded and let the auto-sync worker push
//! them until interrupted, then close everything.

use std::sync::Arc;
use std::time::Duration;

use tenant_vault_core::{AutoSyncWorker, TenantManager, VaultError};
use tracing::{info, warn};

use crate::app::{load_tenant_with_retry, AppContext};
use crate::cli::ServeArgs;
use crate::errors::CliError;

pub fn handle_serve(ctx: &AppContext, args: &ServeArgs) -> anyhow::Result<()> {
    let mut config = ctx.config()?;
    if let Some(interval) = args.interval {
        config.sync.interval_seconds = interval;
        config
            .validate()
            .map_err(|e| CliError::invalid_input(format!("Invalid interval: {}", e)))?;
    }
    let manager = Arc::new(ctx.open_manager_with(&config)?);

    for tenant_id in &args.tenants {
        if let Err(err) = load_tenant_with_retry(ctx, &manager, tenant_id) {
            shutdown(&manager, true);
            return Err(err);
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let waited = runtime.block_on(async {
        let worker = AutoSyncWorker::spawn(Arc::clone(&manager), config.sync_interval());
        info!(tenants = args.tenants.len(), "serving tenants");
        if !ctx.quiet() {
            eprintln!(
                "Serving {} tenant(s), syncing every {}s. Press Ctrl-C to stop.",
                args.tenants.len(),
                config.sync.interval_seconds
            );
        }

        let waited = wait_for_stop(args.duration).await;
        worker.shutdown().await;
        waited
    });

    let clean = shutdown(&manager, ctx.quiet());
    waited?;
    if !clean {
        return Err(anyhow::anyhow!(
            "Some tenants failed to close; their plaintext copies remain in {}",
            manager.cache_dir().display()
        ));
    }
    if !ctx.quiet() {
        println!("Closed {} tenant(s)", args.tenants.len());
    }
    Ok(())
}

async fn wait_for_stop(duration: Option<u64>) -> anyhow::Result<()> {
    match duration {
        Some(seconds) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(seconds)) => Ok(()),
                signal = tokio::signal::ctrl_c() => Ok(signal?),
            }
        }
        None => Ok(tokio::signal::ctrl_c().await?),
    }
}

/// CloseAll, reporting failures. Returns whether every tenant closed.
fn shutdown(manager: &TenantManager, quiet: bool) -> bool {
    match manager.close_all() {
        Ok(()) => true,
        Err(VaultError::CloseAll { failures }) => {
            for failure in &failures {
                warn!(tenant_id = %failure.tenant_id, error = %failure.error, "tenant not closed");
                if !quiet {
                    eprintln!("Failed to close {}: {}", failure.tenant_id, failure.error);
                }
            }
            false
        }
        Err(err) => {
            warn!(error = %err, "close-all failed");
            false
        }
    }
}
