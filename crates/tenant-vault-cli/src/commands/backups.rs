use tenant_vault_core::storage::validate_tenant_id;

use crate::app::AppContext;
use crate::cli::TenantArgs;
use crate::errors::CliError;
use crate::helpers::backup_timestamp;
use crate::output::{pretty_output, table};

pub fn handle_backup(ctx: &AppContext, args: &TenantArgs) -> anyhow::Result<()> {
    validate_tenant_id(&args.tenant)?;
    let manager = ctx.open_manager()?;
    if !manager.gateway().exists(&args.tenant) {
        return Err(CliError::not_found(
            format!("Tenant {} has no remote blob to back up", args.tenant),
            "Hint: Run `tvault push <TENANT>` first.",
        )
        .into());
    }

    let key = manager.backup(&args.tenant)?;
    if ctx.quiet() {
        return Ok(());
    }
    println!("Backed up tenant {} to {}", args.tenant, key);
    Ok(())
}

pub fn handle_backups(ctx: &AppContext, args: &TenantArgs) -> anyhow::Result<()> {
    validate_tenant_id(&args.tenant)?;
    let manager = ctx.open_manager()?;
    let mut keys = manager.list_backups(&args.tenant)?;
    if keys.is_empty() {
        if !ctx.quiet() {
            eprintln!("No backups for tenant {}", args.tenant);
        }
        return Ok(());
    }
    keys.sort();

    let headers = vec!["created".to_string(), "key".to_string()];
    let rows = keys
        .into_iter()
        .map(|key| {
            let created = backup_timestamp(&key)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());
            vec![created, key]
        })
        .collect::<Vec<_>>();
    println!("{}", table(&headers, &rows, pretty_output()));
    Ok(())
}
