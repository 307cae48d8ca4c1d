use tenant_vault_core::storage::validate_tenant_id;

use crate::app::{load_tenant_with_retry, AppContext};
use crate::cli::{DeleteArgs, QueryArgs, TenantArgs};
use crate::errors::CliError;
use crate::helpers::backup_timestamp;
use crate::output::{kv, pretty_output, sql_value, table};

enum QueryOutput {
    Rows {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Changed(usize),
}

pub fn handle_status(ctx: &AppContext, args: &TenantArgs) -> anyhow::Result<()> {
    validate_tenant_id(&args.tenant)?;
    let manager = ctx.open_manager()?;
    let remote = manager.gateway().exists(&args.tenant);
    let backups = manager.list_backups(&args.tenant)?;
    let latest = backups
        .iter()
        .filter_map(|key| backup_timestamp(key))
        .max();
    let local = manager.local_path(&args.tenant);

    println!("{}", kv("tenant", &args.tenant));
    println!("{}", kv("remote", if remote { "yes" } else { "no" }));
    println!("{}", kv("backups", backups.len()));
    if let Some(latest) = latest {
        println!("{}", kv("latest", latest.to_rfc3339()));
    }
    if local.exists() {
        println!("{}", kv("local", local.display()));
        if !ctx.quiet() {
            eprintln!("Note: a plaintext copy remains in the cache directory from an earlier run.");
        }
    }
    Ok(())
}

pub fn handle_push(ctx: &AppContext, args: &TenantArgs) -> anyhow::Result<()> {
    let manager = ctx.open_manager()?;
    load_tenant_with_retry(ctx, &manager, &args.tenant)?;
    manager.close(&args.tenant)?;
    if !ctx.quiet() {
        println!("Pushed tenant {}", args.tenant);
    }
    Ok(())
}

pub fn handle_query(ctx: &AppContext, args: &QueryArgs) -> anyhow::Result<()> {
    let manager = ctx.open_manager()?;
    let handle = load_tenant_with_retry(ctx, &manager, &args.tenant)?;

    let result = handle.with_connection(|conn| {
        let mut stmt = conn.prepare(&args.sql)?;
        let width = stmt.column_count();
        if width == 0 {
            return Ok(QueryOutput::Changed(stmt.execute([])?));
        }

        let headers = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(sql_value(row.get_ref(index)?));
            }
            rows.push(values);
        }
        Ok(QueryOutput::Rows { headers, rows })
    });

    // Close even after a failed statement so no plaintext copy lingers.
    let closed = manager.close(&args.tenant);
    let output = result?;
    closed?;

    match output {
        QueryOutput::Rows { headers, rows } => {
            if !rows.is_empty() {
                println!("{}", table(&headers, &rows, pretty_output()));
            }
        }
        QueryOutput::Changed(count) => {
            if !ctx.quiet() {
                println!("{} row(s) changed", count);
            }
        }
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    validate_tenant_id(&args.tenant)?;
    let manager = ctx.open_manager()?;
    if !manager.gateway().exists(&args.tenant) {
        return Err(CliError::not_found(
            format!("Tenant {} has no remote blob", args.tenant),
            "Hint: Run `tvault status <TENANT>` to inspect it.",
        )
        .into());
    }

    if !args.yes {
        if !ctx.interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation. Pass --yes.",
            )
            .into());
        }
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete the current blob for tenant {}? Backups are kept.",
                args.tenant
            ))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Delete cancelled"));
        }
    }

    manager.gateway().delete(&args.tenant)?;
    if !ctx.quiet() {
        println!("Deleted tenant {}", args.tenant);
    }
    Ok(())
}
