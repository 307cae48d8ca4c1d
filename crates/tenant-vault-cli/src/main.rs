//! Tenant Vault CLI - operator tool for encrypted per-tenant databases
//!
//! Drives the core library against a local object store: inspect tenants,
//! push and back them up, run ad-hoc queries, or keep a set of tenants loaded
//! with periodic auto-sync.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;

use clap::Parser;
use tenant_vault_core::VERSION;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{backups, files, init, misc, serve, tenants};
use crate::errors::exit_code_for;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Status(args)) => {
            tenants::handle_status(ctx, args)?;
        }
        Some(Commands::Push(args)) => {
            tenants::handle_push(ctx, args)?;
        }
        Some(Commands::Query(args)) => {
            tenants::handle_query(ctx, args)?;
        }
        Some(Commands::Backup(args)) => {
            backups::handle_backup(ctx, args)?;
        }
        Some(Commands::Backups(args)) => {
            backups::handle_backups(ctx, args)?;
        }
        Some(Commands::Delete(args)) => {
            tenants::handle_delete(ctx, args)?;
        }
        Some(Commands::Serve(args)) => {
            serve::handle_serve(ctx, args)?;
        }
        Some(Commands::Encrypt(args)) => {
            files::handle_encrypt(ctx, args)?;
        }
        Some(Commands::Decrypt(args)) => {
            files::handle_decrypt(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args)?;
        }
        None => {
            println!("Tenant Vault v{}", VERSION);
            println!("\nQuickstart:");
            println!("  tvault init --bucket tenant-dbs --cache-dir <DIR> --store-root <DIR>");
            println!("  tvault push <TENANT>");
            println!("  tvault query <TENANT> \"SELECT name FROM sqlite_master\"");
            println!("  tvault backup <TENANT>");
            println!("\nRun `tvault --help` for full usage.");
        }
    }

    Ok(())
}
