use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use tenant_vault_core::VERSION;

/// Tenant Vault - encrypted per-tenant SQLite databases in object storage
#[derive(Parser)]
#[command(name = "tvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "TVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the storage bucket
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Override the local cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Override the object store root directory
    #[arg(long, global = true)]
    pub store_root: Option<PathBuf>,

    /// SQL file applied to newly created tenant databases
    #[arg(long, global = true, env = "TVAULT_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file from the global flags
    Init(InitArgs),

    /// Show whether a tenant has a remote blob and how many backups
    Status(TenantArgs),

    /// Load (or create) a tenant, then sync and evict it
    Push(TenantArgs),

    /// Run a SQL statement against a tenant database
    Query(QueryArgs),

    /// Snapshot a tenant's current blob under a timestamped key
    Backup(TenantArgs),

    /// List a tenant's backups
    Backups(TenantArgs),

    /// Delete a tenant's current blob (backups are kept)
    Delete(DeleteArgs),

    /// Keep tenants loaded and sync them periodically until interrupted
    Serve(ServeArgs),

    /// Encrypt a local file into the blob format
    Encrypt(FileArgs),

    /// Decrypt a blob into a local file
    Decrypt(FileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Sync interval in seconds
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for commands that act on one tenant
#[derive(Args)]
pub struct TenantArgs {
    /// Tenant identifier
    #[arg(value_name = "TENANT")]
    pub tenant: String,
}

/// Arguments for the `query` command
#[derive(Args)]
pub struct QueryArgs {
    /// Tenant identifier
    #[arg(value_name = "TENANT")]
    pub tenant: String,

    /// SQL statement to run
    #[arg(value_name = "SQL")]
    pub sql: String,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Tenant identifier
    #[arg(value_name = "TENANT")]
    pub tenant: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `serve` command
#[derive(Args)]
pub struct ServeArgs {
    /// Tenant to load at startup (repeatable)
    #[arg(short, long = "tenant", value_name = "TENANT", required = true)]
    pub tenants: Vec<String>,

    /// Sync interval in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,
}

/// Arguments for `encrypt` and `decrypt`
#[derive(Args)]
pub struct FileArgs {
    /// Input file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (written with owner-only permissions)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_collects_tenants() {
        let cli = Cli::try_parse_from(["tvault", "serve", "-t", "a", "--tenant", "b"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.tenants, vec!["a", "b"]),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["tvault", "-vv", "status", "t1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
