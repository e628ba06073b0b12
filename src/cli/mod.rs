pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing subscriber for the CLI.
/// Uses RUST_LOG env var for filtering (defaults to info). Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing() {
    subscriber().init();
}

fn subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_writer(std::io::stderr))
        .with(filter)
}

#[derive(Parser)]
#[command(name = "azcli-wrap")]
#[command(about = "Manage Azure storage accounts and SQL connections through the az CLI")]
#[command(version)]
pub struct Cli {
    /// az binary to run (overrides az_path in the config file)
    #[arg(long, global = true, env = "AZ_PATH")]
    pub az_path: Option<String>,

    /// Timeout for each az invocation, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a .azcli-wrap.toml config in the current directory
    Init(InitArgs),
    /// Check that az is installed and show the active subscription
    Check,
    /// Log in with a service principal
    Login(LoginArgs),
    /// Storage account operations
    Storage(StorageArgs),
    /// SQL database operations
    Sql(SqlArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Default resource group
    #[arg(long)]
    pub resource_group: Option<String>,

    /// Default location for new resources
    #[arg(long)]
    pub location: Option<String>,

    /// Default SQL server name
    #[arg(long)]
    pub sql_server: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Service principal application (client) ID
    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub app_id: String,

    /// Azure AD tenant ID
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: String,

    /// Service principal secret
    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommands,
}

#[derive(Subcommand)]
pub enum StorageCommands {
    /// Create a storage account
    Create(StorageCreateArgs),
    /// Show the primary endpoint URL for one storage service
    Url(StorageUrlArgs),
    /// Show the account connection string
    ConnectionString(StorageAccountArgs),
    /// List the account access keys
    Keys(StorageKeysArgs),
}

#[derive(clap::Args)]
pub struct StorageAccountArgs {
    /// Storage account name
    pub name: String,

    /// Resource group (defaults to resource_group in config)
    #[arg(long, short = 'g')]
    pub resource_group: Option<String>,
}

#[derive(clap::Args)]
pub struct StorageCreateArgs {
    #[command(flatten)]
    pub account: StorageAccountArgs,

    /// Location (defaults to location in config)
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Account kind
    #[arg(long, default_value = "StorageV2")]
    pub kind: String,
}

#[derive(clap::Args)]
pub struct StorageUrlArgs {
    #[command(flatten)]
    pub account: StorageAccountArgs,

    /// Storage service: blob, file, queue or table
    #[arg(long = "type", default_value = "blob")]
    pub storage_type: String,
}

#[derive(clap::Args)]
pub struct StorageKeysArgs {
    #[command(flatten)]
    pub account: StorageAccountArgs,

    /// Print only the key values, one per line
    #[arg(long)]
    pub values_only: bool,
}

#[derive(clap::Args)]
pub struct SqlArgs {
    #[command(subcommand)]
    pub command: SqlCommands,
}

#[derive(Subcommand)]
pub enum SqlCommands {
    /// Show a database connection string for a client tool
    ConnectionString(SqlConnectionStringArgs),
    /// Open a connection to the database and run a test query
    Connect(SqlConnectArgs),
}

#[derive(clap::Args)]
pub struct SqlDatabaseArgs {
    /// Database name
    pub database: String,

    /// SQL server name (defaults to sql_server in config)
    #[arg(long, short = 's')]
    pub server: Option<String>,
}

#[derive(clap::Args)]
pub struct SqlConnectionStringArgs {
    #[command(flatten)]
    pub db: SqlDatabaseArgs,

    /// Client tool: sqlcmd, jdbc or odbc
    #[arg(long, default_value = "odbc")]
    pub client: String,
}

#[derive(clap::Args)]
pub struct SqlConnectArgs {
    #[command(flatten)]
    pub db: SqlDatabaseArgs,

    /// SQL login (otherwise taken from the connection string)
    #[arg(long, env = "AZ_SQL_USER")]
    pub user: Option<String>,

    /// SQL password
    #[arg(long, env = "AZ_SQL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}
