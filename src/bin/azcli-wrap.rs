use azcli_wrap::cli::{commands, init_tracing, Cli, Commands, SqlCommands, StorageCommands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let global = commands::GlobalArgs {
        az_path: cli.az_path,
        timeout: cli.timeout,
    };

    match cli.command {
        Commands::Init(args) => {
            let init_args = commands::InitArgs {
                resource_group: args.resource_group,
                location: args.location,
                sql_server: args.sql_server,
                force: args.force,
            };
            commands::execute_init(init_args)?
        }
        Commands::Check => commands::execute_check(&global)?,
        Commands::Login(args) => commands::execute_login(&global, args)?,
        Commands::Storage(storage_args) => match storage_args.command {
            StorageCommands::Create(args) => commands::execute_storage_create(&global, args)?,
            StorageCommands::Url(args) => commands::execute_storage_url(&global, args)?,
            StorageCommands::ConnectionString(args) => {
                commands::execute_storage_connection_string(&global, args)?
            }
            StorageCommands::Keys(args) => commands::execute_storage_keys(&global, args)?,
        },
        Commands::Sql(sql_args) => match sql_args.command {
            SqlCommands::ConnectionString(args) => {
                commands::execute_sql_connection_string(&global, args)?
            }
            SqlCommands::Connect(args) => commands::execute_sql_connect(&global, args).await?,
        },
    }

    Ok(())
}
