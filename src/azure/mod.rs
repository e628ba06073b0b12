pub mod cli;
pub mod connection_string;
pub mod runner;
pub mod sql;

pub use cli::{
    AccountInfo, AzureCli, ServicePrincipal, SqlClient, StorageAccountKey, StorageAccountSpec,
    StorageType,
};
pub use connection_string::ConnectionProperties;
pub use runner::{
    tool_availability, AzCommand, CommandRunner, ExecutionResult, SystemRunner, ToolAvailability,
};
pub use sql::{
    DatabaseConnector, SqlConnection, SqlConnectionAssembler, SqlConnectionParams, SqlCredentials,
    TiberiusConnector,
};
