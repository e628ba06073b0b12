//! Typed wrappers around the Azure CLI.
//!
//! Every operation builds an `az` argument list, runs it through a
//! [`CommandRunner`](azure::CommandRunner) and decodes stdout. The runner is
//! injectable so callers and tests can substitute their own.

pub mod azure;
pub mod cli;
mod error;

pub use azure::{
    AzCommand, AzureCli, CommandRunner, ConnectionProperties, ExecutionResult, SqlConnection,
    SqlConnectionAssembler, SqlConnectionParams, SqlCredentials, SystemRunner, ToolAvailability,
};
pub use error::{AzError, Result};

// Re-export tracing for use in other modules
pub use tracing;
