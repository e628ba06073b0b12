mod account;
mod sql;
mod storage;

pub use account::{AccountCli, AccountInfo, ServicePrincipal};
pub use sql::{SqlCli, SqlClient};
pub use storage::{StorageAccountKey, StorageAccountSpec, StorageCli, StorageType};

use serde::de::DeserializeOwned;
use tracing::warn;

use super::runner::{tool_availability, AzCommand, CommandRunner, SystemRunner, ToolAvailability};
use crate::error::{AzError, Result};

pub const AZ_PROGRAM: &str = "az";

/// Core Azure CLI wrapper. Every az invocation goes through the injected
/// [`CommandRunner`], so tests can substitute a fake.
#[derive(Clone)]
pub struct AzureCli<R = SystemRunner> {
    runner: R,
    program: String,
}

impl AzureCli<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner::new())
    }
}

impl Default for AzureCli<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> AzureCli<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            program: AZ_PROGRAM.to_string(),
        }
    }

    /// Use a specific az binary instead of resolving `az` on PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    // Service accessors
    pub fn account(&self) -> AccountCli<'_, R> {
        AccountCli { az: self }
    }
    pub fn storage(&self) -> StorageCli<'_, R> {
        StorageCli { az: self }
    }
    pub fn sql(&self) -> SqlCli<'_, R> {
        SqlCli { az: self }
    }

    /// Probe for the az binary. Logs the outcome; never fails.
    pub fn tool_availability(&self) -> ToolAvailability {
        tool_availability(&self.runner, &self.program)
    }

    /// Path of the az binary, or [`AzError::ToolMissing`]
    pub fn require_tool(&self) -> Result<String> {
        self.tool_availability().into_result()
    }

    pub(crate) fn command(&self) -> AzCommand {
        AzCommand::new(self.program.as_str())
    }

    /// Run command and return trimmed stdout, failing on a non-zero exit
    pub(crate) fn run_text(&self, cmd: &AzCommand) -> Result<String> {
        let result = self.runner.run(cmd)?;
        if !result.success() {
            warn!(command = %cmd, exit_code = result.exit_code, "az command failed");
            return Err(AzError::Process {
                command: cmd.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }
        Ok(result.output)
    }

    /// Run command and parse JSON output
    pub(crate) fn run_json<T: DeserializeOwned>(&self, cmd: &AzCommand) -> Result<T> {
        let stdout = self.run_text(cmd)?;
        serde_json::from_str(&stdout).map_err(|e| AzError::decode(cmd, e.to_string()))
    }
}
