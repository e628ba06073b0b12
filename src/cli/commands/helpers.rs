use anyhow::{anyhow, Result};
use serde::Serialize;
use std::time::Duration;

use crate::azure::{AzureCli, SystemRunner};
use crate::cli::config::{try_load_config, Config};

/// Flags accepted by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub az_path: Option<String>,
    pub timeout: Option<u64>,
}

/// Load config and build the az wrapper, flags taking precedence over config
pub fn setup(global: &GlobalArgs) -> Result<(Config, AzureCli)> {
    let config = try_load_config()?;
    let az = build_cli(global, &config);
    Ok((config, az))
}

pub fn build_cli(global: &GlobalArgs, config: &Config) -> AzureCli {
    let timeout = global
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    let program = global
        .az_path
        .clone()
        .unwrap_or_else(|| config.az_path.clone());

    AzureCli::with_runner(SystemRunner::with_timeout(timeout)).with_program(program)
}

/// Take a value from the flag, falling back to the config file
pub fn resolve(arg: Option<String>, configured: &Option<String>, flag: &str) -> Result<String> {
    arg.or_else(|| configured.clone()).ok_or_else(|| {
        anyhow!(
            "No {flag} specified. Either:\n  \
            1. Pass --{flag} <value>\n  \
            2. Run `azcli-wrap init --{flag} <value>` to store a default"
        )
    })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
