use anyhow::{bail, Result};
use std::path::Path;

use crate::cli::config::{Config, CONFIG_FILENAME};

pub struct InitArgs {
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub sql_server: Option<String>,
    pub force: bool,
}

pub fn execute_init(args: InitArgs) -> Result<()> {
    // Check if config already exists
    if Path::new(CONFIG_FILENAME).exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            CONFIG_FILENAME
        );
    }

    let config = Config {
        resource_group: args.resource_group,
        location: args.location,
        sql_server: args.sql_server,
        ..Config::default()
    };

    config.save()?;

    eprintln!("Created {}", CONFIG_FILENAME);
    eprintln!("  az_path: {}", config.az_path);
    eprintln!("  timeout_secs: {}", config.timeout_secs);
    if let Some(ref rg) = config.resource_group {
        eprintln!("  resource_group: {}", rg);
    }
    if let Some(ref location) = config.location {
        eprintln!("  location: {}", location);
    }
    if let Some(ref server) = config.sql_server {
        eprintln!("  sql_server: {}", server);
    }
    eprintln!();
    eprintln!("Next: azcli-wrap check");

    Ok(())
}
