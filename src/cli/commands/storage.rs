use anyhow::{Context, Result};

use super::helpers::{print_json, resolve, setup, GlobalArgs};
use crate::azure::StorageAccountSpec;
use crate::cli::{StorageAccountArgs, StorageCreateArgs, StorageKeysArgs, StorageUrlArgs};

pub fn execute_storage_create(global: &GlobalArgs, args: StorageCreateArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let spec = StorageAccountSpec {
        resource_group: resolve(args.account.resource_group, &config.resource_group, "resource-group")?,
        location: resolve(args.location, &config.location, "location")?,
        name: args.account.name,
        kind: args.kind,
    };

    eprintln!(
        "Creating storage account {} in {} ({})...",
        spec.name, spec.resource_group, spec.location
    );
    let account = az.storage().create_account(&spec).with_context(|| {
        format!(
            "Failed to create storage account '{}' in resource group '{}'",
            spec.name, spec.resource_group
        )
    })?;
    eprintln!("  [ok] {}", spec.name);

    print_json(&account)
}

pub fn execute_storage_url(global: &GlobalArgs, args: StorageUrlArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let rg = resolve(args.account.resource_group, &config.resource_group, "resource-group")?;

    let url = az
        .storage()
        .account_url(&args.account.name, &rg, &args.storage_type)?;
    println!("{}", url);
    Ok(())
}

pub fn execute_storage_connection_string(global: &GlobalArgs, args: StorageAccountArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let rg = resolve(args.resource_group, &config.resource_group, "resource-group")?;

    let conn = az
        .storage()
        .connection_string(&args.name, &rg)
        .with_context(|| {
            format!(
                "Failed to get connection string for storage account '{}' in resource group '{}'",
                args.name, rg
            )
        })?;
    println!("{}", conn);
    Ok(())
}

pub fn execute_storage_keys(global: &GlobalArgs, args: StorageKeysArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let rg = resolve(args.account.resource_group, &config.resource_group, "resource-group")?;
    let name = &args.account.name;

    if args.values_only {
        for key in az.storage().keys_typed(name, &rg)? {
            println!("{}", key.value);
        }
    } else {
        println!("{}", az.storage().keys(name, &rg)?);
    }
    Ok(())
}
