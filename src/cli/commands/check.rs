use anyhow::Result;

use super::helpers::{setup, GlobalArgs};

pub fn execute_check(global: &GlobalArgs) -> Result<()> {
    let (_, az) = setup(global)?;

    eprintln!("Checking Azure CLI...\n");
    let path = match az.require_tool() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("  [missing] {}", az.program());
            return Err(e.into());
        }
    };
    eprintln!("  [ok] {} ({})", az.program(), path);

    match az.account().show() {
        Ok(account) => {
            eprintln!("  [ok] Subscription: {} ({})", account.name, account.id);
            eprintln!("  [ok] Tenant:       {}", account.tenant_id);
        }
        Err(e) => {
            eprintln!("  [missing] No active subscription: {}", e);
            eprintln!("\nRun: azcli-wrap login --app-id <id> --tenant-id <tenant>");
        }
    }

    Ok(())
}
