use anyhow::{Context, Result};

use super::helpers::{print_json, setup, GlobalArgs};
use crate::azure::ServicePrincipal;
use crate::cli::LoginArgs;

pub fn execute_login(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let (_, az) = setup(global)?;
    let principal = ServicePrincipal::new(args.app_id, args.tenant_id, args.password);

    let account = az
        .account()
        .login(&principal)
        .with_context(|| format!("Failed to log in as service principal '{}'", principal.app_id))?;

    print_json(&account)
}
