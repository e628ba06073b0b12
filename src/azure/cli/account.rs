use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::info;

use super::AzureCli;
use crate::azure::runner::CommandRunner;
use crate::error::{AzError, Result};

pub struct AccountCli<'a, R> {
    pub(super) az: &'a AzureCli<R>,
}

/// Non-interactive identity used for `az login --service-principal`
#[derive(Clone)]
pub struct ServicePrincipal {
    pub app_id: String,
    pub tenant_id: String,
    pub password: String,
}

impl ServicePrincipal {
    pub fn new(
        app_id: impl Into<String>,
        tenant_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            tenant_id: tenant_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("app_id", &self.app_id)
            .field("tenant_id", &self.tenant_id)
            .field("password", &"***")
            .finish()
    }
}

/// Subset of `az account show`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
    pub tenant_id: String,
    #[serde(default)]
    pub is_default: bool,
}

impl<R: CommandRunner> AccountCli<'_, R> {
    /// Log in with a service principal. Returns the first subscription entry
    /// az reports for the identity.
    pub fn login(&self, principal: &ServicePrincipal) -> Result<Value> {
        // Attached with `=` so a secret starting with '-' is not read as a flag
        let password = format!("--password={}", principal.password);
        let cmd = self.az.command().args([
            "login",
            "--service-principal",
            "-u",
            principal.app_id.as_str(),
            "--tenant",
            principal.tenant_id.as_str(),
            password.as_str(),
            "--output",
            "json",
        ]);
        let subscriptions: Vec<Value> = self.az.run_json(&cmd)?;
        let first = subscriptions
            .into_iter()
            .next()
            .ok_or_else(|| AzError::decode(&cmd, "login returned no subscriptions"))?;

        info!(app_id = %principal.app_id, tenant = %principal.tenant_id, "logged in with service principal");
        Ok(first)
    }

    /// Currently selected subscription
    pub fn show(&self) -> Result<AccountInfo> {
        let cmd = self.az.command().args(["account", "show", "--output", "json"]);
        self.az.run_json(&cmd)
    }
}
