use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::AzureCli;
use crate::azure::runner::CommandRunner;
use crate::error::{AzError, Result};

pub struct StorageCli<'a, R> {
    pub(super) az: &'a AzureCli<R>,
}

/// Storage service whose primary endpoint can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Blob,
    File,
    Queue,
    Table,
}

impl StorageType {
    pub const ALLOWED: &'static [&'static str] = &["blob", "file", "queue", "table"];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Blob => "blob",
            StorageType::File => "file",
            StorageType::Queue => "queue",
            StorageType::Table => "table",
        }
    }
}

impl FromStr for StorageType {
    type Err = AzError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(StorageType::Blob),
            "file" => Ok(StorageType::File),
            "queue" => Ok(StorageType::Queue),
            "table" => Ok(StorageType::Table),
            other => Err(AzError::validation("storage type", other, Self::ALLOWED)),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for `az storage account create`. Values are passed through
/// unchecked; az validates them.
#[derive(Debug, Clone)]
pub struct StorageAccountSpec {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub kind: String,
}

/// One entry of `az storage account keys list`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    pub key_name: String,
    pub value: String,
    #[serde(default)]
    pub permissions: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionStringResponse {
    connection_string: String,
}

impl<R: CommandRunner> StorageCli<'_, R> {
    /// Create storage account under a resource group. Returns the account
    /// description az prints.
    pub fn create_account(&self, spec: &StorageAccountSpec) -> Result<Map<String, Value>> {
        let cmd = self.az.command().args([
            "storage",
            "account",
            "create",
            "--kind",
            spec.kind.as_str(),
            "--name",
            spec.name.as_str(),
            "--location",
            spec.location.as_str(),
            "--resource-group",
            spec.resource_group.as_str(),
            "--output",
            "json",
        ]);
        let account = self.az.run_json(&cmd)?;
        info!(account = %spec.name, resource_group = %spec.resource_group, "created storage account");
        Ok(account)
    }

    /// Service URL of one storage type, e.g. the blob endpoint.
    ///
    /// `storage_type` must be one of blob, file, queue or table; anything else
    /// fails before az is invoked.
    pub fn account_url(&self, account: &str, rg: &str, storage_type: &str) -> Result<String> {
        let storage_type: StorageType = storage_type.parse()?;
        let query = format!("primaryEndpoints.{}", storage_type);
        let cmd = self.az.command().args([
            "storage",
            "account",
            "show",
            "--name",
            account,
            "--resource-group",
            rg,
            "--query",
            query.as_str(),
        ]);
        self.az.run_text(&cmd)
    }

    /// Connection string used as a credential for storage service clients
    pub fn connection_string(&self, account: &str, rg: &str) -> Result<String> {
        let cmd = self.az.command().args([
            "storage",
            "account",
            "show-connection-string",
            "--name",
            account,
            "--resource-group",
            rg,
            "--output",
            "json",
        ]);
        let response: ConnectionStringResponse = self.az.run_json(&cmd)?;
        Ok(response.connection_string)
    }

    /// Both access keys, as the raw text az prints
    pub fn keys(&self, account: &str, rg: &str) -> Result<String> {
        let cmd = self.az.command().args([
            "storage",
            "account",
            "keys",
            "list",
            "--account-name",
            account,
            "--resource-group",
            rg,
        ]);
        self.az.run_text(&cmd)
    }

    /// Both access keys, decoded
    pub fn keys_typed(&self, account: &str, rg: &str) -> Result<Vec<StorageAccountKey>> {
        let cmd = self.az.command().args([
            "storage",
            "account",
            "keys",
            "list",
            "--account-name",
            account,
            "--resource-group",
            rg,
            "--output",
            "json",
        ]);
        self.az.run_json(&cmd)
    }
}
