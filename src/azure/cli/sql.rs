use std::fmt;
use std::str::FromStr;

use super::AzureCli;
use crate::azure::runner::CommandRunner;
use crate::error::{AzError, Result};

pub struct SqlCli<'a, R> {
    pub(super) az: &'a AzureCli<R>,
}

/// Client tool a connection string is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlClient {
    Sqlcmd,
    Jdbc,
    Odbc,
}

impl SqlClient {
    pub const ALLOWED: &'static [&'static str] = &["sqlcmd", "jdbc", "odbc"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlClient::Sqlcmd => "sqlcmd",
            SqlClient::Jdbc => "jdbc",
            SqlClient::Odbc => "odbc",
        }
    }
}

impl FromStr for SqlClient {
    type Err = AzError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sqlcmd" => Ok(SqlClient::Sqlcmd),
            "jdbc" => Ok(SqlClient::Jdbc),
            "odbc" => Ok(SqlClient::Odbc),
            other => Err(AzError::validation("client", other, Self::ALLOWED)),
        }
    }
}

impl fmt::Display for SqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<R: CommandRunner> SqlCli<'_, R> {
    /// Connection string for a SQL database, formatted for `client`.
    ///
    /// az fills in server and database but leaves `<username>`/`<password>`
    /// placeholders for credentials.
    pub fn connection_string(&self, database: &str, client: &str, server: &str) -> Result<String> {
        let client: SqlClient = client.parse()?;
        let cmd = self.az.command().args([
            "sql",
            "db",
            "show-connection-string",
            "--client",
            client.as_str(),
            "--name",
            database,
            "--server",
            server,
        ]);
        self.az.run_text(&cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::cli::testing::FakeRunner;

    #[test]
    fn test_connection_string_rejects_unknown_client_without_spawning() {
        let az = AzureCli::with_runner(FakeRunner::new());
        for bad in ["ado.net", "php", "ODBC", ""] {
            let err = az.sql().connection_string("db", bad, "srv").unwrap_err();
            assert!(matches!(err, AzError::Validation { .. }), "{bad}");
        }
        assert_eq!(az.runner().call_count(), 0);
    }

    #[test]
    fn test_connection_string_passes_through_text() {
        let raw = "\"jdbc:sqlserver://srv.database.windows.net:1433;database=db;user=<username>@srv\"";
        let az = AzureCli::with_runner(FakeRunner::new().respond(&format!("{raw}\n"), 0));
        let conn = az.sql().connection_string("db", "jdbc", "srv").unwrap();
        assert_eq!(conn, raw);
        assert_eq!(
            az.runner().last_args(),
            vec![
                "sql",
                "db",
                "show-connection-string",
                "--client",
                "jdbc",
                "--name",
                "db",
                "--server",
                "srv"
            ]
        );
    }

    #[test]
    fn test_connection_string_process_error() {
        let az = AzureCli::with_runner(FakeRunner::new().respond("", 1));
        let err = az.sql().connection_string("db", "odbc", "srv").unwrap_err();
        assert!(matches!(err, AzError::Process { .. }));
    }

    #[test]
    fn test_client_display_roundtrip() {
        for name in SqlClient::ALLOWED {
            assert_eq!(name.parse::<SqlClient>().unwrap().to_string(), *name);
        }
    }
}
