//! Turns the ODBC connection string az prints for a SQL database into an
//! open database connection.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::cli::{AzureCli, SqlClient};
use super::connection_string::ConnectionProperties;
use super::runner::CommandRunner;
use crate::error::{AzError, Result};

pub const ODBC_DRIVER: &str = "ODBC Driver 18 for SQL Server";
pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// SQL authentication credentials
#[derive(Clone, PartialEq, Eq)]
pub struct SqlCredentials {
    pub user: String,
    pub password: String,
}

impl SqlCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SqlCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Everything needed to open a connection to one database
#[derive(Clone, PartialEq, Eq)]
pub struct SqlConnectionParams {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    pub connect_timeout: Duration,
}

impl SqlConnectionParams {
    /// Ask az for the ODBC connection string of `database` on `server` and
    /// build parameters from it. Blocks until az exits.
    pub fn fetch<R: CommandRunner>(
        az: &AzureCli<R>,
        database: &str,
        server: &str,
        credentials: Option<&SqlCredentials>,
    ) -> Result<Self> {
        let raw = az
            .sql()
            .connection_string(database, SqlClient::Odbc.as_str(), server)?;
        let props = ConnectionProperties::parse(&raw)?;
        Self::from_properties(&props, credentials)
    }

    /// Build parameters from a parsed connection string.
    ///
    /// `Server` and `Database` are required. Explicit `credentials` take
    /// precedence; otherwise `Uid`/`Pwd` are forwarded from the string, which
    /// fails if az left its `<username>`/`<password>` placeholders in place.
    pub fn from_properties(
        props: &ConnectionProperties,
        credentials: Option<&SqlCredentials>,
    ) -> Result<Self> {
        let (host, port) = split_server(props.require("Server")?)?;
        let database = props.require("Database")?.to_string();

        let (user, password) = match credentials {
            Some(c) => (c.user.clone(), c.password.clone()),
            None => (forwarded(props, "Uid")?, forwarded(props, "Pwd")?),
        };

        Ok(Self {
            driver: ODBC_DRIVER.to_string(),
            host,
            port,
            database,
            user,
            password,
            encrypt: true,
            trust_server_certificate: yes_no(props.get("TrustServerCertificate")).unwrap_or(false),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Driver-specific parameter string, in ODBC syntax
    pub fn to_odbc_string(&self) -> String {
        format!(
            "Driver={{{}}};Server=tcp:{},{};Database={};Uid={};Pwd={};Encrypt={};TrustServerCertificate={};Connection Timeout={};",
            self.driver,
            self.host,
            self.port,
            self.database,
            self.user,
            self.password,
            if self.encrypt { "yes" } else { "no" },
            if self.trust_server_certificate { "yes" } else { "no" },
            self.connect_timeout.as_secs(),
        )
    }

    fn to_tiberius_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        config.encryption(if self.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::Off
        });
        if self.trust_server_certificate {
            config.trust_cert();
        }
        config
    }
}

impl fmt::Debug for SqlConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlConnectionParams")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// `tcp:host,port` -> (host, port). Prefix and port are both optional.
fn split_server(server: &str) -> Result<(String, u16)> {
    let server = server.strip_prefix("tcp:").unwrap_or(server);
    let (host, port) = match server.rsplit_once(',') {
        Some((host, port)) => {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| AzError::Parse(format!("invalid port '{}' in Server", port)))?;
            (host, port)
        }
        None => (server, DEFAULT_PORT),
    };
    if host.is_empty() {
        return Err(AzError::Parse("Server has an empty host".to_string()));
    }
    Ok((host.to_string(), port))
}

fn forwarded(props: &ConnectionProperties, key: &str) -> Result<String> {
    let value = props.require(key)?;
    if value.starts_with('<') && value.contains('>') {
        return Err(AzError::Parse(format!(
            "'{}' is still the az placeholder '{}'; supply SQL credentials",
            key, value
        )));
    }
    Ok(value.to_string())
}

fn yes_no(value: Option<&str>) -> Option<bool> {
    match value?.to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

/// Opens database connections. The real implementation talks TDS; tests
/// substitute fakes.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    type Connection: Send;

    async fn connect(&self, params: &SqlConnectionParams) -> Result<Self::Connection>;
}

/// Live connection to Azure SQL. Owned by the caller, who must
/// [`close`](SqlConnection::close) it.
pub struct SqlConnection {
    client: Client<Compat<TcpStream>>,
}

impl SqlConnection {
    /// Round-trip a trivial query
    pub async fn ping(&mut self) -> Result<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| AzError::Connection(e.to_string()))?
            .into_row()
            .await
            .map_err(|e| AzError::Connection(e.to_string()))?;
        Ok(())
    }

    pub fn client_mut(&mut self) -> &mut Client<Compat<TcpStream>> {
        &mut self.client
    }

    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| AzError::Connection(e.to_string()))
    }
}

/// [`DatabaseConnector`] backed by tiberius over tokio TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct TiberiusConnector;

impl TiberiusConnector {
    async fn open(params: &SqlConnectionParams) -> Result<SqlConnection> {
        let mut config = params.to_tiberius_config();
        let tcp = tcp_connect(&config.get_addr()).await?;

        let client = match Client::connect(config.clone(), tcp.compat_write()).await {
            Ok(client) => client,
            // Azure gateway may redirect to the node hosting the database
            Err(tiberius::error::Error::Routing { host, port }) => {
                debug!(%host, port, "redirected by gateway");
                config.host(&host);
                config.port(port);
                let tcp = tcp_connect(&config.get_addr()).await?;
                Client::connect(config, tcp.compat_write())
                    .await
                    .map_err(|e| AzError::Connection(e.to_string()))?
            }
            Err(e) => return Err(AzError::Connection(e.to_string())),
        };

        Ok(SqlConnection { client })
    }
}

async fn tcp_connect(addr: &str) -> Result<TcpStream> {
    let tcp = TcpStream::connect(addr)
        .await
        .map_err(|e| AzError::Connection(format!("connect to {} failed: {}", addr, e)))?;
    tcp.set_nodelay(true)
        .map_err(|e| AzError::Connection(e.to_string()))?;
    Ok(tcp)
}

#[async_trait]
impl DatabaseConnector for TiberiusConnector {
    type Connection = SqlConnection;

    async fn connect(&self, params: &SqlConnectionParams) -> Result<SqlConnection> {
        tokio::time::timeout(params.connect_timeout, Self::open(params))
            .await
            .map_err(|_| {
                AzError::Connection(format!(
                    "timed out after {:?} connecting to {}",
                    params.connect_timeout, params.host
                ))
            })?
    }
}

/// Fetches the ODBC connection string for a database through az, parses it
/// and opens a connection with the configured connector.
///
/// The two phases are separate calls. [`connection_params`](Self::connection_params)
/// runs az and blocks the calling thread, so async callers should run it
/// through `tokio::task::spawn_blocking`. [`connect`](Self::connect) only
/// opens the connection and never runs az.
pub struct SqlConnectionAssembler<'a, R, C> {
    az: &'a AzureCli<R>,
    connector: C,
    credentials: Option<SqlCredentials>,
}

impl<'a, R: CommandRunner, C: DatabaseConnector> SqlConnectionAssembler<'a, R, C> {
    pub fn new(az: &'a AzureCli<R>, connector: C) -> Self {
        Self {
            az,
            connector,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: SqlCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Steps before the connection is opened: fetch, parse, build parameters.
    /// Blocks until az exits.
    pub fn connection_params(&self, database: &str, server: &str) -> Result<SqlConnectionParams> {
        SqlConnectionParams::fetch(self.az, database, server, self.credentials.as_ref())
    }

    /// Open a connection with parameters from
    /// [`connection_params`](Self::connection_params). The returned
    /// connection belongs to the caller.
    pub async fn connect(&self, params: &SqlConnectionParams) -> Result<C::Connection> {
        info!(host = %params.host, port = params.port, database = %params.database, "opening database connection");

        self.connector
            .connect(params)
            .await
            .map_err(|e| match e {
                AzError::Connection(_) => e,
                other => AzError::Connection(other.to_string()),
            })
    }
}
