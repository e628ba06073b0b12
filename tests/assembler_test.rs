// tests/assembler_test.rs
mod helpers;

use async_trait::async_trait;
use azcli_wrap::azure::DatabaseConnector;
use azcli_wrap::{
    AzCommand, AzError, AzureCli, CommandRunner, ExecutionResult, SqlConnectionAssembler,
    SqlConnectionParams, SqlCredentials,
};
use helpers::MockRunner;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ODBC_OUTPUT: &str = "\"Driver={ODBC Driver 13 for SQL Server};Server=tcp:sales-srv.database.windows.net,1433;Database=sales;Uid=<username>@sales-srv;Pwd=<password>;Encrypt=yes;TrustServerCertificate=no;\"\n";

/// Hands back the parameters instead of a live connection
#[derive(Default)]
struct EchoConnector {
    opened: AtomicUsize,
}

#[async_trait]
impl DatabaseConnector for EchoConnector {
    type Connection = SqlConnectionParams;

    async fn connect(&self, params: &SqlConnectionParams) -> azcli_wrap::Result<SqlConnectionParams> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(params.clone())
    }
}

struct RefusingConnector;

#[async_trait]
impl DatabaseConnector for RefusingConnector {
    type Connection = ();

    async fn connect(&self, params: &SqlConnectionParams) -> azcli_wrap::Result<()> {
        Err(AzError::Connection(format!("login failed for user '{}'", params.user)))
    }
}

/// Stands in for a slow az: blocks the calling thread before answering
#[derive(Clone)]
struct SlowRunner {
    delay: Duration,
}

impl CommandRunner for SlowRunner {
    fn run(&self, _command: &AzCommand) -> azcli_wrap::Result<ExecutionResult> {
        std::thread::sleep(self.delay);
        Ok(ExecutionResult::new(ODBC_OUTPUT, 0))
    }
}

#[tokio::test]
async fn test_connect_builds_params_from_az_output() {
    let az = AzureCli::with_runner(MockRunner::new().with_response(ODBC_OUTPUT, 0));
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default())
        .with_credentials(SqlCredentials::new("sqladmin", "pw"));

    let params = assembler.connection_params("sales", "sales-srv").unwrap();
    let opened = assembler.connect(&params).await.unwrap();

    assert_eq!(opened.host, "sales-srv.database.windows.net");
    assert_eq!(opened.port, 1433);
    assert_eq!(opened.database, "sales");
    assert_eq!(opened.user, "sqladmin");
    assert!(opened.encrypt);
    assert!(opened
        .to_odbc_string()
        .starts_with("Driver={ODBC Driver 18 for SQL Server};Server=tcp:sales-srv.database.windows.net,1433;Database=sales;"));

    let calls = az.runner().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].to_string(),
        "az sql db show-connection-string --client odbc --name sales --server sales-srv"
    );
}

#[tokio::test]
async fn test_connect_never_runs_az() {
    // No canned responses: any az call would panic the runner
    let az = AzureCli::with_runner(MockRunner::new());
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default());
    let params = SqlConnectionParams::fetch(
        &AzureCli::with_runner(MockRunner::new().with_response(ODBC_OUTPUT, 0)),
        "sales",
        "sales-srv",
        Some(&SqlCredentials::new("sqladmin", "pw")),
    )
    .unwrap();

    assembler.connect(&params).await.unwrap();
    assert_eq!(az.runner().call_count(), 0);
}

#[tokio::test]
async fn test_slow_az_fetch_does_not_stall_runtime() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(50));
            loop {
                interval.tick().await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let az = AzureCli::with_runner(SlowRunner {
        delay: Duration::from_millis(500),
    });
    let fetch_az = az.clone();
    let params = tokio::task::spawn_blocking(move || {
        SqlConnectionParams::fetch(
            &fetch_az,
            "sales",
            "sales-srv",
            Some(&SqlCredentials::new("sqladmin", "pw")),
        )
    })
    .await
    .unwrap()
    .unwrap();
    ticker.abort();

    // Single-threaded runtime: the ticker only advances if the fetch ran elsewhere
    assert!(ticks.load(Ordering::SeqCst) >= 4, "ticks = {}", ticks.load(Ordering::SeqCst));

    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default());
    let opened = assembler.connect(&params).await.unwrap();
    assert_eq!(opened.database, "sales");
}

#[test]
fn test_connection_params_forward_credentials_from_connection_string() {
    let az = AzureCli::with_runner(MockRunner::new().with_response(
        "Server=tcp:foo.database.windows.net;Database=bar;Uid=x;Pwd=y;",
        0,
    ));
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default());

    let params = assembler.connection_params("bar", "foo").unwrap();
    assert_eq!(params.user, "x");
    assert_eq!(params.password, "y");
}

#[test]
fn test_placeholder_credentials_without_override_fail_before_connecting() {
    let az = AzureCli::with_runner(MockRunner::new().with_response(ODBC_OUTPUT, 0));
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default());

    let err = assembler.connection_params("sales", "sales-srv").unwrap_err();
    assert!(matches!(err, AzError::Parse(_)), "got {err:?}");
}

#[test]
fn test_missing_server_key_is_parse_error() {
    let az = AzureCli::with_runner(MockRunner::new().with_response("Database=bar;Uid=x;Pwd=y", 0));
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default());

    let err = assembler.connection_params("bar", "foo").unwrap_err();
    match err {
        AzError::Parse(msg) => assert!(msg.contains("Server")),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connector_failure_is_connection_error() {
    let az = AzureCli::with_runner(MockRunner::new().with_response(ODBC_OUTPUT, 0));
    let assembler = SqlConnectionAssembler::new(&az, RefusingConnector)
        .with_credentials(SqlCredentials::new("sqladmin", "pw"));

    let params = assembler.connection_params("sales", "sales-srv").unwrap();
    let err = assembler.connect(&params).await.unwrap_err();
    match err {
        AzError::Connection(msg) => assert!(msg.contains("sqladmin")),
        other => panic!("expected Connection, got {other:?}"),
    }
}

#[test]
fn test_connection_params_without_connecting() {
    let az = AzureCli::with_runner(MockRunner::new().with_response(ODBC_OUTPUT, 0));
    let assembler = SqlConnectionAssembler::new(&az, EchoConnector::default())
        .with_credentials(SqlCredentials::new("sqladmin", "pw"));

    let params = assembler.connection_params("sales", "sales-srv").unwrap();
    assert_eq!(params.database, "sales");
    assert!(!params.trust_server_certificate);
    assert_eq!(az.runner().call_count(), 1);
}
