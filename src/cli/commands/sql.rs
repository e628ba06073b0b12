use anyhow::{Context, Result};

use super::helpers::{resolve, setup, GlobalArgs};
use crate::azure::{SqlConnectionAssembler, SqlConnectionParams, SqlCredentials, TiberiusConnector};
use crate::cli::{SqlConnectArgs, SqlConnectionStringArgs};

pub fn execute_sql_connection_string(global: &GlobalArgs, args: SqlConnectionStringArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let server = resolve(args.db.server, &config.sql_server, "server")?;

    let conn = az
        .sql()
        .connection_string(&args.db.database, &args.client, &server)?;
    println!("{}", conn);
    Ok(())
}

pub async fn execute_sql_connect(global: &GlobalArgs, args: SqlConnectArgs) -> Result<()> {
    let (config, az) = setup(global)?;
    let server = resolve(args.db.server, &config.sql_server, "server")?;

    let credentials = match (args.user, args.password) {
        (Some(user), Some(password)) => Some(SqlCredentials::new(user, password)),
        (None, None) => None,
        _ => anyhow::bail!("--user and --password must be given together"),
    };
    let database = args.db.database;

    // az blocks until it exits, so it runs off the async workers
    let params = {
        let az = az.clone();
        let db = database.clone();
        tokio::task::spawn_blocking(move || {
            SqlConnectionParams::fetch(&az, &db, &server, credentials.as_ref())
        })
        .await
        .context("az task failed")?
        .with_context(|| format!("Failed to get connection parameters for '{}'", database))?
    };

    eprintln!("Connecting to {} on {}...", params.database, params.host);
    let mut conn = SqlConnectionAssembler::new(&az, TiberiusConnector)
        .connect(&params)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database))?;

    let ping = conn.ping().await;
    let closed = conn.close().await;
    ping_then_close(ping, closed)?;

    eprintln!("  [ok] {} reachable", database);
    Ok(())
}

/// Close runs on both paths. A failed ping is the error reported; a close
/// failure after it is attached as context.
fn ping_then_close(ping: crate::Result<()>, closed: crate::Result<()>) -> Result<()> {
    match (ping, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close)) => Err(anyhow::Error::new(close).context("Failed to close connection")),
        (Err(ping), Ok(())) => Err(anyhow::Error::new(ping).context("Test query failed")),
        (Err(ping), Err(close)) => Err(anyhow::Error::new(ping)
            .context(format!("Test query failed (closing the connection also failed: {})", close))),
    }
}
