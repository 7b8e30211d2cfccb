#![allow(dead_code)]

use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool};
use mysql_sync::config::{Config, EndpointConfig, MailConfig};
use std::env;

/// Get test configuration from environment variables.
///
/// Source and destination share one database under per-process table
/// names so parallel runs do not collide.
pub fn get_test_config() -> Config {
    let endpoint = |table: String| EndpointConfig {
        host: env::var("TEST_MYSQL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: env::var("TEST_MYSQL_PORT")
            .unwrap_or_else(|_| "3306".to_string())
            .parse()
            .unwrap_or(3306),
        username: env::var("TEST_MYSQL_USERNAME").unwrap_or_else(|_| "root".to_string()),
        password: env::var("TEST_MYSQL_PASSWORD").unwrap_or_else(|_| "testpass".to_string()),
        db: env::var("TEST_MYSQL_DATABASE").unwrap_or_else(|_| "testdb".to_string()),
        table,
    };

    let mut config = Config::default();
    config.source = endpoint(format!("sync_source_{}", std::process::id()));
    config.destination = endpoint(format!("sync_destination_{}", std::process::id()));
    // Nothing listens on port 1, so the report always fails to send.
    config.mail = MailConfig {
        from: "sync@example.com".to_string(),
        to: vec!["ops@example.com".to_string()],
        subject: "mysql-sync test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 1,
        timeout_secs: 2,
        ..Default::default()
    };
    config
}

pub fn admin_pool(endpoint: &EndpointConfig) -> Pool {
    let opts: Opts = OptsBuilder::default()
        .ip_or_hostname(endpoint.host.clone())
        .tcp_port(endpoint.port)
        .user(Some(endpoint.username.clone()))
        .pass(Some(endpoint.password.clone()))
        .db_name(Some(endpoint.db.clone()))
        .into();
    Pool::new(opts)
}

/// (Re)creates both tables. The destination stamps `date` on insert.
pub async fn create_tables(pool: &Pool, config: &Config) -> anyhow::Result<()> {
    let mut conn = pool.get_conn().await?;
    conn.query_drop(format!(
        "DROP TABLE IF EXISTS {}, {}",
        config.source.table, config.destination.table
    ))
    .await?;
    conn.query_drop(format!(
        "CREATE TABLE {} (tk INT PRIMARY KEY, name VARCHAR(64), department VARCHAR(64), date DATETIME NOT NULL)",
        config.source.table
    ))
    .await?;
    conn.query_drop(format!(
        "CREATE TABLE {} (tk INT, name VARCHAR(64), department VARCHAR(64), date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP)",
        config.destination.table
    ))
    .await?;
    Ok(())
}

pub async fn drop_tables(pool: &Pool, config: &Config) -> anyhow::Result<()> {
    let mut conn = pool.get_conn().await?;
    conn.query_drop(format!(
        "DROP TABLE IF EXISTS {}, {}",
        config.source.table, config.destination.table
    ))
    .await?;
    Ok(())
}

pub async fn insert_source_row(
    pool: &Pool,
    config: &Config,
    tk: i64,
    name: &str,
    date: &str,
) -> anyhow::Result<()> {
    let mut conn = pool.get_conn().await?;
    conn.exec_drop(
        format!(
            "INSERT INTO {} (tk, name, department, date) VALUES (?, ?, 'R&D', ?)",
            config.source.table
        ),
        (tk, name.to_string(), date.to_string()),
    )
    .await?;
    Ok(())
}

pub async fn insert_destination_row(
    pool: &Pool,
    config: &Config,
    tk: i64,
    name: &str,
    date: &str,
) -> anyhow::Result<()> {
    let mut conn = pool.get_conn().await?;
    conn.exec_drop(
        format!(
            "INSERT INTO {} (tk, name, department, date) VALUES (?, ?, 'R&D', ?)",
            config.destination.table
        ),
        (tk, name.to_string(), date.to_string()),
    )
    .await?;
    Ok(())
}

/// Destination keys in insertion order.
pub async fn destination_keys(pool: &Pool, config: &Config) -> anyhow::Result<Vec<i64>> {
    let mut conn = pool.get_conn().await?;
    let keys: Vec<i64> = conn
        .query(format!("SELECT tk FROM {}", config.destination.table))
        .await?;
    Ok(keys)
}
