//! Example demonstrating MySQL access
//!
//! Needs a reachable MySQL server; set MYSQL_HOST, MYSQL_USER,
//! MYSQL_PASSWORD and MYSQL_DB to point at it.
//!
//! Run with: cargo run --example database

use service_utils::database::{Database, MySqlConfig, MySqlDatabase, SqlValue};
use service_utils::logger::{self, info, LoggerConfig};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init(&LoggerConfig::default())?;

    let config = MySqlConfig {
        user: env_or("MYSQL_USER", "root"),
        password: env_or("MYSQL_PASSWORD", ""),
        host: env_or("MYSQL_HOST", "127.0.0.1"),
        port: 3306,
        db_name: env_or("MYSQL_DB", "test"),
        pool_name: "example".to_string(),
        pool_size: 5,
        max_idle_conns: 1,
        conn_max_lifetime_ms: 300_000,
        read_timeout_ms: 3_000,
        write_timeout_ms: 3_000,
        dial_timeout_ms: 2_000,
    };

    let mut db = MySqlDatabase::connect_with(config).await?;
    db.ping().await?;

    db.execute(
        "CREATE TABLE IF NOT EXISTS account (id BIGINT AUTO_INCREMENT PRIMARY KEY, username VARCHAR(64) NOT NULL, status TINYINT NOT NULL)",
        &[],
    )
    .await?;
    let inserted = db
        .execute(
            "INSERT INTO account (username, status) VALUES (?, ?)",
            &["AJPham".into(), SqlValue::Int(1)],
        )
        .await?;
    info!(inserted, "Inserted accounts");

    for row in db.query("SELECT id, username, status FROM account WHERE status = ?", &[1i64.into()]).await? {
        println!("{:?}", row.columns());
    }

    db.disconnect().await?;
    Ok(())
}
