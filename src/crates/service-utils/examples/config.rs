//! Example demonstrating configuration loading
//!
//! Writes a YAML file, loads it through the `--cfg` flag, and prints it
//! with the password removed.
//!
//! Run with: cargo run --example config

use serde::{Deserialize, Serialize};
use service_utils::config;
use service_utils::logger::{self, LoggerConfig};
use service_utils::MySqlConfig;

#[derive(Debug, Serialize, Deserialize)]
struct AppConfig {
    name: String,
    port: u16,
    logger: LoggerConfig,
    mysql: MySqlConfig,
}

const SAMPLE: &str = r#"
name: account-service
port: 8080
logger:
  level: DEBUG
mysql:
  user: service
  password: s3cret
  host: 127.0.0.1
  db_name: accounts
  pool_name: account
"#;

fn main() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.yaml");
    std::fs::write(&path, SAMPLE)?;

    let args = vec![
        "config".to_string(),
        "--verbose".to_string(),
        "--cfg".to_string(),
        path.display().to_string(),
    ];
    let app: AppConfig = config::load_by_flag_from("cfg", args)?;

    logger::init(&app.logger)?;
    config::print(&app, &["password"])?;

    let redacted = config::redact(&app, &["password"])?;
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
