//! MySQL pool management.

use super::{Database, Row, SqlValue};
use crate::error::{Result, UtilsError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow,
};
use sqlx::query::Query;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::time::Duration;
use tracing::{debug, info};

fn default_port() -> u16 {
    3306
}

fn default_pool_size() -> u32 {
    10
}

/// MySQL connection settings, with timeouts in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySqlConfig {
    pub user: String,

    #[serde(default)]
    pub password: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub db_name: String,

    /// Name used in log lines for this pool.
    #[serde(default)]
    pub pool_name: String,

    /// Maximum number of open connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connections kept open while idle.
    #[serde(default)]
    pub max_idle_conns: u32,

    /// Maximum lifetime of a connection; zero or less reuses connections forever.
    #[serde(default)]
    pub conn_max_lifetime_ms: i64,

    #[serde(default)]
    pub read_timeout_ms: u64,

    #[serde(default)]
    pub write_timeout_ms: u64,

    /// Time allowed to obtain a connection; zero keeps the pool default.
    #[serde(default)]
    pub dial_timeout_ms: u64,
}

impl MySqlConfig {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("host", &self.host),
            ("user", &self.user),
            ("db_name", &self.db_name),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(UtilsError::ConfigError(format!(
                "MySQL {} must be not empty",
                name
            )));
        }
        if self.pool_size == 0 {
            return Err(UtilsError::ConfigError(
                "MySQL pool_size must be greater than 0".to_string(),
            ));
        }
        if self.max_idle_conns > self.pool_size {
            return Err(UtilsError::ConfigError(format!(
                "MySQL max_idle_conns ({}) must not exceed pool_size ({})",
                self.max_idle_conns, self.pool_size
            )));
        }
        Ok(())
    }

    /// Connection string with the password masked, safe to log.
    pub fn data_source_name(&self) -> String {
        format!(
            "{}:***@tcp({}:{})/{}?timeout={}ms&readTimeout={}ms&writeTimeout={}ms",
            self.user,
            self.host,
            self.port,
            self.db_name,
            self.dial_timeout_ms,
            self.read_timeout_ms,
            self.write_timeout_ms
        )
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.db_name)
    }

    fn pool_options(&self) -> MySqlPoolOptions {
        let max_lifetime = (self.conn_max_lifetime_ms > 0)
            .then(|| Duration::from_millis(self.conn_max_lifetime_ms.unsigned_abs()));

        let mut options = MySqlPoolOptions::new()
            .max_connections(self.pool_size)
            .min_connections(self.max_idle_conns)
            .max_lifetime(max_lifetime);
        if self.dial_timeout_ms > 0 {
            options = options.acquire_timeout(Duration::from_millis(self.dial_timeout_ms));
        }
        options
    }
}

/// Snapshot of the pool's connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatistics {
    pub idle_connections: u32,
    pub active_connections: u32,
    pub max_connections: u32,
}

/// [`Database`] backed by an sqlx MySQL pool.
#[derive(Debug)]
pub struct MySqlDatabase {
    config: MySqlConfig,
    pool: Option<MySqlPool>,
}

impl MySqlDatabase {
    /// Create an unconnected database; call [`Database::connect`] before use.
    pub fn new(config: MySqlConfig) -> Self {
        Self { config, pool: None }
    }

    /// Create and connect in one step.
    pub async fn connect_with(config: MySqlConfig) -> Result<Self> {
        let mut db = Self::new(config);
        db.connect().await?;
        Ok(db)
    }

    pub fn config(&self) -> &MySqlConfig {
        &self.config
    }

    /// The open pool, for queries the trait does not cover.
    pub fn pool(&self) -> Result<&MySqlPool> {
        self.pool.as_ref().ok_or_else(|| {
            UtilsError::NotConnected(format!(
                "MySQL pool {} is not connected",
                self.config.pool_name
            ))
        })
    }

    pub fn pool_statistics(&self) -> Result<PoolStatistics> {
        let pool = self.pool()?;
        let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX);
        let size = pool.size();
        Ok(PoolStatistics {
            idle_connections: idle,
            active_connections: size.saturating_sub(idle),
            max_connections: self.config.pool_size,
        })
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!(pool_name = %self.config.pool_name, "Database already connected");
            return Ok(());
        }
        self.config.validate()?;

        let pool = self
            .config
            .pool_options()
            .connect_with(self.config.connect_options())
            .await?;
        info!(
            pool_name = %self.config.pool_name,
            dsn = %self.config.data_source_name(),
            "Connect Database success"
        );
        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!(pool_name = %self.config.pool_name, "Disconnect Database success");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| !pool.is_closed())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(self.pool()?).await?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let pool = self.pool()?;
        let result = bind_params(sqlx::query(sql), params)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let pool = self.pool()?;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::UInt(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Bytes(v) => query.bind(v.as_slice()),
        };
    }
    query
}

fn decode_row(row: &MySqlRow) -> Result<Row> {
    let mut columns = Vec::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let value = if row.try_get_raw(index)?.is_null() {
            SqlValue::Null
        } else {
            decode_value(row, index, column.type_info().name())?
        };
        columns.push((column.name().to_string(), value));
    }
    Ok(Row::new(columns))
}

fn decode_value(row: &MySqlRow, index: usize, type_name: &str) -> Result<SqlValue> {
    let value = match type_name {
        "BOOLEAN" => SqlValue::Bool(row.try_get(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => SqlValue::Int(row.try_get(index)?),
        name if name.ends_with("UNSIGNED") => SqlValue::UInt(row.try_get(index)?),
        "FLOAT" => SqlValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => SqlValue::Float(row.try_get(index)?),
        "YEAR" => SqlValue::UInt(u64::from(row.try_get_unchecked::<u16, _>(index)?)),
        "DATE" => SqlValue::Text(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        "TIME" => SqlValue::Text(row.try_get::<chrono::NaiveTime, _>(index)?.to_string()),
        "DATETIME" => SqlValue::Text(
            row.try_get::<chrono::NaiveDateTime, _>(index)?
                .format("%Y-%m-%d %H:%M:%S%.f")
                .to_string(),
        ),
        "TIMESTAMP" => SqlValue::Text(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(index)?
                .to_rfc3339(),
        ),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => SqlValue::Bytes(row.try_get_unchecked(index)?),
        // CHAR, VARCHAR, TEXT, ENUM, SET, DECIMAL and JSON arrive as text.
        _ => SqlValue::Text(row.try_get_unchecked(index)?),
    };
    Ok(value)
}
