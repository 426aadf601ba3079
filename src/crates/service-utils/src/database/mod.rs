//! Pooled database access behind a small capability trait.
//!
//! [`Database`] exposes only what callers need: connect, disconnect, ping,
//! execute and query. [`MySqlDatabase`] implements it over an sqlx MySQL pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_utils::database::{Database, MySqlConfig, MySqlDatabase, SqlValue};
//!
//! let mut db = MySqlDatabase::connect_with(config).await?;
//! let inserted = db
//!     .execute("INSERT INTO account (username) VALUES (?)", &["AJPham".into()])
//!     .await?;
//! let rows = db.query("SELECT * FROM account WHERE status = ?", &[1i64.into()]).await?;
//! db.disconnect().await?;
//! ```

mod mysql;
mod value;

pub use mysql::{MySqlConfig, MySqlDatabase, PoolStatistics};
pub use value::{Row, SqlValue};

use crate::error::Result;
use async_trait::async_trait;

/// Operations a data source must support.
#[async_trait]
pub trait Database: Send + Sync {
    /// Open the connection pool.
    async fn connect(&mut self) -> Result<()>;

    /// Close the pool, waiting for in-flight queries to finish.
    async fn disconnect(&mut self) -> Result<()>;

    /// Whether the pool is open.
    fn is_connected(&self) -> bool;

    /// Round-trip a trivial query.
    async fn ping(&self) -> Result<()>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Run a query and return every row.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;
}
