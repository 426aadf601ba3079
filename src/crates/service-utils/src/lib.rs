//! Building blocks for backend services.
//!
//! The centrepiece is [`ErrorChain`], an error value that accumulates context
//! and call-site annotations as it travels up the stack while keeping its
//! root cause reachable. Around it sit the helpers most services need on day
//! one: configuration loading, string conversion, local date/time handling,
//! structured logging and a pooled MySQL client.
//!
//! # Modules
//!
//! ## Error chains (`chain`)
//!
//! ```rust
//! use service_utils::{ErrorChain, ResultExt};
//!
//! let not_found = ErrorChain::new("file not found");
//! let err = not_found
//!     .add_stack_trace("Failed to open file=test.csv")
//!     .add_context("Get users");
//!
//! assert_eq!(err.to_string(), "Get users: Failed to open file=test.csv: file not found");
//! assert!(err.is(&not_found));
//!
//! let parsed: Result<u16, _> = "80x".parse::<u16>().context("Parse port");
//! assert!(parsed.unwrap_err().to_string().starts_with("Parse port: "));
//! ```
//!
//! ## Config (`config`)
//!
//! ```rust,ignore
//! use service_utils::config;
//!
//! // Reads the path from `--cfg`, defaulting to config.yaml.
//! let app: AppConfig = config::load_by_flag("cfg")?;
//! config::print(&app, &["password"])?;
//! ```
//!
//! ## Conversion (`conv`) and date/time (`datetime`)
//!
//! ```rust
//! use service_utils::{conv, datetime};
//!
//! assert_eq!(conv::string_to_integer::<i32>("-42").unwrap(), -42);
//! assert_eq!(conv::f64_to_string(1234.5), "1.2345E+03");
//!
//! let time = datetime::string_to_local_time("2024-01-31", datetime::YYYY_MM_DD).unwrap();
//! assert_eq!(datetime::local_time_to_string(&time, datetime::DD_MM_YYYY).unwrap(), "31-01-2024");
//! ```
//!
//! ## Logger (`logger`) and database (`database`)
//!
//! ```rust,ignore
//! use service_utils::database::{Database, MySqlDatabase};
//! use service_utils::logger;
//!
//! logger::init_production(Some("logs/app.log".into()))?;
//! let db = MySqlDatabase::connect_with(app.mysql).await?;
//! db.ping().await?;
//! ```
//!
//! # Features
//!
//! - `config` - Configuration loading (enabled by default)
//! - `logger` - JSON logging (enabled by default)
//! - `database` - MySQL access through sqlx (enabled by default)

pub mod chain;
pub mod conv;
pub mod datetime;
pub mod error;

#[cfg(feature = "config")]
pub mod config;

#[cfg(feature = "logger")]
pub mod logger;

#[cfg(feature = "database")]
pub mod database;

// Re-export commonly used types
pub use chain::{ErrorChain, ResultExt, SharedError};
pub use error::{Result, UtilsError};

#[cfg(feature = "logger")]
pub use logger::{Logger, LoggerConfig};

#[cfg(feature = "database")]
pub use database::{Database, MySqlConfig, MySqlDatabase, Row, SqlValue};
