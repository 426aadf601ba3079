//! Structured JSON logging on top of `tracing`.
//!
//! A [`Logger`] owns a [`tracing::Dispatch`] writing JSON lines either to
//! stdout or to a rolling file. It can be passed to the components that need
//! it and entered with [`Logger::in_scope`], or installed once as the
//! process-wide default with [`init`] / [`Logger::install_global`].
//!
//! The global default is write-once: it must be installed before the first
//! event you care about, and cannot be replaced afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_utils::logger::{self, info, LoggerConfig};
//!
//! logger::init(&LoggerConfig::production(Some("logs/app.log".into())))?;
//! info!(pool = "account", "Connected");
//! ```

mod config;

pub use config::{FileLogConfig, Level, LoggerConfig, Rotation};
pub use tracing::{debug, error, info, warn};

use crate::error::{Result, UtilsError};
use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Timestamp layout of every log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A configured logging pipeline.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Build a logger from `config`, writing to stdout or the configured file.
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;
        let writer = if config.file.enabled {
            BoxMakeWriter::new(rolling_file(&config.file)?)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        };
        Ok(Self::with_writer(config.level, writer))
    }

    /// Build a logger that writes JSON lines to `writer`.
    pub fn with_writer<W>(level: Level, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer);

        let subscriber = Registry::default().with(level.as_filter()).with(layer);

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// The underlying dispatcher.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the current thread's default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Install this logger as the process-wide default.
    pub fn install_global(self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch)
            .map_err(|e| UtilsError::LoggerError(format!("Global logger already set: {}", e)))
    }
}

/// Build a logger from `config` and install it globally.
pub fn init(config: &LoggerConfig) -> Result<()> {
    Logger::new(config)?.install_global()
}

/// Install the production logger: INFO level, to `file_path` if given, otherwise stdout.
pub fn init_production(file_path: Option<PathBuf>) -> Result<()> {
    init(&LoggerConfig::production(file_path))
}

/// Log `message` at ERROR with `fatal = true` and exit the process with status 1.
pub fn fatal(message: impl std::fmt::Display) -> ! {
    error!(fatal = true, "{}", message);
    std::process::exit(1)
}

fn rolling_file(file: &FileLogConfig) -> Result<RollingFileAppender> {
    let directory = file
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = file
        .path
        .file_name()
        .ok_or_else(|| UtilsError::LoggerError(format!("File path is invalid: {:?}", file.path)))?;

    let mut builder = RollingFileAppender::builder()
        .rotation(file.rotation.into())
        .filename_prefix(file_name.to_string_lossy().into_owned());
    if let Some(max_files) = file.max_files {
        builder = builder.max_log_files(max_files);
    }

    builder.build(directory).map_err(|e| {
        UtilsError::LoggerError(format!(
            "Failed to open log file {}: {}",
            file.path.display(),
            e
        ))
    })
}
