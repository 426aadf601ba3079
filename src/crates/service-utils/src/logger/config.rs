//! Logger configuration.

use crate::error::{Result, UtilsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Minimum level written by a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Same filter as `Error`; used by services that only log before exiting.
    Fatal,
}

impl Level {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Level::Debug => LevelFilter::DEBUG,
            Level::Info => LevelFilter::INFO,
            Level::Warn => LevelFilter::WARN,
            Level::Error | Level::Fatal => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = UtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(UtilsError::InvalidInput(format!("Unknown log level: {}", s))),
        }
    }
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Minutely => Self::MINUTELY,
            Rotation::Hourly => Self::HOURLY,
            Rotation::Daily => Self::DAILY,
            Rotation::Never => Self::NEVER,
        }
    }
}

/// File output settings.
///
/// When `rotation` is not `Never`, the date is appended to the file name
/// (`app.log.2024-01-31`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    /// Write to `path` instead of stdout.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub path: PathBuf,

    #[serde(default)]
    pub rotation: Rotation,

    /// Keep at most this many rotated files; `None` keeps all of them.
    #[serde(default)]
    pub max_files: Option<usize>,
}

/// Logger settings. The default logs INFO and above to stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub level: Level,

    #[serde(default)]
    pub file: FileLogConfig,
}

impl LoggerConfig {
    /// INFO level, written to `file_path` with daily rotation when given, otherwise stdout.
    pub fn production(file_path: Option<PathBuf>) -> Self {
        let file = match file_path {
            Some(path) => FileLogConfig {
                enabled: true,
                path,
                rotation: Rotation::Daily,
                max_files: None,
            },
            None => FileLogConfig::default(),
        };
        Self {
            level: Level::Info,
            file,
        }
    }

    /// Set the minimum level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.file.enabled {
            return Ok(());
        }
        if self.file.path.as_os_str().is_empty() {
            return Err(UtilsError::LoggerError(
                "File path must be not empty".to_string(),
            ));
        }
        if self.file.path.is_dir() {
            return Err(UtilsError::LoggerError(format!(
                "File path is invalid: {} is a directory",
                self.file.path.display()
            )));
        }
        if self.file.max_files == Some(0) {
            return Err(UtilsError::LoggerError(
                "max_files must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
