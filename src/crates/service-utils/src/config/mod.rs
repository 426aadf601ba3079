//! Configuration loading and printing.
//!
//! This module provides:
//! - YAML/JSON config file loading (format picked from the extension)
//! - Loading the config path from a command-line flag
//! - Logging the effective configuration with secrets removed
//!
//! # Example
//!
//! ```rust,ignore
//! use service_utils::config::{load, print};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Serialize)]
//! struct AppConfig {
//!     database_url: String,
//!     password: String,
//! }
//!
//! let config: AppConfig = load("config.yaml")?;
//! print(&config, &["password"])?;
//! ```

use crate::error::{Result, UtilsError};
use clap::{Arg, Command};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config path used by [`load_by_flag`] when the flag is absent.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Load configuration from a YAML file.
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse YAML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a JSON file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse JSON config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a file, picking the format from its extension.
///
/// `yaml`, `yml` and `json` are accepted, case-insensitively.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            UtilsError::ConfigError(format!("Unable to determine file extension for {:?}", path))
        })?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml(path),
        "json" => load_json(path),
        _ => Err(UtilsError::UnsupportedFormat(format!(
            "Can not support load file {}",
            path.display()
        ))),
    }
}

/// Load configuration from the path given by `--{flag}` on the command line.
///
/// Falls back to [`DEFAULT_CONFIG_PATH`]. Other arguments are ignored.
pub fn load_by_flag<T: DeserializeOwned>(flag: &str) -> Result<T> {
    load_by_flag_from(flag, std::env::args_os())
}

/// Same as [`load_by_flag`], reading from `args` (the first item is the program name).
pub fn load_by_flag_from<T, I, A>(flag: &str, args: I) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    let path = config_path_from_args(flag, args)?;
    load(path)
}

fn config_path_from_args<I, A>(flag: &str, args: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    if flag.is_empty() {
        return Err(UtilsError::InvalidInput("Flag name must not be empty".to_string()));
    }

    // Keep only the program name and our flag so unrelated arguments never fail the parse.
    let long = format!("--{}", flag);
    let assigned = format!("{}=", long);
    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = args.next().into_iter().collect();
    while let Some(arg) = args.next() {
        let (is_flag, is_assigned) = {
            let text = arg.to_string_lossy();
            (text == long, text.starts_with(&assigned))
        };
        if is_flag {
            kept.push(arg);
            if let Some(value) = args.next() {
                kept.push(value);
            }
        } else if is_assigned {
            kept.push(arg);
        }
    }

    let matches = Command::new("config")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(flag.to_string())
                .long(flag.to_string())
                .value_name("PATH")
                .default_value(DEFAULT_CONFIG_PATH)
                .help("Path of config file"),
        )
        .try_get_matches_from(kept)
        .map_err(|e| UtilsError::ConfigError(format!("Failed to parse arguments: {}", e)))?;

    Ok(matches
        .get_one::<String>(flag)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)))
}

/// Serialize `config` and drop every key listed in `omitted_keys`, at any depth.
pub fn redact<T: Serialize>(config: &T, omitted_keys: &[&str]) -> Result<Value> {
    let mut value = serde_json::to_value(config)?;
    if !omitted_keys.is_empty() {
        omit_keys(&mut value, omitted_keys);
    }
    Ok(value)
}

/// Log the configuration at INFO level with `omitted_keys` removed.
pub fn print<T: Serialize>(config: &T, omitted_keys: &[&str]) -> Result<()> {
    let value = redact(config, omitted_keys)?;
    info!(configuration = %value, "Print out application configuration");
    Ok(())
}

/// Remove the named keys from every object in the tree.
pub fn omit_keys(value: &mut Value, keys: &[&str]) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !keys.contains(&key.as_str()));
            for child in map.values_mut() {
                omit_keys(child, keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                omit_keys(item, keys);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestConfig {
        name: String,
        port: u16,
        enabled: bool,
    }

    // ------------------------------------------------------------------------
    // YAML loading
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_yaml_valid() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "name: test_app\nport: 8080\nenabled: true\n").unwrap();

        let config: TestConfig = load_yaml(&config_path).unwrap();
        assert_eq!(config.name, "test_app");
        assert_eq!(config.port, 8080);
        assert!(config.enabled);
    }

    #[test]
    fn test_load_yaml_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");

        fs::write(&config_path, "name: test_app\nport: [invalid yaml structure\n").unwrap();

        let result: Result<TestConfig> = load_yaml(&config_path);
        assert!(matches!(result, Err(UtilsError::ConfigError(_))));
    }

    #[test]
    fn test_load_yaml_file_not_found() {
        let result: Result<TestConfig> = load_yaml("/nonexistent/path/config.yaml");
        assert!(matches!(result, Err(UtilsError::IoError(_))));
    }

    #[test]
    fn test_load_yaml_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("empty.yaml");
        fs::write(&config_path, "").unwrap();

        let result: Result<TestConfig> = load_yaml(&config_path);
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // JSON loading
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_json_valid() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        fs::write(
            &config_path,
            r#"{"name": "test_app", "port": 8080, "enabled": true}"#,
        )
        .unwrap();

        let config: TestConfig = load_json(&config_path).unwrap();
        assert_eq!(
            config,
            TestConfig {
                name: "test_app".to_string(),
                port: 8080,
                enabled: true,
            }
        );
    }

    #[test]
    fn test_load_json_trailing_comma() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("trailing.json");

        fs::write(
            &config_path,
            r#"{"name": "test", "port": 8080, "enabled": true,}"#,
        )
        .unwrap();

        let result: Result<TestConfig> = load_json(&config_path);
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // Format detection
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_by_extension() {
        let temp_dir = TempDir::new().unwrap();

        let yml = temp_dir.path().join("config.yml");
        fs::write(&yml, "name: yml_test\nport: 9001\nenabled: true\n").unwrap();
        let config: TestConfig = load(&yml).unwrap();
        assert_eq!(config.name, "yml_test");

        let json = temp_dir.path().join("config.JSON");
        fs::write(&json, r#"{"name": "json_test", "port": 9002, "enabled": false}"#).unwrap();
        let config: TestConfig = load(&json).unwrap();
        assert_eq!(config.name, "json_test");
        assert!(!config.enabled);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "name = 'test'").unwrap();

        let result: Result<TestConfig> = load(&config_path);
        match result {
            Err(UtilsError::UnsupportedFormat(msg)) => {
                assert!(msg.starts_with("Can not support load file"));
                assert!(msg.ends_with("config.toml"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_no_extension() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config");
        fs::write(&config_path, "{}").unwrap();

        let result: Result<TestConfig> = load(&config_path);
        assert!(result.unwrap_err().to_string().contains("extension"));
    }

    // ------------------------------------------------------------------------
    // Flag loading
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_path_from_flag() {
        let path = config_path_from_args("config", ["app", "--config", "/etc/app.json"]).unwrap();
        assert_eq!(path, PathBuf::from("/etc/app.json"));

        let path = config_path_from_args("config", ["app", "--config=/etc/app.yml"]).unwrap();
        assert_eq!(path, PathBuf::from("/etc/app.yml"));
    }

    #[test]
    fn test_config_path_default() {
        let path = config_path_from_args("config", ["app"]).unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_config_path_ignores_other_args() {
        let path =
            config_path_from_args("cfg", ["app", "--verbose", "--cfg", "local.yaml"]).unwrap();
        assert_eq!(path, PathBuf::from("local.yaml"));
    }

    #[test]
    fn test_config_path_empty_flag() {
        let result = config_path_from_args("", ["app"]);
        assert!(matches!(result, Err(UtilsError::InvalidInput(_))));
    }

    #[test]
    fn test_load_by_flag_from() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flagged.yaml");
        fs::write(&config_path, "name: flagged\nport: 1\nenabled: false\n").unwrap();

        let args = vec![
            OsString::from("app"),
            OsString::from("--config"),
            config_path.clone().into_os_string(),
        ];
        let config: TestConfig = load_by_flag_from("config", args).unwrap();
        assert_eq!(config.name, "flagged");
    }

    // ------------------------------------------------------------------------
    // Redaction
    // ------------------------------------------------------------------------

    #[test]
    fn test_redact_nested_keys() {
        let config = json!({
            "name": "svc",
            "password": "top",
            "database": {
                "host": "localhost",
                "password": "nested",
                "replicas": [
                    {"host": "r1", "password": "p1"},
                    {"host": "r2", "token": "t2"}
                ]
            },
            "token": "abc"
        });

        let value = redact(&config, &["password", "token"]).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "svc",
                "database": {
                    "host": "localhost",
                    "replicas": [{"host": "r1"}, {"host": "r2"}]
                }
            })
        );
    }

    #[test]
    fn test_redact_without_keys_is_identity() {
        let config = TestConfig {
            name: "svc".to_string(),
            port: 80,
            enabled: true,
        };
        let value = redact(&config, &[]).unwrap();
        assert_eq!(value, json!({"name": "svc", "port": 80, "enabled": true}));
    }

    #[test]
    fn test_print_succeeds() {
        let config = TestConfig {
            name: "svc".to_string(),
            port: 80,
            enabled: true,
        };
        assert!(print(&config, &["port"]).is_ok());
    }
}
