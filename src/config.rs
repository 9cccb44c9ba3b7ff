//! Configuration loading and management
//!
//! Handles parsing of `taskd.toml`. Every field has a default, so a missing
//! file means a fully default configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "taskd.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data directory and file layout
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/static`, with `index.html` at `/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,

    /// Allow any origin, method and header
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            cors_permissive: true,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    #[serde(default = "default_deleted_file")]
    pub deleted_file: String,

    #[serde(default = "default_counter_file")]
    pub counter_file: String,

    /// Replace files via temp file + rename instead of overwriting in place
    #[serde(default = "default_true")]
    pub atomic_writes: bool,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_tasks_file() -> String {
    "tasks.json".to_string()
}

fn default_deleted_file() -> String {
    "deleted_tasks.json".to_string()
}

fn default_counter_file() -> String {
    "id_counter.json".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tasks_file: default_tasks_file(),
            deleted_file: default_deleted_file(),
            counter_file: default_counter_file(),
            atomic_writes: true,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also append log lines to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        let files = [
            ("storage.tasks_file", &self.tasks_file),
            ("storage.deleted_file", &self.deleted_file),
            ("storage.counter_file", &self.counter_file),
        ];

        let mut seen = HashSet::new();
        for (field, name) in files {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
            }
            if trimmed.contains('/') || trimmed.contains('\\') {
                return Err(Error::InvalidConfig(format!(
                    "{field} must be a file name, not a path: '{trimmed}'"
                )));
            }
            if !seen.insert(trimmed) {
                return Err(Error::InvalidConfig(format!(
                    "{field} '{trimmed}' is already used by another store"
                )));
            }
        }

        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `taskd.toml` from a directory, or return defaults
    ///
    /// An unreadable or invalid file is reported and ignored.
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "server.host cannot be empty".to_string(),
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(Error::InvalidConfig("log.level cannot be empty".to_string()));
        }
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.server.static_dir.is_none());
        assert!(cfg.server.cors_permissive);
        assert_eq!(cfg.storage.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.storage.tasks_file, "tasks.json");
        assert_eq!(cfg.storage.deleted_file, "deleted_tasks.json");
        assert_eq!(cfg.storage.counter_file, "id_counter.json");
        assert!(cfg.storage.atomic_writes);
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.log.file.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[server]
host = "0.0.0.0"
port = 9090
static_dir = "public"
cors_permissive = false

[storage]
data_dir = "/var/lib/taskd"
tasks_file = "active.json"
deleted_file = "trash.json"
counter_file = "seq.json"
atomic_writes = false
lock_timeout_ms = 250

[log]
level = "taskd=debug"
file = "logs/app.log"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.static_dir, Some(PathBuf::from("public")));
        assert!(!cfg.server.cors_permissive);
        assert_eq!(cfg.storage.data_dir, PathBuf::from("/var/lib/taskd"));
        assert_eq!(cfg.storage.tasks_file, "active.json");
        assert_eq!(cfg.storage.deleted_file, "trash.json");
        assert_eq!(cfg.storage.counter_file, "seq.json");
        assert!(!cfg.storage.atomic_writes);
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
        assert_eq!(cfg.log.level, "taskd=debug");
        assert_eq!(cfg.log.file, Some(PathBuf::from("logs/app.log")));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[server]\nport = 3000\n").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.storage.tasks_file, "tasks.json");
    }

    #[test]
    fn duplicate_store_files_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
tasks_file = "tasks.json"
deleted_file = "tasks.json"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(message) => assert!(message.contains("storage.deleted_file")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn store_file_with_path_rejected() {
        let mut cfg = Config::default();
        cfg.storage.counter_file = "../counter.json".to_string();
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_lock_timeout_rejected() {
        let mut cfg = Config::default();
        cfg.storage.lock_timeout_ms = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn load_from_dir_ignores_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), "port = [").expect("write config");

        let cfg = Config::load_from_dir(dir.path());
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn save_writes_toml_that_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("port = 8000"));
        assert!(written.contains("tasks_file = \"tasks.json\""));

        let cfg = Config::load(&path).expect("reload");
        assert_eq!(cfg.storage.deleted_file, "deleted_tasks.json");
    }
}
