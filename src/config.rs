//! Configuration management for RAX FS Shell
//!
//! Settings come from an optional `config.toml` layered under environment
//! variables prefixed with `RAX_FS_`. Everything is loaded once at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `RAX_FS_QUOTA_BYTES`.
const ENV_PREFIX: &str = "RAX_FS";

/// How sessions reach the shell.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// A single session on stdin/stdout.
    Console,
    /// One session per TCP connection.
    Tcp,
}

/// Complete shell configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ShellConfig {
    // ═══ STORAGE ═══
    /// Parent directory of every user root
    pub users_root: String,

    /// JSON file holding `{ "username": "password" }`
    pub credentials_file: String,

    /// Per-user byte quota; absent means unlimited
    #[serde(default)]
    pub quota_bytes: Option<u64>,

    // ═══ TRANSPORT ═══
    pub mode: ServeMode,
    pub bind_address: String,
    pub port: u16,

    /// Maximum concurrent TCP sessions
    pub max_sessions: usize,

    // ═══ INPUT LIMITS ═══
    pub max_command_length: usize,
    pub max_username_length: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            users_root: "./users".to_string(),
            credentials_file: "./users.json".to_string(),
            quota_bytes: None,
            mode: ServeMode::Console,
            bind_address: "127.0.0.1".to_string(),
            port: 2323,
            max_sessions: 10,
            max_command_length: 512,
            max_username_length: 32,
        }
    }
}

impl ShellConfig {
    /// Load configuration from `./config.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from the given TOML file (if present) with environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("users_root", defaults.users_root)?
            .set_default("credentials_file", defaults.credentials_file)?
            .set_default("mode", "console")?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_sessions", defaults.max_sessions as i64)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default("max_username_length", defaults.max_username_length as i64)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ShellConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users_root.trim().is_empty() {
            return Err(ConfigError::Message("users_root cannot be empty".into()));
        }

        if self.credentials_file.trim().is_empty() {
            return Err(ConfigError::Message(
                "credentials_file cannot be empty".into(),
            ));
        }

        if self.quota_bytes == Some(0) {
            return Err(ConfigError::Message(
                "quota_bytes must be greater than 0 (omit it for unlimited)".into(),
            ));
        }

        if self.mode == ServeMode::Tcp && self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_sessions == 0 {
            return Err(ConfigError::Message(
                "max_sessions must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 || self.max_username_length == 0 {
            return Err(ConfigError::Message(
                "input length limits must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn users_root_path(&self) -> PathBuf {
        PathBuf::from(&self.users_root)
    }

    pub fn credentials_path(&self) -> PathBuf {
        PathBuf::from(&self.credentials_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = ShellConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quota_bytes, None);
        assert_eq!(config.control_socket(), "127.0.0.1:2323");
    }

    #[test]
    fn test_zero_quota_rejected() {
        let config = ShellConfig {
            quota_bytes: Some(0),
            ..ShellConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_users_root_rejected() {
        let config = ShellConfig {
            users_root: "  ".into(),
            ..ShellConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shell.toml");
        fs::write(
            &path,
            "users_root = \"/srv/users\"\nquota_bytes = 1000\nmode = \"tcp\"\nport = 4000\n",
        )
        .unwrap();

        let config = ShellConfig::load_from(&path).unwrap();
        assert_eq!(config.users_root, "/srv/users");
        assert_eq!(config.quota_bytes, Some(1000));
        assert_eq!(config.mode, ServeMode::Tcp);
        assert_eq!(config.port, 4000);
        assert_eq!(config.max_command_length, 512);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ShellConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.users_root, "./users");
        assert_eq!(config.mode, ServeMode::Console);
    }
}
