//! Server configuration file.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! server:
//!   host: 127.0.0.1
//!   port: 2091
//! inventory: devices.yaml
//! ssh:
//!   connect_timeout_secs: 10
//!   command_timeout_secs: 30
//!   host_key_verification: accept_new   # strict | accept_new | disabled
//!   known_hosts_path: /etc/netbridge/known_hosts
//! commands:
//!   verify: show ip interface brief
//!   save: write memory
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::executor::SessionOptions;
use crate::orchestrator::OperationCommands;
use crate::transport::HostKeyVerification;

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid YAML or unknown keys
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub inventory: PathBuf,
    pub ssh: SshSettings,
    pub commands: OperationCommands,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            inventory: PathBuf::from("devices.yaml"),
            ssh: SshSettings::default(),
            commands: OperationCommands::default(),
        }
    }
}

impl Config {
    /// Parse a configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// `host:port` the server listens on.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Listening endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2091,
        }
    }
}

/// SSH session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSettings {
    pub connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            command_timeout_secs: 30,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

impl SshSettings {
    /// Executor options for these settings.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            host_key_verification: self.host_key_verification.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr(), "127.0.0.1:2091");
        assert_eq!(config.commands.save, "write memory");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_yaml_str(
            "server:\n  port: 9000\nssh:\n  host_key_verification: disabled\ncommands:\n  save: copy running-config startup-config\n",
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.ssh.host_key_verification, HostKeyVerification::Disabled);
        assert_eq!(config.ssh.command_timeout_secs, 30);
        assert_eq!(config.commands.verify, "show ip interface brief");
        assert_eq!(config.commands.save, "copy running-config startup-config");

        let options = config.ssh.session_options();
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            Config::from_yaml_str("listen: 0.0.0.0\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
