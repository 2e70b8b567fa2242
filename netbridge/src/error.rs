//! Error types for netbridge.

use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::platform::Mode;

/// Main error type for netbridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The device name is not present in the inventory.
    #[error("Unknown device '{name}'")]
    UnknownDevice { name: String },

    /// Structured input was rejected before any device contact.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The SSH session failed while talking to the device.
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: TransportError,
        /// Output captured from the device before the failure.
        partial_output: String,
        /// Best-effort verification snapshot taken after a failed config step.
        verification: Option<String>,
        /// Why that verification snapshot could not be taken.
        verification_error: Option<StageError>,
    },

    /// Inventory loading or entry errors.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Platform/vendor errors.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Wrap a transport failure together with the output seen so far.
    pub fn transport(source: TransportError, partial_output: impl Into<String>) -> Self {
        Error::Transport {
            source,
            partial_output: partial_output.into(),
            verification: None,
            verification_error: None,
        }
    }

    /// Attach the outcome of a verification attempt to a transport failure.
    ///
    /// Other kinds carry no verification and are returned unchanged.
    pub fn with_verification(self, outcome: std::result::Result<String, StageError>) -> Self {
        match self {
            Error::Transport {
                source,
                partial_output,
                ..
            } => {
                let (verification, verification_error) = match outcome {
                    Ok(snapshot) => (Some(snapshot), None),
                    Err(stage) => (None, Some(stage)),
                };
                Error::Transport {
                    source,
                    partial_output,
                    verification,
                    verification_error,
                }
            }
            other => other,
        }
    }

    /// Stable kind name reported to tool callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownDevice { .. } => ErrorKind::UnknownDevice,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Inventory(_) => ErrorKind::Inventory,
            Error::Platform(_) => ErrorKind::Platform,
        }
    }

    /// Output captured before a transport failure, if any.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Error::Transport { partial_output, .. } if !partial_output.is_empty() => {
                Some(partial_output)
            }
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(source: TransportError) -> Self {
        Error::transport(source, String::new())
    }
}

/// Error kinds as exposed on the tool surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "UnknownDeviceError")]
    UnknownDevice,
    #[serde(rename = "ValidationError")]
    Validation,
    #[serde(rename = "TransportError")]
    Transport,
    #[serde(rename = "InventoryError")]
    Inventory,
    #[serde(rename = "PlatformError")]
    Platform,
}

/// Failure of one stage of a multi-step operation, kept as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub partial_output: String,
}

impl From<&Error> for StageError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            partial_output: err.partial_output().unwrap_or_default().to_string(),
        }
    }
}

/// Rejected structured input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field that must hold an IPv4 address does not.
    #[error("{field} '{value}' is not a valid IPv4 address")]
    InvalidIpv4 { field: &'static str, value: String },

    /// Interface name is empty or carries characters the CLI would misread.
    #[error("Invalid interface name '{value}': {reason}")]
    InvalidInterface { value: String, reason: &'static str },

    /// Tool arguments did not match the schema.
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// The requested tool does not exist.
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),
}

/// Transport layer errors (SSH connection, authentication, shell I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host key does not match the recorded key
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Connect or read did not finish in time
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to open the interactive shell
    #[error("Failed to open shell channel: {0}")]
    ShellOpenFailed(String),

    /// The device never reached the requested CLI mode
    #[error("Failed to enter {target} mode (prompt: '{prompt}')")]
    ModeAcquisitionFailed { target: Mode, prompt: String },

    /// The device answered a command with one of its failure strings
    #[error("Device rejected '{command}': {message}")]
    CommandRejected { command: String, message: String },

    /// Prompt did not match any known mode
    #[error("Unrecognized prompt: '{prompt}'")]
    UnknownPrompt { prompt: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Inventory loading errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to read the inventory file
    #[error("Failed to read inventory {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Inventory content is not valid YAML of the expected shape
    #[error("Failed to parse inventory: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An entry is missing data required to connect
    #[error("Device '{name}' is invalid: {reason}")]
    InvalidDevice { name: String, reason: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No platform registered under this device type
    #[error("Unsupported device type '{name}'")]
    UnknownPlatform { name: String },

    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },
}

/// Result type alias using netbridge's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_serialize() {
        let kinds = [
            (ErrorKind::UnknownDevice, "\"UnknownDeviceError\""),
            (ErrorKind::Validation, "\"ValidationError\""),
            (ErrorKind::Transport, "\"TransportError\""),
        ];
        for (kind, expected) in kinds {
            assert_eq!(serde_json::to_string(&kind).unwrap(), expected);
        }
    }

    #[test]
    fn test_transport_error_keeps_partial_output() {
        let err = Error::transport(TransportError::Disconnected, "router#conf t\n");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.partial_output(), Some("router#conf t\n"));

        let err: Error = TransportError::Disconnected.into();
        assert_eq!(err.partial_output(), None);
    }

    #[test]
    fn test_with_verification_records_failure() {
        let failed: Error = Error::transport(TransportError::Timeout(Duration::from_secs(5)), "sh ip");
        let stage = StageError::from(&failed);
        assert_eq!(stage.kind, ErrorKind::Transport);
        assert_eq!(stage.partial_output, "sh ip");

        let err = Error::transport(TransportError::Disconnected, "conf t").with_verification(Err(stage.clone()));
        match err {
            Error::Transport {
                verification,
                verification_error,
                ..
            } => {
                assert!(verification.is_none());
                assert_eq!(verification_error, Some(stage));
            }
            other => panic!("expected transport error, got {other:?}"),
        }

        let err = Error::UnknownDevice { name: "r9".into() }.with_verification(Ok("x".into()));
        assert_eq!(err.kind(), ErrorKind::UnknownDevice);
    }
}
