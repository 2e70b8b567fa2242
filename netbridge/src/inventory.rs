//! Device registry: logical device names to connection descriptors.
//!
//! The inventory is a YAML document with a `devices` map:
//!
//! ```yaml
//! devices:
//!   core-r1:
//!     device_type: cisco_ios
//!     host: 192.168.0.201
//!     username: cisco
//!     password: cisco123
//!     secret: enablepass   # optional, defaults to the password
//!     port: 22             # optional
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Error, InventoryError, Result};

/// Default SSH port.
const DEFAULT_PORT: u16 = 22;

/// Resolved connection identity and credentials for one device.
///
/// Built fresh on every lookup; nothing is cached between calls.
pub struct DeviceDescriptor {
    /// Inventory key.
    pub name: String,
    /// Platform tag (e.g. "cisco_ios").
    pub device_type: String,
    /// Address to connect to.
    pub host: String,
    /// SSH port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: SecretString,
    /// Enable secret, when it differs from the password.
    pub secret: Option<SecretString>,
}

impl fmt::Debug for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDescriptor")
            .field("name", &self.name)
            .field("device_type", &self.device_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Device listing without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub name: String,
    pub device_type: String,
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize)]
struct InventoryFile {
    #[serde(default)]
    devices: IndexMap<String, DeviceEntry>,
}

#[derive(Deserialize)]
struct DeviceEntry {
    device_type: String,
    host: String,
    #[serde(default)]
    port: Option<u16>,
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    secret: Option<String>,
}

/// Read-only inventory of devices, loaded once and shared.
pub struct DeviceRegistry {
    devices: IndexMap<String, DeviceEntry>,
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DeviceRegistry {
    /// Parse an inventory document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: InventoryFile = serde_yaml::from_str(content).map_err(InventoryError::Parse)?;
        debug!("inventory holds {} devices", file.devices.len());
        Ok(Self {
            devices: file.devices,
        })
    }

    /// Load an inventory file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Resolve a device name to its descriptor.
    pub fn resolve(&self, name: &str) -> Result<DeviceDescriptor> {
        let entry = self.devices.get(name).ok_or_else(|| Error::UnknownDevice {
            name: name.to_string(),
        })?;

        for (field, value) in [
            ("device_type", &entry.device_type),
            ("host", &entry.host),
            ("username", &entry.username),
        ] {
            if value.trim().is_empty() {
                return Err(InventoryError::InvalidDevice {
                    name: name.to_string(),
                    reason: format!("{field} is empty"),
                }
                .into());
            }
        }

        Ok(DeviceDescriptor {
            name: name.to_string(),
            device_type: entry.device_type.clone(),
            host: entry.host.clone(),
            port: entry.port.unwrap_or(DEFAULT_PORT),
            username: entry.username.clone(),
            password: SecretString::from(entry.password.clone()),
            secret: entry.secret.clone().map(SecretString::from),
        })
    }

    /// Device names in inventory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// All devices without credentials.
    pub fn summaries(&self) -> Vec<DeviceSummary> {
        self.devices
            .iter()
            .map(|(name, entry)| DeviceSummary {
                name: name.clone(),
                device_type: entry.device_type.clone(),
                host: entry.host.clone(),
                port: entry.port.unwrap_or(DEFAULT_PORT),
            })
            .collect()
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
