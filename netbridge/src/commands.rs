//! Command builder: structured intents to ordered CLI command sets.
//!
//! Everything here is a pure function of its inputs. Inputs are validated
//! before any command string is produced.

use std::net::Ipv4Addr;
use std::ops::Deref;

use serde::Serialize;

use crate::error::{Result, ValidationError};

/// Ordered CLI lines making up one configuration transaction.
///
/// Later lines rely on the context set up by earlier ones (`interface X`
/// before `ip address ...`), so the order is never changed after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandSet(Vec<String>);

impl CommandSet {
    /// Build a set from lines in execution order.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(commands.into_iter().map(Into::into).collect())
    }

    /// Lines in execution order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for CommandSet {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a CommandSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A validated interface / IPv4 address / mask triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    interface: String,
    ip: Ipv4Addr,
    mask: Ipv4Addr,
}

impl InterfaceAddress {
    /// Validate the raw inputs.
    pub fn new(interface: &str, ip: &str, mask: &str) -> std::result::Result<Self, ValidationError> {
        let interface = validate_interface(interface)?;
        let ip = parse_ipv4("ip", ip)?;
        let mask = parse_ipv4("mask", mask)?;
        Ok(Self { interface, ip, mask })
    }

    /// Interface name as given (surrounding whitespace trimmed).
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Commands assigning the address, optionally bringing the interface up.
    pub fn to_commands(&self, no_shutdown: bool) -> CommandSet {
        let mut commands = vec![
            format!("interface {}", self.interface),
            format!("ip address {} {}", self.ip, self.mask),
        ];
        if no_shutdown {
            commands.push("no shutdown".to_string());
        }
        commands.push("exit".to_string());
        CommandSet(commands)
    }
}

/// Validate inputs and build the "set interface IP" command set.
pub fn build_interface_ip_set(
    interface: &str,
    ip: &str,
    mask: &str,
    no_shutdown: bool,
) -> Result<CommandSet> {
    Ok(InterfaceAddress::new(interface, ip, mask)?.to_commands(no_shutdown))
}

fn parse_ipv4(field: &'static str, value: &str) -> std::result::Result<Ipv4Addr, ValidationError> {
    value
        .parse::<Ipv4Addr>()
        .map_err(|_| ValidationError::InvalidIpv4 {
            field,
            value: value.to_string(),
        })
}

fn validate_interface(value: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = value.trim();
    let reason = if trimmed.is_empty() {
        Some("name is empty")
    } else if trimmed.chars().any(char::is_control) {
        // a newline would inject extra CLI lines
        Some("name contains control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidInterface {
            value: value.to_string(),
            reason,
        }),
        None => Ok(trimmed.to_string()),
    }
}
