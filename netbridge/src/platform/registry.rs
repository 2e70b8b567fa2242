//! Lookup of platform definitions by device type.

use std::collections::HashMap;

use super::definition::PlatformDefinition;
use super::vendors::{arista_eos, cisco_ios};
use crate::error::{PlatformError, Result};

/// Registry for platform definitions.
///
/// Constructed explicitly and handed to the executor; there is no
/// process-wide instance.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in platforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for platform in [
            cisco_ios::platform(),
            cisco_ios::xe_platform(),
            arista_eos::platform(),
        ] {
            registry.platforms.insert(platform.name.clone(), platform);
        }
        registry
    }

    /// Register a platform definition.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        if platform.prompts.is_empty() {
            return Err(PlatformError::InvalidDefinition {
                message: format!("platform '{}' defines no prompts", platform.name),
            }
            .into());
        }
        self.platforms.insert(platform.name.clone(), platform);
        Ok(())
    }

    /// Get a platform by device type.
    pub fn get(&self, name: &str) -> Result<&PlatformDefinition> {
        self.platforms.get(name).ok_or_else(|| {
            PlatformError::UnknownPlatform {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// List all registered platform names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.platforms.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn test_builtins() {
        let registry = PlatformRegistry::with_builtins();
        assert!(registry.contains("cisco_ios"));
        assert!(registry.contains("cisco_xe"));
        assert!(registry.contains("arista_eos"));
        assert_eq!(registry.names().count(), 3);
    }

    #[test]
    fn test_unknown_platform() {
        let registry = PlatformRegistry::with_builtins();
        let err = registry.get("juniper_junos").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Platform);
        assert!(matches!(
            err,
            Error::Platform(PlatformError::UnknownPlatform { ref name }) if name == "juniper_junos"
        ));
    }

    #[test]
    fn test_register_rejects_empty_platform() {
        let mut registry = PlatformRegistry::new();
        assert!(registry.register(PlatformDefinition::new("bare")).is_err());
        assert!(registry.register(cisco_ios::platform().renamed("lab_ios")).is_ok());
        assert!(registry.contains("lab_ios"));
    }
}
