//! Platform definitions for the supported device types.
//!
//! A platform tells a session how to recognise each CLI mode from the
//! prompt, how to move between modes, and which output strings mean the
//! device rejected a command.

mod definition;
mod mode;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use mode::{Mode, ModePrompt};
pub use registry::PlatformRegistry;
