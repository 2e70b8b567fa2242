//! # netbridge
//!
//! Lets a tool-calling agent inspect and reconfigure routers and switches
//! over SSH through a few named operations, without knowing vendor CLI
//! syntax.
//!
//! ## Layers
//!
//! - [`inventory`] resolves a device name to a [`DeviceDescriptor`]
//! - [`commands`] validates structured input and builds a [`CommandSet`]
//! - [`executor`] runs commands over an SSH session scoped to one call
//!   (built on [`transport`], [`channel`], [`platform`] and [`driver`])
//! - [`orchestrator`] composes the above per operation: dry run, save,
//!   verification
//! - [`tools`] and [`server`] expose the operations as JSON-RPC tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netbridge::{
//!     DeviceRegistry, OperationCommands, Orchestrator, PlatformRegistry, SessionOptions,
//!     SetInterfaceIp, SshExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netbridge::Error> {
//!     let registry = Arc::new(DeviceRegistry::load("devices.yaml")?);
//!     let executor = SshExecutor::new(
//!         Arc::new(PlatformRegistry::with_builtins()),
//!         SessionOptions::default(),
//!     );
//!     let orchestrator = Orchestrator::new(registry, executor, OperationCommands::default());
//!
//!     println!("{}", orchestrator.show_ip_int_brief("core-r1").await?);
//!
//!     let outcome = orchestrator
//!         .set_interface_ip(&SetInterfaceIp {
//!             device: "core-r1".into(),
//!             interface: "GigabitEthernet0/1".into(),
//!             ip: "10.0.0.1".into(),
//!             mask: "255.255.255.0".into(),
//!             no_shutdown: true,
//!             save: false,
//!             dry_run: true,
//!         })
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod orchestrator;
pub mod platform;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use commands::{CommandSet, InterfaceAddress, build_interface_ip_set};
pub use config::Config;
pub use error::{Error, ErrorKind, Result, StageError};
pub use executor::{SessionExecutor, SessionOptions, SshExecutor};
pub use inventory::{DeviceDescriptor, DeviceRegistry};
pub use orchestrator::{OperationCommands, OperationOutcome, Orchestrator, SetInterfaceIp};
pub use platform::{Mode, PlatformDefinition, PlatformRegistry};
pub use tools::ToolDispatcher;
