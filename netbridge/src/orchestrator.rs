//! Operation orchestrator: one logical tool call end to end.
//!
//! A configuration change runs as a pipeline of independently failing
//! stages (config, optional save, verification). Each stage records its
//! own output or error so a failed save is never confused with a failed
//! config change.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::commands::{CommandSet, InterfaceAddress};
use crate::error::{Error, Result, StageError};
use crate::executor::SessionExecutor;
use crate::inventory::{DeviceDescriptor, DeviceRegistry, DeviceSummary};

/// Commands the orchestrator issues on its own behalf.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationCommands {
    /// Read-only query reporting interface state.
    pub verify: String,

    /// Persists the running configuration.
    pub save: String,
}

impl Default for OperationCommands {
    fn default() -> Self {
        Self {
            verify: "show ip interface brief".to_string(),
            save: "write memory".to_string(),
        }
    }
}

/// Inputs of `set_interface_ip`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetInterfaceIp {
    pub device: String,
    pub interface: String,
    pub ip: String,
    pub mask: String,
    #[serde(default = "default_true")]
    pub no_shutdown: bool,
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_true() -> bool {
    true
}

/// Result of a dry run: the commands that would be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunOutcome {
    pub dry_run: bool,
    pub commands: CommandSet,
}

/// Result of an applied change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedOutcome {
    pub applied_commands: CommandSet,
    pub config_output: String,
    /// Absent when save was not requested or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<StageError>,
    /// Empty when the verification query failed.
    pub verification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_error: Option<StageError>,
}

/// What a configuration operation returns: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutcome {
    DryRun(DryRunOutcome),
    Applied(AppliedOutcome),
}

/// Composes registry, command builder and executor per tool call.
pub struct Orchestrator<E> {
    registry: Arc<DeviceRegistry>,
    executor: E,
    commands: OperationCommands,
}

impl<E: SessionExecutor> Orchestrator<E> {
    /// Create an orchestrator.
    pub fn new(registry: Arc<DeviceRegistry>, executor: E, commands: OperationCommands) -> Self {
        Self {
            registry,
            executor,
            commands,
        }
    }

    /// Raw `show ip interface brief` output of a device.
    pub async fn show_ip_int_brief(&self, device: &str) -> Result<String> {
        let device = self.registry.resolve(device)?;
        self.executor.run_show(&device, &self.commands.verify).await
    }

    /// Assign an IPv4 address to an interface.
    pub async fn set_interface_ip(&self, request: &SetInterfaceIp) -> Result<OperationOutcome> {
        let address = InterfaceAddress::new(&request.interface, &request.ip, &request.mask)?;
        let device = self.registry.resolve(&request.device)?;
        let commands = address.to_commands(request.no_shutdown);
        debug!("{}: {} commands for {}", device.name, commands.len(), address.interface());

        if request.dry_run {
            info!("{}: dry run of {} commands", device.name, commands.len());
            return Ok(OperationOutcome::DryRun(DryRunOutcome {
                dry_run: true,
                commands,
            }));
        }

        let config = self.executor.run_config(&device, &commands).await;

        let config_output = match config {
            Ok(output) => output,
            Err(err) => {
                warn!("{}: config failed: {}", device.name, err);
                let verification = self.verify(&device).await;
                return Err(err.with_verification(verification.map_err(|e| StageError::from(&e))));
            }
        };

        let (save_output, save_error) = if request.save {
            match self.executor.run_show(&device, &self.commands.save).await {
                Ok(output) => (Some(output), None),
                Err(err) => {
                    warn!("{}: save failed: {}", device.name, err);
                    (None, Some(StageError::from(&err)))
                }
            }
        } else {
            (None, None)
        };

        let (verification, verification_error) = match self.verify(&device).await {
            Ok(output) => (output, None),
            Err(err) => (String::new(), Some(StageError::from(&err))),
        };

        Ok(OperationOutcome::Applied(AppliedOutcome {
            applied_commands: commands,
            config_output,
            save_output,
            save_error,
            verification,
            verification_error,
        }))
    }

    /// Devices in the inventory, without credentials.
    pub fn list_devices(&self) -> Vec<DeviceSummary> {
        self.registry.summaries()
    }

    async fn verify(&self, device: &DeviceDescriptor) -> Result<String> {
        let result = self.executor.run_show(device, &self.commands.verify).await;
        if let Err(ref err) = result {
            warn!("{}: verification failed: {}", device.name, err);
        }
        result
    }
}
