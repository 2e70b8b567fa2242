//! Session executor: one SSH session per call.
//!
//! Every call connects, runs its command(s) and disconnects before
//! returning, on success and failure alike. No session outlives the call
//! and nothing is retried here.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::channel::{Shell, ShellChannel};
use crate::commands::CommandSet;
use crate::driver::DeviceSession;
use crate::error::{Error, Result, TransportError};
use crate::inventory::DeviceDescriptor;
use crate::platform::{Mode, PlatformRegistry};
use crate::transport::{HostKeyVerification, SshConfig, SshTransport};

/// Runs device commands over a session scoped to one call.
pub trait SessionExecutor: Send + Sync {
    /// Send one command and return its output.
    fn run_show(
        &self,
        device: &DeviceDescriptor,
        command: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Send `commands` as one configuration transaction and return the
    /// device's transcript for the whole set.
    fn run_config(
        &self,
        device: &DeviceDescriptor,
        commands: &CommandSet,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Session settings shared by every call.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Connect and authentication timeout.
    pub connect_timeout: Duration,

    /// Time allowed for each prompt to come back.
    pub command_timeout: Duration,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// known_hosts override.
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

/// Executor backed by real SSH sessions.
pub struct SshExecutor {
    platforms: Arc<PlatformRegistry>,
    options: SessionOptions,
}

impl SshExecutor {
    /// Create an executor over the given platforms.
    pub fn new(platforms: Arc<PlatformRegistry>, options: SessionOptions) -> Self {
        Self { platforms, options }
    }

    /// Connect, authenticate and prepare a session.
    async fn open(&self, device: &DeviceDescriptor) -> Result<DeviceSession<ShellChannel>> {
        let platform = self.platforms.get(&device.device_type)?.clone();

        let config = SshConfig {
            host: device.host.clone(),
            port: device.port,
            username: device.username.clone(),
            password: SecretString::from(device.password.expose_secret().to_string()),
            timeout: self.options.connect_timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.options.host_key_verification.clone(),
            known_hosts_path: self.options.known_hosts_path.clone(),
        };

        let transport = SshTransport::connect(&config).await?;
        let shell = match transport.open_shell().await {
            Ok(channel) => ShellChannel::new(transport, channel),
            Err(e) => {
                close_quietly(transport.close(), &device.name).await;
                return Err(e.into());
            }
        };

        // enable falls back to the login password
        let enable_secret = device
            .secret
            .as_ref()
            .unwrap_or(&device.password)
            .expose_secret()
            .to_string();

        let session = DeviceSession::new(
            shell,
            platform,
            SecretString::from(enable_secret),
            self.options.command_timeout,
        );
        start_session(session, &device.name).await
    }
}

impl SessionExecutor for SshExecutor {
    async fn run_show(&self, device: &DeviceDescriptor, command: &str) -> Result<String> {
        info!("{}: show '{}'", device.name, command);
        let session = self.open(device).await?;
        show_in_session(session, &device.name, command).await
    }

    async fn run_config(&self, device: &DeviceDescriptor, commands: &CommandSet) -> Result<String> {
        info!("{}: config set of {} commands", device.name, commands.len());
        let session = self.open(device).await?;
        config_in_session(session, &device.name, commands).await
    }
}

/// Wait for the first prompt and run the platform's preparation commands.
///
/// A session that fails here is closed before the error is returned.
async fn start_session<S: Shell>(mut session: DeviceSession<S>, device: &str) -> Result<DeviceSession<S>> {
    match session.prepare().await {
        Ok(()) => {
            debug!("{}: session ready ({:?})", device, session.mode());
            Ok(session)
        }
        Err(e) => {
            let partial = session.transcript();
            close_quietly(session.close(), device).await;
            Err(Error::transport(e, partial))
        }
    }
}

/// Run one command in privileged mode and close the session.
async fn show_in_session<S: Shell>(mut session: DeviceSession<S>, device: &str, command: &str) -> Result<String> {
    let result = send_privileged(&mut session, command).await;
    finish(session, device, result).await
}

/// Send `command` from privileged mode, which saving the configuration
/// needs on every supported platform. A command the device rejects is an
/// error; the device's complaint stays in the transcript.
async fn send_privileged<S: Shell>(
    session: &mut DeviceSession<S>,
    command: &str,
) -> std::result::Result<String, TransportError> {
    session.acquire(Mode::Privileged).await?;
    let response = session.send_command(command).await?;
    match response.failure_message {
        Some(message) => Err(TransportError::CommandRejected {
            command: command.to_string(),
            message,
        }),
        None => Ok(response.result),
    }
}

/// Send a configuration set and close the session.
///
/// Rejected lines are logged; their output stays in the transcript.
async fn config_in_session<S: Shell>(
    mut session: DeviceSession<S>,
    device: &str,
    commands: &CommandSet,
) -> Result<String> {
    let result = session.send_config(commands.as_slice()).await.map(|responses| {
        for failed in responses.iter().filter(|r| !r.is_success()) {
            warn!(
                "{}: '{}' failed: {}",
                device,
                failed.command,
                failed.failure_message.as_deref().unwrap_or_default()
            );
        }
        responses
            .iter()
            .map(|r| r.raw_result.as_str())
            .collect::<String>()
    });

    finish(session, device, result).await
}

/// Tear the session down and hand back `result`, attaching the session
/// transcript to a failure.
async fn finish<S: Shell, T>(
    session: DeviceSession<S>,
    device: &str,
    result: std::result::Result<T, TransportError>,
) -> Result<T> {
    let partial = match result {
        Ok(_) => String::new(),
        Err(_) => session.transcript(),
    };
    close_quietly(session.close(), device).await;
    result.map_err(|e| Error::transport(e, partial))
}

/// Await a close future, logging instead of failing.
async fn close_quietly<F>(close: F, device: &str)
where
    F: Future<Output = std::result::Result<(), TransportError>>,
{
    if let Err(e) = close.await {
        warn!("{}: error while disconnecting: {}", device, e);
    }
}
