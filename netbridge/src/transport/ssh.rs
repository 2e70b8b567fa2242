//! SSH transport implementation using russh.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, Handle, KeyboardInteractiveAuthResponse, Msg};
use russh::keys::PublicKey;
use secrecy::ExposeSecret;

use super::config::{HostKeyVerification, SshConfig};
use crate::error::TransportError;

/// Keyboard-interactive rounds answered before giving up.
const MAX_INTERACTIVE_ROUNDS: usize = 3;

/// SSH transport wrapping a russh client session.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Terminal size requested for the shell.
    terminal: (u32, u32),
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: &SshConfig) -> Result<Self, TransportError> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout * 6),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("connecting to {}", config.socket_addr());

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // check_server_key leaves a detailed error behind when it rejects a key
            let stored = host_key_error.lock().ok().and_then(|mut slot| slot.take());
            match (stored, e) {
                (Some(hk_err), _) => hk_err,
                (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                    host: config.host.clone(),
                    port: config.port,
                    source,
                },
                (None, e) => TransportError::Ssh(e),
            }
        })?;

        let authenticated =
            match tokio::time::timeout(config.timeout, Self::authenticate(&mut session, config)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(config.timeout)),
            };
        disconnect_on_error(authenticated, || {
            session.disconnect(russh::Disconnect::ByApplication, "", "en")
        })
        .await?;

        debug!("authenticated to {} as {}", config.socket_addr(), config.username);

        Ok(Self {
            session,
            terminal: (config.terminal_width, config.terminal_height),
        })
    }

    /// Open a PTY channel running the device's interactive shell.
    pub async fn open_shell(&self) -> Result<Channel<Msg>, TransportError> {
        let channel = self.session.channel_open_session().await?;

        let (width, height) = self.terminal;
        channel
            .request_pty(true, "xterm", width, height, 0, 0, &[])
            .await
            .map_err(|e| TransportError::ShellOpenFailed(format!("pty request: {e}")))?;

        channel
            .request_shell(true)
            .await
            .map_err(|e| TransportError::ShellOpenFailed(format!("shell request: {e}")))?;

        Ok(channel)
    }

    /// Authenticate with password, falling back to keyboard-interactive.
    ///
    /// Many network operating systems only offer the password through
    /// keyboard-interactive prompts.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &SshConfig,
    ) -> Result<(), TransportError> {
        let password = config.password.expose_secret();

        if session
            .authenticate_password(&config.username, password)
            .await?
            .success()
        {
            return Ok(());
        }

        debug!("password auth rejected, trying keyboard-interactive");

        let mut response = session
            .authenticate_keyboard_interactive_start(&config.username, None::<String>)
            .await?;

        for _ in 0..MAX_INTERACTIVE_ROUNDS {
            match response {
                KeyboardInteractiveAuthResponse::Success => return Ok(()),
                KeyboardInteractiveAuthResponse::InfoRequest { ref prompts, .. } => {
                    let answers = prompts.iter().map(|_| password.to_string()).collect();
                    response = session
                        .authenticate_keyboard_interactive_respond(answers)
                        .await?;
                }
                _ => break,
            }
        }

        Err(TransportError::AuthenticationFailed {
            user: config.username.clone(),
        })
    }

    /// Close the connection.
    pub async fn close(self) -> Result<(), TransportError> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// Hand back `result`, running `disconnect` first when it is an error.
async fn disconnect_on_error<T, F, D>(
    result: Result<T, TransportError>,
    disconnect: F,
) -> Result<T, TransportError>
where
    F: FnOnce() -> D,
    D: Future<Output = Result<(), russh::Error>>,
{
    if result.is_err() {
        if let Err(e) = disconnect().await {
            debug!("disconnect after failed login: {}", e);
        }
    }
    result
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key error so connect() can surface it
    /// instead of the generic russh::Error::UnknownKey.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(TransportError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> Result<bool, TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> Result<(), TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        result.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn reject(&self, err: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(err);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let accepted = match self.host_key_verification {
            HostKeyVerification::Disabled => true,

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key for {}: {}", self.host, e);
                    }
                    true
                }
                Err(e) => self.reject(e),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => self.reject(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                }),
                Err(e) => self.reject(e),
            },
        };

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_failed_login_disconnects() {
        let disconnected = AtomicBool::new(false);
        let result: Result<(), _> = disconnect_on_error(
            Err(TransportError::AuthenticationFailed {
                user: "cisco".to_string(),
            }),
            || async {
                disconnected.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(TransportError::AuthenticationFailed { .. })));
        assert!(disconnected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_successful_login_keeps_connection() {
        let disconnected = AtomicBool::new(false);
        let result = disconnect_on_error(Ok(7), || async {
            disconnected.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert!(!disconnected.load(Ordering::SeqCst));
    }
}
