//! Interactive CLI session on one device.

use std::time::{Duration, Instant};

use log::{debug, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::response::Response;
use crate::channel::{Shell, ShellChannel};
use crate::error::TransportError;
use crate::platform::{Mode, PlatformDefinition};

/// A logged-in shell on a device, tracking its CLI mode.
///
/// Every byte read through the session is kept in a transcript so a
/// failure can report what the device printed before it happened.
pub struct DeviceSession<S = ShellChannel> {
    shell: S,
    platform: PlatformDefinition,
    prompt_pattern: Regex,
    mode: Option<Mode>,
    timeout: Duration,
    enable_secret: SecretString,
    transcript: String,
}

impl<S: Shell> DeviceSession<S> {
    /// Wrap a logged-in shell. Call [`prepare`](Self::prepare) before
    /// sending commands.
    pub fn new(
        shell: S,
        platform: PlatformDefinition,
        enable_secret: SecretString,
        timeout: Duration,
    ) -> Self {
        let prompt_pattern = platform.any_prompt_pattern();
        Self {
            shell,
            platform,
            prompt_pattern,
            mode: None,
            timeout,
            enable_secret,
            transcript: String::new(),
        }
    }

    /// Wait for the login prompt, detect the mode and run the platform's
    /// session preparation commands.
    pub async fn prepare(&mut self) -> Result<(), TransportError> {
        let pattern = self.prompt_pattern.clone();
        let (data, _) = self.read_until(&[&pattern]).await?;
        let prompt = last_line(&data);
        self.mode = self.platform.mode_from_prompt(&prompt);
        debug!("{}: initial prompt '{}' ({:?})", self.platform.name, prompt, self.mode);

        for cmd in self.platform.on_open_commands.clone() {
            self.send_command(&cmd).await?;
        }
        Ok(())
    }

    /// Current CLI mode, if the last prompt was recognised.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Send a command in the current mode and wait for the prompt.
    pub async fn send_command(&mut self, command: &str) -> Result<Response, TransportError> {
        let start = Instant::now();

        self.shell.send_line(command).await?;
        let pattern = self.prompt_pattern.clone();
        let (data, _) = self.read_until(&[&pattern]).await?;

        let response = Response::from_raw(command, &data, start.elapsed());
        self.mode = self.platform.mode_from_prompt(&response.prompt);

        match self.platform.detect_failure(&response.result) {
            Some(failure) => {
                warn!(
                    "{}: device rejected '{}': {}",
                    self.platform.name, command, failure
                );
                let failure = failure.to_string();
                Ok(response.with_failure(failure))
            }
            None => Ok(response),
        }
    }

    /// Move to `target` one mode at a time.
    pub async fn acquire(&mut self, target: Mode) -> Result<(), TransportError> {
        // bounded: Exec -> Configuration is two steps, allow one retry each
        for _ in 0..4 {
            let current = self.mode.ok_or_else(|| TransportError::UnknownPrompt {
                prompt: self.shell.pending(),
            })?;

            if current == target {
                return Ok(());
            }

            if current < target {
                self.escalate(current).await?;
            } else {
                self.deescalate(current).await?;
            }
        }

        Err(TransportError::ModeAcquisitionFailed {
            target,
            prompt: self.mode.map(|m| m.to_string()).unwrap_or_default(),
        })
    }

    /// Send `commands` in configuration mode, then return to privileged.
    ///
    /// Commands are sent strictly in order; the first transport failure
    /// aborts the rest.
    pub async fn send_config(&mut self, commands: &[String]) -> Result<Vec<Response>, TransportError> {
        self.acquire(Mode::Configuration).await?;

        let mut responses = Vec::with_capacity(commands.len());
        for cmd in commands {
            responses.push(self.send_command(cmd).await?);
        }

        self.acquire(Mode::Privileged).await?;
        Ok(responses)
    }

    /// Everything the device printed during this session.
    pub fn transcript(&self) -> String {
        let mut out = self.transcript.clone();
        out.push_str(&self.shell.pending());
        out
    }

    /// Close the shell and disconnect.
    pub async fn close(self) -> Result<(), TransportError> {
        self.shell.close().await
    }

    async fn escalate(&mut self, current: Mode) -> Result<(), TransportError> {
        let target = current.above().unwrap_or(current);
        match current {
            Mode::Exec => {
                let command = self.platform.enable_command.clone();
                self.shell.send_line(&command).await?;

                let prompt = self.prompt_pattern.clone();
                let password = self.platform.enable_password_prompt.clone();
                let (data, matched) = self.read_until(&[&prompt, &password]).await?;

                let data = if matched == 1 {
                    debug!("{}: sending enable secret", self.platform.name);
                    let secret = self.enable_secret.expose_secret().to_string();
                    self.shell.send_line(&secret).await?;
                    self.read_until(&[&prompt]).await?.0
                } else {
                    data
                };
                self.expect_mode(target, &data)
            }
            Mode::Privileged => {
                let command = self.platform.config_command.clone();
                self.transition(&command, target).await
            }
            Mode::Configuration => Ok(()),
        }
    }

    async fn deescalate(&mut self, current: Mode) -> Result<(), TransportError> {
        let target = current.below().unwrap_or(current);
        let command = match current {
            Mode::Configuration => self.platform.config_exit_command.clone(),
            Mode::Privileged => self.platform.disable_command.clone(),
            Mode::Exec => return Ok(()),
        };
        self.transition(&command, target).await
    }

    async fn transition(&mut self, command: &str, target: Mode) -> Result<(), TransportError> {
        self.shell.send_line(command).await?;
        let pattern = self.prompt_pattern.clone();
        let (data, _) = self.read_until(&[&pattern]).await?;
        self.expect_mode(target, &data)
    }

    fn expect_mode(&mut self, target: Mode, data: &[u8]) -> Result<(), TransportError> {
        let prompt = last_line(data);
        self.mode = self.platform.mode_from_prompt(&prompt);
        if self.mode == Some(target) {
            debug!("{}: now in {} mode", self.platform.name, target);
            Ok(())
        } else {
            Err(TransportError::ModeAcquisitionFailed { target, prompt })
        }
    }

    async fn read_until(&mut self, patterns: &[&Regex]) -> Result<(Vec<u8>, usize), TransportError> {
        let (data, index) = self.shell.read_until(patterns, self.timeout).await?;
        self.transcript.push_str(&String::from_utf8_lossy(&data));
        Ok((data, index))
    }
}

/// The trailing line of `data`, trimmed.
fn last_line(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    text.rsplit('\n').next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::vendors::cisco_ios;
    use crate::testing::ScriptedShell;

    async fn ready(shell: ScriptedShell) -> DeviceSession<ScriptedShell> {
        let mut session = DeviceSession::new(
            shell,
            cisco_ios::platform(),
            SecretString::from("cisco123".to_string()),
            Duration::from_secs(1),
        );
        session.prepare().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_acquire_steps_up_and_down() {
        let shell = ScriptedShell::exec();
        let log = shell.log();
        let mut session = ready(shell).await;

        session.acquire(Mode::Configuration).await.unwrap();
        assert_eq!(session.mode(), Some(Mode::Configuration));

        session.acquire(Mode::Exec).await.unwrap();
        assert_eq!(session.mode(), Some(Mode::Exec));

        assert_eq!(
            log.lines()[2..],
            ["enable", "cisco123", "configure terminal", "end", "disable"]
        );
    }

    #[tokio::test]
    async fn test_acquire_current_mode_sends_nothing() {
        let shell = ScriptedShell::privileged();
        let log = shell.log();
        let mut session = ready(shell).await;

        session.acquire(Mode::Privileged).await.unwrap();
        assert_eq!(log.lines(), ["terminal length 0", "terminal width 511"]);
    }

    #[tokio::test]
    async fn test_send_command_flags_rejection() {
        let mut session = ready(ScriptedShell::privileged()).await;

        let response = session.send_command("shwo version").await.unwrap();
        assert!(!response.is_success());
        assert_eq!(response.failure_message.as_deref(), Some("% Invalid input detected"));
        assert_eq!(response.prompt, "R1#");
        assert!(session.transcript().contains("shwo version"));
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line(b"enable\r\nPassword: "), "Password:");
        assert_eq!(last_line(b"\r\nR1(config)#"), "R1(config)#");
        assert_eq!(last_line(b"R1>"), "R1>");
    }
}
