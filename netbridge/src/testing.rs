//! Test doubles shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use regex::bytes::Regex;

use crate::channel::{PatternBuffer, Shell};
use crate::commands::CommandSet;
use crate::error::{Error, Result, TransportError};
use crate::executor::SessionExecutor;
use crate::inventory::{DeviceDescriptor, DeviceRegistry};

/// Fixture inventory with one IOS router.
pub fn inventory() -> DeviceRegistry {
    DeviceRegistry::from_yaml_str(
        r#"
devices:
  r1:
    device_type: cisco_ios
    host: 192.0.2.10
    username: cisco
    password: cisco123
"#,
    )
    .unwrap()
}

/// One executor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Show { device: String, command: String },
    Config { device: String, commands: Vec<String> },
}

/// Executor that records calls and answers from a script.
///
/// Show commands answer `output of <command>`, config sets answer
/// `config ok`. Failing commands return a transport error whose partial
/// output is `partial <command>` (`partial config` for config sets).
#[derive(Debug, Default)]
pub struct StubExecutor {
    calls: Mutex<Vec<Call>>,
    failing_shows: HashSet<String>,
    fail_config: bool,
}

impl StubExecutor {
    /// Fail every `run_show` of `command`.
    pub fn failing_show(mut self, command: &str) -> Self {
        self.failing_shows.insert(command.to_string());
        self
    }

    /// Fail every `run_config`.
    pub fn failing_config(mut self) -> Self {
        self.fail_config = true;
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SessionExecutor for StubExecutor {
    async fn run_show(&self, device: &DeviceDescriptor, command: &str) -> Result<String> {
        self.record(Call::Show {
            device: device.name.clone(),
            command: command.to_string(),
        });

        if self.failing_shows.contains(command) {
            return Err(Error::transport(
                TransportError::Disconnected,
                format!("partial {command}"),
            ));
        }
        Ok(format!("output of {command}"))
    }

    async fn run_config(&self, device: &DeviceDescriptor, commands: &CommandSet) -> Result<String> {
        self.record(Call::Config {
            device: device.name.clone(),
            commands: commands.to_vec(),
        });

        if self.fail_config {
            return Err(Error::transport(TransportError::Disconnected, "partial config"));
        }
        Ok("config ok".to_string())
    }
}

/// Output of `show ip interface brief` on the scripted router.
pub const INTERFACE_BRIEF: &str = "Interface              IP-Address      OK? Method Status                Protocol\r\n\
GigabitEthernet0/0     192.0.2.10      YES manual up                    up\r\n\
GigabitEthernet0/1     unassigned      YES unset  administratively down down\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliMode {
    Exec,
    Privileged,
    Config,
    ConfigInterface,
}

/// What a [`ScriptedShell`] was sent, readable after the shell is gone.
#[derive(Debug, Clone, Default)]
pub struct ShellLog {
    lines: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl ShellLog {
    /// Lines sent, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Whether the shell was closed.
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// In-memory IOS router named `R1` answering line by line.
///
/// Knows `enable` (with a password prompt), `disable`, `configure
/// terminal`, `interface`, `ip address`, `no shutdown`, `exit`, `end`,
/// `write memory`, `show ip interface brief` and the terminal settings.
/// Anything else gets `% Invalid input detected`. A read that finds no
/// prompt fails at once: with `Disconnected` after a drop, with `Timeout`
/// otherwise.
pub struct ScriptedShell {
    mode: CliMode,
    enable_secret: String,
    awaiting_secret: bool,
    drop_on: Option<String>,
    dropped: bool,
    buffer: PatternBuffer,
    log: ShellLog,
}

impl ScriptedShell {
    /// Router in exec mode (`R1>`), enable secret `cisco123`.
    pub fn exec() -> Self {
        Self::starting_in(CliMode::Exec)
    }

    /// Router already in privileged mode (`R1#`).
    pub fn privileged() -> Self {
        Self::starting_in(CliMode::Privileged)
    }

    /// Peer that prints `banner` and never shows a prompt.
    pub fn silent(banner: &str) -> Self {
        let mut shell = Self::starting_in(CliMode::Exec);
        shell.buffer = PatternBuffer::new(1000);
        shell.buffer.extend(banner.as_bytes());
        shell
    }

    fn starting_in(mode: CliMode) -> Self {
        let mut shell = Self {
            mode,
            enable_secret: "cisco123".to_string(),
            awaiting_secret: false,
            drop_on: None,
            dropped: false,
            buffer: PatternBuffer::new(1000),
            log: ShellLog::default(),
        };
        let prompt = shell.prompt();
        shell.buffer.extend(format!("\r\n{prompt}").as_bytes());
        shell
    }

    /// Use a different enable secret.
    pub fn with_enable_secret(mut self, secret: &str) -> Self {
        self.enable_secret = secret.to_string();
        self
    }

    /// Drop the connection right after echoing `line`.
    pub fn dropping_on(mut self, line: &str) -> Self {
        self.drop_on = Some(line.to_string());
        self
    }

    /// Shared handle on what this shell receives.
    pub fn log(&self) -> ShellLog {
        self.log.clone()
    }

    fn prompt(&self) -> &'static str {
        match self.mode {
            CliMode::Exec => "R1>",
            CliMode::Privileged => "R1#",
            CliMode::Config => "R1(config)#",
            CliMode::ConfigInterface => "R1(config-if)#",
        }
    }

    /// Output for `line` (after the echo), updating the mode.
    fn respond(&mut self, line: &str) -> &'static str {
        use CliMode::*;

        if self.awaiting_secret {
            self.awaiting_secret = false;
            if line == self.enable_secret {
                self.mode = Privileged;
                return "";
            }
            return "% Access denied\r\n\r\n";
        }

        match (self.mode, line) {
            (Exec | Privileged, "terminal length 0" | "terminal width 511") => "",
            (Exec | Privileged, "show ip interface brief") => INTERFACE_BRIEF,
            (Privileged, "disable") => {
                self.mode = Exec;
                ""
            }
            (Privileged, "configure terminal") => {
                self.mode = Config;
                "Enter configuration commands, one per line.  End with CNTL/Z.\r\n"
            }
            (Privileged, "write memory") => "Building configuration...\r\n[OK]\r\n",
            (Config | ConfigInterface, l) if l.starts_with("interface ") => {
                self.mode = ConfigInterface;
                ""
            }
            (ConfigInterface, l) if l.starts_with("ip address ") || l == "no shutdown" => "",
            (ConfigInterface, "exit") => {
                self.mode = Config;
                ""
            }
            (Config, "exit") | (Config | ConfigInterface, "end") => {
                self.mode = Privileged;
                ""
            }
            _ => "% Invalid input detected at '^' marker.\r\n\r\n",
        }
    }
}

impl Shell for ScriptedShell {
    async fn send_line(&mut self, line: &str) -> std::result::Result<(), TransportError> {
        if self.dropped {
            return Err(TransportError::Disconnected);
        }
        self.log.lines.lock().unwrap().push(line.to_string());

        if self.drop_on.as_deref() == Some(line) {
            self.buffer.extend(format!("{line}\r\n").as_bytes());
            self.dropped = true;
            return Ok(());
        }

        // secrets are not echoed
        let echo = if self.awaiting_secret { String::new() } else { line.to_string() };

        if self.mode == CliMode::Exec && line == "enable" && !self.awaiting_secret {
            self.awaiting_secret = true;
            self.buffer.extend(format!("{echo}\r\nPassword: ").as_bytes());
            return Ok(());
        }

        let body = self.respond(line);
        let prompt = self.prompt();
        self.buffer.extend(format!("{echo}\r\n{body}{prompt}").as_bytes());
        Ok(())
    }

    async fn read_until(
        &mut self,
        patterns: &[&Regex],
        timeout: Duration,
    ) -> std::result::Result<(Vec<u8>, usize), TransportError> {
        if let Some(index) = self.buffer.match_last_line(patterns) {
            return Ok((self.buffer.take(), index));
        }
        if self.dropped {
            return Err(TransportError::Disconnected);
        }
        Err(TransportError::Timeout(timeout))
    }

    fn pending(&self) -> String {
        self.buffer.as_str_lossy().into_owned()
    }

    async fn close(self) -> std::result::Result<(), TransportError> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
