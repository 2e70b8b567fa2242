//! Platform definition for vendor-specific CLI behavior.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::mode::{Mode, ModePrompt};

/// Platform definition containing everything a session needs to drive
/// one family of devices.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Device type tag as used in the inventory (e.g. "cisco_ios").
    pub name: String,

    /// Prompt patterns per mode, checked in insertion order.
    pub prompts: IndexMap<Mode, ModePrompt>,

    /// Command to go from exec to privileged.
    pub enable_command: String,

    /// Pattern of the enable password prompt.
    pub enable_password_prompt: Regex,

    /// Command to go from privileged back to exec.
    pub disable_command: String,

    /// Command to enter configuration mode.
    pub config_command: String,

    /// Command to leave configuration mode (from any sub-mode).
    pub config_exit_command: String,

    /// Patterns that indicate the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands to run right after the session opens.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform with IOS-style defaults and no prompts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompts: IndexMap::new(),
            enable_command: "enable".to_string(),
            enable_password_prompt: Regex::new(r"(?mi)^password:\s?$")
                .expect("static enable prompt pattern"),
            disable_command: "disable".to_string(),
            config_command: "configure terminal".to_string(),
            config_exit_command: "end".to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Add a mode prompt.
    pub fn with_prompt(mut self, prompt: ModePrompt) -> Self {
        self.prompts.insert(prompt.mode, prompt);
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Rename the platform, keeping every other setting.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Determine the mode from a prompt line.
    pub fn mode_from_prompt(&self, prompt: &str) -> Option<Mode> {
        self.prompts
            .values()
            .find(|p| p.matches(prompt))
            .map(|p| p.mode)
    }

    /// Regex that matches the prompt of any mode.
    pub fn any_prompt_pattern(&self) -> Regex {
        let combined = self
            .prompts
            .values()
            .map(|p| format!("(?:{})", p.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");

        Regex::new(&combined).unwrap_or_else(|_| {
            Regex::new(r"[>#]\s?$").expect("static fallback prompt pattern")
        })
    }

    /// First failure pattern contained in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}
