//! CLI mode definitions and prompt matching.

use std::fmt;

use regex::bytes::Regex;

/// CLI privilege context of a device session.
///
/// Modes are ordered: moving up means escalating (`enable`,
/// `configure terminal`), moving down means leaving (`end`, `disable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// User EXEC, `router>`.
    Exec,
    /// Privileged EXEC, `router#`.
    Privileged,
    /// Global or sub-mode configuration, `router(config-if)#`.
    Configuration,
}

impl Mode {
    /// The next mode up, if any.
    pub fn above(self) -> Option<Mode> {
        match self {
            Mode::Exec => Some(Mode::Privileged),
            Mode::Privileged => Some(Mode::Configuration),
            Mode::Configuration => None,
        }
    }

    /// The next mode down, if any.
    pub fn below(self) -> Option<Mode> {
        match self {
            Mode::Exec => None,
            Mode::Privileged => Some(Mode::Exec),
            Mode::Configuration => Some(Mode::Privileged),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Exec => "exec",
            Mode::Privileged => "privileged",
            Mode::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Prompt pattern identifying one mode.
#[derive(Debug, Clone)]
pub struct ModePrompt {
    /// Mode this prompt belongs to.
    pub mode: Mode,

    /// Regex matched against the last line of output.
    pub pattern: Regex,

    /// Strings that must NOT be in the prompt for this mode to match.
    /// `#` ends both privileged and config prompts, so privileged excludes `(config`.
    pub not_contains: Vec<String>,
}

impl ModePrompt {
    /// Create a mode prompt from a regex string.
    pub fn new(mode: Mode, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            mode,
            pattern: Regex::new(pattern)?,
            not_contains: vec![],
        })
    }

    /// Add a not_contains pattern.
    pub fn with_not_contains(mut self, pattern: impl Into<String>) -> Self {
        self.not_contains.push(pattern.into());
        self
    }

    /// Check if this mode matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc)) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}
