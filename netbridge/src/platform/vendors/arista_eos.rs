//! Arista EOS platform definition.
//!
//! EOS follows the IOS CLI closely; the prompt charset is wider and named
//! configuration sessions (`(config-s-name)#`) are not treated as plain
//! configuration mode.

use crate::platform::{Mode, ModePrompt, PlatformDefinition};

/// Device type tag of Arista EOS.
pub const PLATFORM_NAME: &str = "arista_eos";

/// Create the Arista EOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = ModePrompt::new(Mode::Exec, r"(?mi)^[\w.\-@()/: ]{1,63}>\s?$").unwrap();

    let privileged = ModePrompt::new(Mode::Privileged, r"(?mi)^[\w.\-@()/: ]{1,63}#\s?$")
        .unwrap()
        .with_not_contains("(config");

    let configuration = ModePrompt::new(
        Mode::Configuration,
        r"(?mi)^[\w.\-@()/: ]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$",
    )
    .unwrap()
    .with_not_contains("(config-s-");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_prompt(exec)
        .with_prompt(privileged)
        .with_prompt(configuration)
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Error")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Unavailable command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 32767")
        .with_terminal_size(32767, 24)
}
