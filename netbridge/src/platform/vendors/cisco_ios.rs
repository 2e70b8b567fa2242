//! Cisco IOS / IOS-XE platform definition.
//!
//! Prompt patterns are adapted from [scrapli](https://github.com/carlmontanari/scrapli).
//!
//! # Prompt Examples
//!
//! ```text
//! router>                       # exec
//! router#                       # privileged
//! router(config)#               # configuration
//! router(config-if)#            # configuration sub-mode (interface)
//! ```

use crate::platform::{Mode, ModePrompt, PlatformDefinition};

/// Device type tag of classic IOS.
pub const PLATFORM_NAME: &str = "cisco_ios";

/// Device type tag of IOS-XE, which shares the IOS CLI.
pub const XE_PLATFORM_NAME: &str = "cisco_xe";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = ModePrompt::new(Mode::Exec, r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privileged = ModePrompt::new(Mode::Privileged, r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_not_contains("(config");

    let configuration = ModePrompt::new(
        Mode::Configuration,
        r"(?mi)^[\w.\-@/:]{1,63}\([\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap();

    PlatformDefinition::new(PLATFORM_NAME)
        .with_prompt(exec)
        .with_prompt(privileged)
        .with_prompt(configuration)
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_terminal_size(511, 24)
}

/// Create the Cisco IOS-XE platform definition.
pub fn xe_platform() -> PlatformDefinition {
    platform().renamed(XE_PLATFORM_NAME)
}
