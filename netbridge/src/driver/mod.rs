//! Device session driving the vendor CLI.
//!
//! The driver layer sends commands, tracks the CLI mode from the prompt
//! and moves between exec, privileged and configuration modes.

pub(crate) mod response;
mod session;

pub use response::Response;
pub use session::DeviceSession;
