//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host key checking and the
//! interactive shell channel.

pub mod config;
mod ssh;

pub use config::{HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
