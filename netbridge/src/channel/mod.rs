//! Channel layer: the device shell and its output buffer.
//!
//! Handles prompt detection on the trailing output line and ANSI
//! stripping of everything the device prints.

use std::future::Future;
use std::time::Duration;

use regex::bytes::Regex;

use crate::error::TransportError;

mod buffer;
mod shell;

pub use buffer::PatternBuffer;
pub use shell::ShellChannel;

/// Line-oriented access to a device CLI.
///
/// [`ShellChannel`] is the SSH implementation; sessions are generic over
/// this trait so the CLI dialogue can run against any peer.
pub trait Shell: Send {
    /// Send one line of input.
    fn send_line(&mut self, line: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Read until the trailing line matches one of `patterns`.
    ///
    /// Returns everything read (the matched line included) and the index
    /// of the pattern that matched.
    fn read_until(
        &mut self,
        patterns: &[&Regex],
        timeout: Duration,
    ) -> impl Future<Output = Result<(Vec<u8>, usize), TransportError>> + Send;

    /// Output read since the last successful match.
    fn pending(&self) -> String;

    /// Close the shell and the connection under it.
    fn close(self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
