//! Interactive shell channel with prompt-driven reads.

use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::Shell;
use super::buffer::PatternBuffer;
use crate::error::TransportError;
use crate::transport::SshTransport;

/// Bytes from the end of the output that may hold the prompt line.
const SEARCH_DEPTH: usize = 1000;

/// A PTY shell on the device, owning the SSH connection it runs on.
///
/// Writes are line oriented; reads accumulate output until the trailing
/// line matches one of the caller's patterns. Output that arrived before
/// a timeout or disconnect stays available through [`Shell::pending`].
pub struct ShellChannel {
    transport: SshTransport,
    channel: Channel<Msg>,
    buffer: PatternBuffer,
}

impl ShellChannel {
    /// Wrap an open shell channel and its transport.
    pub fn new(transport: SshTransport, channel: Channel<Msg>) -> Self {
        Self {
            transport,
            channel,
            buffer: PatternBuffer::new(SEARCH_DEPTH),
        }
    }
}

impl Shell for ShellChannel {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        trace!("send: {:?}", line);
        let data = format!("{line}\n");
        self.channel.data(data.as_bytes()).await?;
        Ok(())
    }

    async fn read_until(
        &mut self,
        patterns: &[&Regex],
        timeout: Duration,
    ) -> Result<(Vec<u8>, usize), TransportError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(index) = self.buffer.match_last_line(patterns) {
                debug!("matched pattern {} after {} bytes", index, self.buffer.len());
                return Ok((self.buffer.take(), index));
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| TransportError::Timeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => self.buffer.extend(data),
                Some(ChannelMsg::ExtendedData { ref data, .. }) => self.buffer.extend(data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(TransportError::Disconnected);
                }
                Some(other) => trace!("ignoring channel message {:?}", other),
            }
        }
    }

    fn pending(&self) -> String {
        self.buffer.as_str_lossy().into_owned()
    }

    async fn close(self) -> Result<(), TransportError> {
        // the device may already have hung up; disconnect regardless
        if let Err(e) = self.channel.eof().await {
            debug!("shell eof: {}", e);
        }
        if let Err(e) = self.channel.close().await {
            debug!("shell close: {}", e);
        }
        self.transport.close().await
    }
}
