//! Response type for command execution results.

use std::time::Duration;

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure string found in the output, if the device rejected the command.
    pub failure_message: Option<String>,
}

impl Response {
    /// Build a response from the raw bytes read up to and including the prompt.
    pub fn from_raw(command: &str, raw: &[u8], elapsed: Duration) -> Self {
        let raw_result = String::from_utf8_lossy(raw).into_owned();
        let (result, prompt) = normalize(&raw_result, command);
        Self {
            command: command.to_string(),
            result,
            raw_result,
            prompt,
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Split raw output into (output, prompt): drop the echoed command line
/// and the trailing prompt line.
fn normalize(raw: &str, command: &str) -> (String, String) {
    let (body, prompt) = match raw.rfind('\n') {
        Some(pos) => (&raw[..pos], raw[pos + 1..].trim()),
        None => ("", raw.trim()),
    };

    let body = body.trim_start_matches(['\r', '\n']);
    let body = match body.split_once('\n') {
        Some((first, rest)) if !command.is_empty() && first.trim_end().ends_with(command) => rest,
        None if !command.is_empty() && body.trim_end().ends_with(command) => "",
        _ => body,
    };

    let result = body.replace("\r\n", "\n").trim_end_matches(['\r', '\n']).to_string();
    (result, prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_echo_and_prompt() {
        let raw = b"show ip interface brief\r\nInterface  IP-Address\r\nGi0/0      10.0.0.1\r\nR1#";
        let response = Response::from_raw("show ip interface brief", raw, Duration::ZERO);

        assert_eq!(response.result, "Interface  IP-Address\nGi0/0      10.0.0.1");
        assert_eq!(response.prompt, "R1#");
        assert!(response.is_success());
    }

    #[test]
    fn test_normalize_echo_after_prompt_redraw() {
        // some devices repeat the prompt in front of the echo
        let raw = b"R1(config)#interface Gi0/1\r\nR1(config-if)#";
        let response = Response::from_raw("interface Gi0/1", raw, Duration::ZERO);

        assert_eq!(response.result, "");
        assert_eq!(response.prompt, "R1(config-if)#");
    }

    #[test]
    fn test_normalize_keeps_unechoed_output() {
        let raw = b"\r\nBuilding configuration...\r\n[OK]\r\nR1#";
        let response = Response::from_raw("write memory", raw, Duration::ZERO);

        assert_eq!(response.result, "Building configuration...\n[OK]");
    }

    #[test]
    fn test_with_failure() {
        let response = Response::from_raw("bogus", b"bogus\r\n% Invalid input\r\nR1#", Duration::ZERO)
            .with_failure("% Invalid input");
        assert!(!response.is_success());
        assert_eq!(response.to_string(), "% Invalid input");
    }
}
