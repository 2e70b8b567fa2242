//! Tool definitions and dispatch.
//!
//! Each tool is described by a JSON schema (see [`tool_definitions`]) and
//! handled by [`ToolDispatcher::call`], which maps arguments onto an
//! orchestrator operation and its result onto MCP content blocks.
//!
//! Tools:
//! - `show_ip_int_brief`: raw interface summary of a device
//! - `set_interface_ip`: assign an IPv4 address, with save / dry-run
//! - `list_devices`: inventory listing without credentials

use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::{Error, ValidationError};
use crate::executor::SessionExecutor;
use crate::orchestrator::{Orchestrator, SetInterfaceIp};

/// JSON schemas of every tool.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "show_ip_int_brief",
            "description": "Run 'show ip interface brief' on a device and return the raw output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "device": {
                        "type": "string",
                        "description": "Device name from the inventory."
                    }
                },
                "required": ["device"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "set_interface_ip",
            "description": "Configure an IPv4 address on an interface. Optionally bring it up (no shutdown), save the running config, or only preview the commands (dry run). Returns the applied commands, device output and a 'show ip interface brief' snapshot taken afterwards.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "device": {
                        "type": "string",
                        "description": "Device name from the inventory."
                    },
                    "interface": {
                        "type": "string",
                        "description": "Interface name, e.g. GigabitEthernet0/1."
                    },
                    "ip": {
                        "type": "string",
                        "description": "IPv4 address, dotted quad."
                    },
                    "mask": {
                        "type": "string",
                        "description": "Subnet mask, dotted quad."
                    },
                    "no_shutdown": {
                        "type": "boolean",
                        "description": "Also send 'no shutdown'. Default true.",
                        "default": true
                    },
                    "save": {
                        "type": "boolean",
                        "description": "Persist the running configuration afterwards. Default false.",
                        "default": false
                    },
                    "dry_run": {
                        "type": "boolean",
                        "description": "Return the commands without contacting the device. Default false.",
                        "default": false
                    }
                },
                "required": ["device", "interface", "ip", "mask"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "list_devices",
            "description": "List the devices in the inventory (name, device type, host, port).",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }
        }),
    ]
}

/// Result of a tool call, ready to be wrapped into a JSON-RPC response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// MCP content blocks (a single `{"type":"text","text":"..."}` entry).
    pub content: Vec<Value>,
    /// Whether the tool call failed (maps to `isError`).
    pub is_error: bool,
}

impl ToolResult {
    fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![json!({ "type": "text", "text": text.into() })],
            is_error: false,
        }
    }

    fn json(value: &impl serde::Serialize) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::failure(json!({ "error": "SerializationError", "message": e.to_string() })),
        }
    }

    fn error(err: &Error) -> Self {
        let mut body = json!({
            "error": err.kind(),
            "message": err.to_string(),
        });
        if let Some(partial) = err.partial_output() {
            body["partial_output"] = json!(partial);
        }
        if let Error::Transport {
            verification,
            verification_error,
            ..
        } = err
        {
            if let Some(verification) = verification {
                body["verification"] = json!(verification);
            }
            if let Some(stage) = verification_error {
                body["verification_error"] = json!(stage);
            }
        }
        Self::failure(body)
    }

    fn failure(body: Value) -> Self {
        let text = serde_json::to_string_pretty(&body).unwrap_or_default();
        Self {
            content: vec![json!({ "type": "text", "text": text })],
            is_error: true,
        }
    }

    /// Text of the first content block.
    pub fn text_content(&self) -> &str {
        self.content
            .first()
            .and_then(|c| c["text"].as_str())
            .unwrap_or_default()
    }

    /// MCP `tools/call` result object.
    pub fn to_value(&self) -> Value {
        json!({ "content": self.content, "isError": self.is_error })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceArgs {
    device: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

/// Routes tool calls to orchestrator operations.
pub struct ToolDispatcher<E> {
    orchestrator: Orchestrator<E>,
}

impl<E: SessionExecutor> ToolDispatcher<E> {
    /// Create a dispatcher.
    pub fn new(orchestrator: Orchestrator<E>) -> Self {
        Self { orchestrator }
    }

    /// Run tool `name` with JSON `args`.
    pub async fn call(&self, name: &str, args: &Value) -> ToolResult {
        debug!("tool call {} {}", name, args);
        let result = match name {
            "show_ip_int_brief" => self.show_ip_int_brief(args).await,
            "set_interface_ip" => self.set_interface_ip(args).await,
            "list_devices" => self.list_devices(args),
            _ => Err(ValidationError::UnknownTool(name.to_string()).into()),
        };

        result.unwrap_or_else(|err| ToolResult::error(&err))
    }

    async fn show_ip_int_brief(&self, args: &Value) -> Result<ToolResult, Error> {
        let args: DeviceArgs = parse_args("show_ip_int_brief", args)?;
        let output = self.orchestrator.show_ip_int_brief(&args.device).await?;
        Ok(ToolResult::text(output))
    }

    async fn set_interface_ip(&self, args: &Value) -> Result<ToolResult, Error> {
        let request: SetInterfaceIp = parse_args("set_interface_ip", args)?;
        let outcome = self.orchestrator.set_interface_ip(&request).await?;
        Ok(ToolResult::json(&outcome))
    }

    fn list_devices(&self, args: &Value) -> Result<ToolResult, Error> {
        let _: NoArgs = parse_args("list_devices", args)?;
        Ok(ToolResult::json(&self.orchestrator.list_devices()))
    }
}

/// Deserialize tool arguments; a missing `arguments` object counts as `{}`.
fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, Error> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(|e| {
        ValidationError::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
