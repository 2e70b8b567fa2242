//! JSON-RPC 2.0 tool server.
//!
//! Speaks the MCP tool subset (`initialize`, `tools/list`, `tools/call`,
//! `ping`) with one JSON message per line over TCP. Each connection runs
//! in its own task; requests on one connection are answered in order.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::executor::SessionExecutor;
use crate::tools::{ToolDispatcher, tool_definitions};

/// Protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Deserialize)]
struct Request {
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Accept connections forever, one task per client.
pub async fn serve<E>(listener: TcpListener, dispatcher: Arc<ToolDispatcher<E>>) -> std::io::Result<()>
where
    E: SessionExecutor + 'static,
{
    info!("listening on {}", listener.local_addr()?);
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("client connected: {}", peer);
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, dispatcher).await {
                warn!("client {}: {}", peer, e);
            }
            debug!("client disconnected: {}", peer);
        });
    }
}

async fn handle_connection<E: SessionExecutor>(
    stream: TcpStream,
    dispatcher: Arc<ToolDispatcher<E>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_message(&dispatcher, &line).await {
            let mut out = response.to_string();
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

/// Handle one JSON-RPC message. Notifications produce no response.
pub async fn handle_message<E: SessionExecutor>(
    dispatcher: &ToolDispatcher<E>,
    line: &str,
) -> Option<Value> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return Some(error_response(Value::Null, PARSE_ERROR, &e.to_string())),
    };

    let request: Request = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return Some(error_response(Value::Null, INVALID_REQUEST, &e.to_string())),
    };

    if request.jsonrpc.as_deref() != Some("2.0") {
        let id = request.id.unwrap_or(Value::Null);
        return Some(error_response(id, INVALID_REQUEST, "jsonrpc must be \"2.0\""));
    }

    let Some(id) = request.id else {
        debug!("notification {}", request.method);
        return None;
    };

    let result = match request.method.as_str() {
        "initialize" => json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
        "ping" => json!({}),
        "tools/list" => json!({ "tools": tool_definitions() }),
        "tools/call" => {
            let params: CallParams = match serde_json::from_value(request.params) {
                Ok(params) => params,
                Err(e) => return Some(error_response(id, INVALID_PARAMS, &e.to_string())),
            };
            dispatcher.call(&params.name, &params.arguments).await.to_value()
        }
        other => {
            return Some(error_response(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {other}"),
            ));
        }
    };

    Some(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}
