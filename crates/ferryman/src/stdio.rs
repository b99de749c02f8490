//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! One request per line in, one response per line out. Notifications get
//! no response. Logs must go to stderr; stdout belongs to the protocol.

use std::io::{self, BufRead, Write};

use ferryconf::ServerConfig;
use ferryproto::{
    negotiate_protocol_version, CallToolParams, ErrorData, Implementation, InitializeParams,
    InitializeResult, JsonRpcErrorResponse, JsonRpcMessage, JsonRpcResponse, ListToolsResult,
    RequestId, ServerCapabilities,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, info_span, warn};

use crate::bridge::ProtocolBridge;

pub struct McpServer {
    bridge: ProtocolBridge,
    info: Implementation,
    instructions: String,
}

impl McpServer {
    pub fn new(bridge: ProtocolBridge, info: Implementation, instructions: impl Into<String>) -> Self {
        Self {
            bridge,
            info,
            instructions: instructions.into(),
        }
    }

    /// Server over the default tools, named and instructed by `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            ProtocolBridge::new(),
            Implementation::new(config.name.clone(), env!("CARGO_PKG_VERSION")),
            config.instructions.clone(),
        )
    }

    pub fn bridge(&self) -> &ProtocolBridge {
        &self.bridge
    }

    /// Serve until `reader` hits EOF.
    ///
    /// A line that is not UTF-8 gets a parse error like any other malformed
    /// input; only I/O failures end the session.
    pub fn run<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> io::Result<()> {
        info!(server = %self.info.name, "serving tools on stdio");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line),
                Err(e) => {
                    warn!(error = %e, "input line is not UTF-8");
                    Some(encode(&JsonRpcErrorResponse::new(
                        None,
                        ErrorData::parse_error(format!("Parse error: {}", e)),
                    )))
                }
            };

            if let Some(response) = response {
                writeln!(writer, "{}", response)?;
                writer.flush()?;
            }
        }

        info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one line of input; returns the response line, if any.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable input line");
                return Some(encode(&JsonRpcErrorResponse::new(
                    None,
                    ErrorData::parse_error(format!("Parse error: {}", e)),
                )));
            }
        };

        // Salvage the id so the client can match the error to its request
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

        let message: JsonRpcMessage = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC message");
                return Some(encode(&JsonRpcErrorResponse::new(
                    id,
                    ErrorData::invalid_request(format!("Invalid request: {}", e)),
                )));
            }
        };

        self.handle_message(message)
    }

    /// Dispatch a parsed message; returns the response line, if any.
    pub fn handle_message(&mut self, message: JsonRpcMessage) -> Option<String> {
        let request_id = message
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let span = info_span!(
            "mcp.dispatch",
            rpc.method = %message.method,
            rpc.request_id = %request_id,
        );
        let _guard = span.enter();

        let result = self.dispatch(&message);

        let Some(id) = message.id else {
            if let Err(e) = result {
                debug!(error = %e, "ignoring failed notification");
            }
            return None;
        };

        Some(match result {
            Ok(value) => encode(&JsonRpcResponse::success(id, value)),
            Err(error) => {
                warn!(code = error.code, message = %error.message, "request failed");
                encode(&JsonRpcErrorResponse::new(Some(id), error))
            }
        })
    }

    fn dispatch(&mut self, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
        match message.method.as_str() {
            "initialize" => self.handle_initialize(message),
            "notifications/initialized" | "notifications/cancelled" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(message),
            _ => Err(ErrorData::method_not_found(&message.method)),
        }
    }

    fn handle_initialize(&self, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
        let params: InitializeParams = message
            .params
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ErrorData::invalid_params(format!("Invalid initialize params: {}", e)))?
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = %client.version, "client connected");
        }

        let version = negotiate_protocol_version(params.protocol_version.as_deref());
        if let Some(requested) = params.protocol_version.as_deref().filter(|r| *r != version) {
            warn!(requested, answered = version, "unsupported protocol version requested");
        }

        let result = InitializeResult::new(self.info.clone(), ServerCapabilities::with_tools())
            .with_protocol_version(version)
            .with_instructions(self.instructions.clone());

        to_value(&result)
    }

    fn handle_list_tools(&self) -> Result<Value, ErrorData> {
        to_value(&ListToolsResult {
            tools: self.bridge.list_wire_tools(),
        })
    }

    fn handle_call_tool(&mut self, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
        let params: CallToolParams = message
            .params
            .clone()
            .ok_or_else(|| ErrorData::invalid_params("Missing tools/call params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| ErrorData::invalid_params(format!("Invalid tools/call params: {}", e)))
            })?;

        let result = self.bridge.call_tool(&params.name, params.arguments);
        to_value(&result)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(value)
        .map_err(|e| ErrorData::internal_error(format!("Failed to serialize result: {}", e)))
}

fn encode<T: Serialize>(message: &T) -> String {
    serde_json::to_string(message).unwrap_or_else(|e| {
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {
                "code": ErrorData::INTERNAL_ERROR,
                "message": format!("Failed to encode response: {}", e),
            }
        })
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::from_config(&ServerConfig::default())
    }

    fn reply(server: &mut McpServer, line: &str) -> Value {
        let out = server.handle_line(line).expect("expected a response");
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn test_ping() {
        let mut server = server();
        let response = reply(&mut server, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#);
        assert_eq!(response["id"], "p");
        assert_eq!(response["result"], json!({}));
    }

    #[test]
    fn test_notification_gets_no_reply() {
        let mut server = server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
        // unknown notifications are dropped too
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/progress"}"#)
            .is_none());
    }

    #[test]
    fn test_invalid_request_keeps_id() {
        let mut server = server();
        let response = reply(&mut server, r#"{"jsonrpc":"2.0","id":3}"#);
        assert_eq!(response["id"], 3);
        assert_eq!(response["error"]["code"], ErrorData::INVALID_REQUEST);
    }

    #[test]
    fn test_call_without_params() {
        let mut server = server();
        let response = reply(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#);
        assert_eq!(response["error"]["code"], ErrorData::INVALID_PARAMS);
    }
}
