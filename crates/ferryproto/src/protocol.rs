//! MCP Protocol Types
//!
//! The `initialize` handshake. Only the tools capability is ever offered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this server prefers.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Every version the server can answer in, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &[PROTOCOL_VERSION, "2025-03-26", "2024-11-05"];

/// Pick the version to answer `initialize` with.
///
/// The client's version when we support it, otherwise our own; the client
/// decides whether it can live with that.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(PROTOCOL_VERSION)
}

/// Server or client implementation info.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Implementation {
    /// Programmatic name of the implementation.
    pub name: String,

    /// Version string.
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Initialize request params from client.
///
/// Everything is optional so that a sloppy client still gets a handshake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version the client supports.
    #[serde(default)]
    pub protocol_version: Option<String>,

    /// Client capabilities, kept opaque.
    #[serde(default)]
    pub capabilities: Option<Value>,

    /// Client implementation info.
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

/// Initialize result from server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server wants to use.
    pub protocol_version: String,

    /// Server capabilities.
    pub capabilities: ServerCapabilities,

    /// Server implementation info.
    pub server_info: Implementation,

    /// Optional instructions for the LLM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(server_info: Implementation, capabilities: ServerCapabilities) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities,
            server_info,
            instructions: None,
        }
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Set instructions for the LLM. Empty instructions are left out.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = (!instructions.is_empty()).then_some(instructions);
        self
    }
}

/// Server capabilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Server offers tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

impl ServerCapabilities {
    /// Create capabilities with tools enabled.
    pub fn with_tools() -> Self {
        Self {
            tools: Some(ToolsCapability::default()),
        }
    }
}

/// Tools capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// The tool list never changes during a session, so this stays false.
    pub list_changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_result_shape() {
        let result = InitializeResult::new(
            Implementation::new("ferryman", "0.1.0"),
            ServerCapabilities::with_tools(),
        )
        .with_instructions("Get everything across.");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(json["serverInfo"]["name"], "ferryman");
        assert_eq!(json["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(json["instructions"], "Get everything across.");
    }

    #[test]
    fn test_empty_instructions_omitted() {
        let result = InitializeResult::new(
            Implementation::new("ferryman", "0.1.0"),
            ServerCapabilities::with_tools(),
        )
        .with_instructions("");

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("instructions").is_none());
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(negotiate_protocol_version(Some(PROTOCOL_VERSION)), PROTOCOL_VERSION);
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), PROTOCOL_VERSION);
        assert_eq!(negotiate_protocol_version(None), PROTOCOL_VERSION);
    }

    #[test]
    fn test_lenient_initialize_params() {
        let params: InitializeParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.client_info.is_none());

        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test", "version": "1.0" }
        }))
        .unwrap();
        assert_eq!(params.protocol_version.as_deref(), Some("2024-11-05"));
        assert_eq!(params.client_info.unwrap().name, "test");
    }
}
