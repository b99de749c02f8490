//! ferryproto - wire types for the ferryman tool server
//!
//! The subset of MCP that a tools-only stdio server needs:
//!
//! - `jsonrpc` - JSON-RPC 2.0 requests, responses, and error responses
//! - `error` - error objects with the standard JSON-RPC codes
//! - `protocol` - the `initialize` handshake
//! - `tool` - tool listings and the `tools/call` envelope
//! - `content` - content blocks carried by the envelope
//!
//! Tool failures never travel as JSON-RPC errors. They are ordinary
//! `CallToolResult`s with `isError` set, which is the only place the
//! error/success distinction shows up on the wire.

pub mod content;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod tool;

pub use content::Content;
pub use error::ErrorData;
pub use jsonrpc::{JsonRpcErrorResponse, JsonRpcMessage, JsonRpcResponse, JsonRpcVersion, RequestId};
pub use protocol::{
    negotiate_protocol_version, Implementation, InitializeParams, InitializeResult,
    ServerCapabilities, ToolsCapability, PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
pub use tool::{CallToolParams, CallToolResult, ListToolsResult, Tool, ToolSchema};
