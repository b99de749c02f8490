//! ferryman - the river-crossing puzzle as a set of callable tools
//!
//! The farmer must ferry a wolf, a goat and a cabbage across a river in a
//! boat that holds one passenger. Left alone, the wolf eats the goat and the
//! goat eats the cabbage.
//!
//! Layers, bottom up:
//! - [`puzzle`] - the state machine and its rules
//! - [`schema`] - tool descriptors reflected from parameter types
//! - [`tools`] - the tools themselves
//! - [`registry`] - name lookup and direct dispatch, owning the live puzzle
//! - [`bridge`] - the MCP call envelope, validation and `reset_puzzle`
//! - [`stdio`] - JSON-RPC over stdin/stdout

pub mod bridge;
pub mod puzzle;
pub mod registry;
pub mod schema;
pub mod stdio;
pub mod tools;

pub use bridge::{BridgeError, ProtocolBridge};
pub use puzzle::{Bank, CrossingState, Item, MoveError, Passenger, RiverCrossing};
pub use registry::{DispatchError, ToolRegistry};
pub use schema::{ParamType, ParameterSpec, ToolDescriptor};
pub use stdio::McpServer;
pub use tools::{DynTool, MoveStatus, ToolHandler, ToolPayload, ToolResult};
