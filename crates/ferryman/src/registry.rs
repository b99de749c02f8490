//! Name-keyed tool table and direct dispatch.
//!
//! The registry also owns the session: the one live [`RiverCrossing`] that
//! every registered tool runs against. Mutating it needs `&mut self`, so
//! two calls can never interleave.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::puzzle::RiverCrossing;
use crate::schema::ToolDescriptor;
use crate::tools::{self, DynTool, ToolHandler, ToolResult};

/// Why a dispatched call produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("{0}")]
    Internal(String),
}

impl DispatchError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::UnknownTool(_) => "tool_not_found",
            DispatchError::AlreadyRegistered(_) => "already_registered",
            DispatchError::InvalidArguments { .. } => "invalid_params",
            DispatchError::Internal(_) => "internal_error",
        }
    }
}

pub struct ToolRegistry {
    tools: Vec<Box<dyn DynTool>>,
    index: HashMap<&'static str, usize>,
    environment: RiverCrossing,
}

impl ToolRegistry {
    /// An empty registry around a fresh puzzle.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            environment: RiverCrossing::new(),
        }
    }

    /// `get_current_state`, `move_across_river` and `check_if_solved`.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        for tool in tools::direct_tools() {
            if let Err(e) = registry.register_boxed(tool) {
                warn!("skipping default tool: {}", e);
            }
        }
        registry
    }

    pub fn register<T: ToolHandler>(&mut self, tool: T) -> Result<(), DispatchError> {
        self.register_boxed(Box::new(tool))
    }

    pub fn register_boxed(&mut self, tool: Box<dyn DynTool>) -> Result<(), DispatchError> {
        let name = tool.name();
        if self.index.contains_key(name) {
            return Err(DispatchError::AlreadyRegistered(name.to_string()));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        debug!(tool = name, "registered");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors of every registered tool, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// Run `name` against the live puzzle and return its payload as is.
    ///
    /// No validation happens here beyond what the handler's own argument
    /// decoding does.
    pub fn dispatch(&mut self, name: &str, arguments: Value) -> ToolResult {
        let &slot = self
            .index
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        debug!(tool = name, "dispatch");
        self.tools[slot].call(&mut self.environment, arguments)
    }

    /// Run calls strictly in order; each one sees the effects of the last.
    pub fn dispatch_batch<I>(&mut self, calls: I) -> Vec<ToolResult>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        calls
            .into_iter()
            .map(|(name, arguments)| self.dispatch(&name, arguments))
            .collect()
    }

    pub fn environment(&self) -> &RiverCrossing {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut RiverCrossing {
        &mut self.environment
    }

    /// Start the session over with a fresh puzzle.
    pub fn reset_environment(&mut self) {
        self.environment = RiverCrossing::new();
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
