//! Protocol bridge: the same tools behind the MCP call envelope.
//!
//! Differences from direct dispatch:
//!
//! - arguments are checked against the tool's descriptor before anything
//!   runs (missing required parameters, values outside an enumeration,
//!   wrong primitive types)
//! - `reset_puzzle` is available
//! - nothing escapes. Unknown tools, bad arguments, handler errors and
//!   handler panics all come back as an envelope with `isError` set, and a
//!   failed execution leaves the puzzle exactly as it was
//!
//! A move the rules refuse is not a failure here. It is a normal result
//! whose payload says `"status": "error"`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ferryproto::{CallToolResult, Tool};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info_span, warn};

use crate::registry::ToolRegistry;
use crate::schema::{ParamType, ToolDescriptor};
use crate::tools::{self, DynTool, ToolResult};

/// A call the bridge refused or could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Parameter '{parameter}' is required")]
    MissingParameter { parameter: String },

    #[error("Invalid {parameter} '{value}'. Must be one of: {allowed}")]
    InvalidValue {
        parameter: String,
        value: String,
        allowed: String,
    },

    #[error("Parameter '{parameter}' must be of type {expected}")]
    WrongType {
        parameter: String,
        expected: ParamType,
    },

    #[error("Error executing tool '{tool}': {message}")]
    Execution { tool: String, message: String },
}

impl BridgeError {
    /// True for failures caught before the tool ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BridgeError::MissingParameter { .. }
                | BridgeError::InvalidValue { .. }
                | BridgeError::WrongType { .. }
        )
    }

    /// Text placed in the error envelope.
    pub fn envelope_text(&self) -> String {
        match self {
            BridgeError::Execution { .. } => self.to_string(),
            _ => format!("Error: {}", self),
        }
    }
}

pub struct ProtocolBridge {
    registry: ToolRegistry,
    lifecycle: Vec<Box<dyn DynTool>>,
    catalog: Vec<ToolDescriptor>,
}

impl ProtocolBridge {
    /// Bridge over the default tools and a fresh puzzle.
    pub fn new() -> Self {
        Self::with_registry(ToolRegistry::with_default_tools())
    }

    /// Bridge over an existing registry, adding `reset_puzzle`.
    ///
    /// The tool catalog is computed here, once, and never changes.
    pub fn with_registry(registry: ToolRegistry) -> Self {
        let lifecycle: Vec<Box<dyn DynTool>> = tools::lifecycle_tools()
            .into_iter()
            .filter(|tool| {
                let shadowed = registry.contains(tool.name());
                if shadowed {
                    warn!(tool = tool.name(), "registry already provides this tool");
                }
                !shadowed
            })
            .collect();

        let catalog = registry
            .descriptors()
            .into_iter()
            .chain(lifecycle.iter().map(|tool| tool.descriptor()))
            .collect();

        Self {
            registry,
            lifecycle,
            catalog,
        }
    }

    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// The catalog as `tools/list` entries.
    pub fn list_wire_tools(&self) -> Vec<Tool> {
        self.catalog.iter().map(ToolDescriptor::to_wire_tool).collect()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Call a tool and wrap the outcome. Never panics, never returns an error.
    pub fn call_tool(&mut self, name: &str, arguments: Option<Map<String, Value>>) -> CallToolResult {
        let span = info_span!("tool.call", tool = %name);
        let _guard = span.enter();

        match self.try_call(name, arguments.unwrap_or_default()) {
            Ok(text) => {
                debug!("tool call succeeded");
                CallToolResult::text(text)
            }
            Err(e) => {
                warn!(error = %e, validation = e.is_validation(), "tool call failed");
                CallToolResult::error(e.envelope_text())
            }
        }
    }

    /// The checks and execution behind [`call_tool`](Self::call_tool), with
    /// the failure left typed.
    pub fn try_call(&mut self, name: &str, arguments: Map<String, Value>) -> Result<String, BridgeError> {
        let descriptor = self
            .catalog
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;
        let arguments = validate_arguments(descriptor, arguments)?;

        let snapshot = self.registry.environment().clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execute(name, Value::Object(arguments))
        }));

        let text = match outcome {
            Ok(Ok(payload)) => payload.to_text().map_err(|e| e.to_string()),
            Ok(Err(e)) => {
                debug!(code = e.code(), "handler returned an error");
                Err(e.to_string())
            }
            Err(panic) => Err(panic_message(panic.as_ref())),
        };

        text.map_err(|message| {
            *self.registry.environment_mut() = snapshot;
            BridgeError::Execution {
                tool: name.to_string(),
                message,
            }
        })
    }

    fn execute(&mut self, name: &str, arguments: Value) -> ToolResult {
        if let Some(tool) = self.lifecycle.iter().find(|t| t.name() == name) {
            return tool.call(self.registry.environment_mut(), arguments);
        }
        self.registry.dispatch(name, arguments)
    }
}

impl Default for ProtocolBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `arguments` against `descriptor` and canonicalise enumerated values.
///
/// Enumerations match ignoring ASCII case; the declared spelling is what the
/// handler receives. Arguments the descriptor does not mention pass through.
pub fn validate_arguments(
    descriptor: &ToolDescriptor,
    mut arguments: Map<String, Value>,
) -> Result<Map<String, Value>, BridgeError> {
    for param in &descriptor.parameters {
        let value = match arguments.get(&param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(BridgeError::MissingParameter {
                    parameter: param.name.clone(),
                });
            }
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        if let Some(allowed) = &param.enumerated_values {
            let canonical = value
                .as_str()
                .and_then(|s| param.canonical_value(s))
                .ok_or_else(|| BridgeError::InvalidValue {
                    parameter: param.name.clone(),
                    value: value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
                    allowed: allowed.join(", "),
                })?
                .to_string();
            arguments.insert(param.name.clone(), Value::String(canonical));
        } else if !param.inferred_type.matches(value) {
            return Err(BridgeError::WrongType {
                parameter: param.name.clone(),
                expected: param.inferred_type,
            });
        }
    }

    Ok(arguments)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
