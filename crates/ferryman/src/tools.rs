//! The tools, and the trait every tool implements.
//!
//! A tool is a unit struct implementing [`ToolHandler`]: a name, a doc
//! string, a typed parameter struct and one `execute` method. The blanket
//! [`DynTool`] impl turns any handler into something the registry can store
//! next to handlers with other parameter types.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::puzzle::{Passenger, RiverCrossing};
use crate::registry::DispatchError;
use crate::schema::{self, ToolDescriptor};

/// What a tool hands back: a sentence, or the outcome of a move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Text(String),
    Move(MoveStatus),
}

impl ToolPayload {
    /// The payload as the text that goes into an envelope. Moves are JSON.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        match self {
            ToolPayload::Text(text) => Ok(text.clone()),
            ToolPayload::Move(status) => serde_json::to_string(status),
        }
    }
}

/// Outcome of a `move_across_river` call.
///
/// A refused move is still a successful call: the reason is meant to be
/// read by the caller so it can pick a different passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MoveStatus {
    Success {
        description: String,
        #[serde(rename = "newState")]
        new_state: String,
    },
    Error {
        reason: String,
    },
}

pub type ToolResult = Result<ToolPayload, DispatchError>;

/// A statically declared tool.
pub trait ToolHandler: 'static {
    type Params: DeserializeOwned + JsonSchema;

    const NAME: &'static str;

    /// Doc string. The first paragraph becomes the tool description.
    const DESCRIPTION: &'static str;

    fn execute(&self, env: &mut RiverCrossing, params: Self::Params) -> ToolResult;
}

/// Object-safe face of a [`ToolHandler`].
pub trait DynTool {
    fn name(&self) -> &'static str;

    fn descriptor(&self) -> ToolDescriptor;

    /// Decode `arguments` and run. Null arguments count as `{}`.
    fn call(&self, env: &mut RiverCrossing, arguments: Value) -> ToolResult;
}

impl<T: ToolHandler> DynTool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn descriptor(&self) -> ToolDescriptor {
        generate_schema::<T>()
    }

    fn call(&self, env: &mut RiverCrossing, arguments: Value) -> ToolResult {
        let params = parse_args::<T::Params>(T::NAME, arguments)?;
        self.execute(env, params)
    }
}

/// Descriptor for a handler type, from its parameter struct and doc string.
pub fn generate_schema<T: ToolHandler>() -> ToolDescriptor {
    schema::reflect::<T::Params>(T::NAME, T::DESCRIPTION)
}

fn parse_args<P: DeserializeOwned>(tool: &str, arguments: Value) -> Result<P, DispatchError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| DispatchError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Parameters of a tool that takes none.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveParams {
    /// Who to take across. One of 'wolf', 'goat', 'cabbage', or 'nothing' (the ferryman crosses alone).
    pub passenger: Passenger,
}

pub struct GetCurrentState;

impl ToolHandler for GetCurrentState {
    type Params = NoParams;

    const NAME: &'static str = "get_current_state";
    const DESCRIPTION: &'static str =
        "Get the current state of the puzzle: who is on which bank and where the boat is.";

    fn execute(&self, env: &mut RiverCrossing, _params: NoParams) -> ToolResult {
        debug!("reading state");
        Ok(ToolPayload::Text(env.describe()))
    }
}

pub struct MoveAcrossRiver;

impl ToolHandler for MoveAcrossRiver {
    type Params = MoveParams;

    const NAME: &'static str = "move_across_river";
    const DESCRIPTION: &'static str = "Try to ferry a passenger to the other bank.

The boat goes from whichever bank it is on, and the passenger must be on
that bank. A move that would leave the wolf with the goat, or the goat with
the cabbage, on the bank without the ferryman is refused and nothing
changes.";

    fn execute(&self, env: &mut RiverCrossing, params: MoveParams) -> ToolResult {
        let status = match env.attempt_move(params.passenger) {
            Ok(description) => {
                info!(passenger = %params.passenger, "move committed");
                MoveStatus::Success {
                    description,
                    new_state: env.describe(),
                }
            }
            Err(e) => {
                info!(passenger = %params.passenger, reason = %e, "move refused");
                MoveStatus::Error {
                    reason: e.to_string(),
                }
            }
        };
        Ok(ToolPayload::Move(status))
    }
}

pub struct CheckIfSolved;

impl ToolHandler for CheckIfSolved {
    type Params = NoParams;

    const NAME: &'static str = "check_if_solved";
    const DESCRIPTION: &'static str = "Check whether the puzzle has been solved.

Call this whenever you think the puzzle is solved, to confirm it.";

    fn execute(&self, env: &mut RiverCrossing, _params: NoParams) -> ToolResult {
        let text = if env.is_solved() {
            "Confirmed. The puzzle is solved: everything is on the right bank. \
             You can now write your final message."
                .to_string()
        } else {
            format!(
                "Not yet. The puzzle is not solved yet, keep going. The current state is:\n{}",
                env.describe()
            )
        };
        Ok(ToolPayload::Text(text))
    }
}

/// Only offered over the protocol bridge.
pub struct ResetPuzzle;

impl ToolHandler for ResetPuzzle {
    type Params = NoParams;

    const NAME: &'static str = "reset_puzzle";
    const DESCRIPTION: &'static str = "Reset the puzzle to its initial state.";

    fn execute(&self, env: &mut RiverCrossing, _params: NoParams) -> ToolResult {
        *env = RiverCrossing::new();
        info!("puzzle reset");
        Ok(ToolPayload::Text(format!(
            "The puzzle has been reset to its initial state:\n{}",
            env.describe()
        )))
    }
}

/// The tools available through direct dispatch, in listing order.
pub fn direct_tools() -> Vec<Box<dyn DynTool>> {
    vec![
        Box::new(GetCurrentState),
        Box::new(MoveAcrossRiver),
        Box::new(CheckIfSolved),
    ]
}

/// Tools that exist only at the protocol boundary.
pub fn lifecycle_tools() -> Vec<Box<dyn DynTool>> {
    vec![Box::new(ResetPuzzle)]
}
