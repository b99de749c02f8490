//! End-to-end puzzle scenarios through direct dispatch and the bridge.

use ferryman::{
    Bank, CrossingState, DispatchError, Item, MoveError, MoveStatus, Passenger, ProtocolBridge,
    RiverCrossing, ToolPayload, ToolRegistry,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

const SOLUTION: [&str; 7] = ["goat", "nothing", "wolf", "goat", "cabbage", "nothing", "goat"];

fn args(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

fn move_status(payload: ToolPayload) -> MoveStatus {
    match payload {
        ToolPayload::Move(status) => status,
        other => panic!("expected a move outcome, got {:?}", other),
    }
}

#[test]
fn test_goat_first_is_legal() {
    let mut puzzle = RiverCrossing::new();
    puzzle.attempt_move(Passenger::Goat).unwrap();

    let state = puzzle.state();
    assert_eq!(state.boat(), Bank::Right);
    assert!(state.bank(Bank::Right).contains(&Item::Goat));
    assert!(state.bank(Bank::Left).contains(&Item::Wolf));
    assert!(state.bank(Bank::Left).contains(&Item::Cabbage));
    assert!(state.is_legal());
}

#[test]
fn test_leaving_goat_with_cabbage_is_refused() {
    let mut puzzle = RiverCrossing::new();
    let before = puzzle.clone();

    let err = puzzle.attempt_move(Passenger::Wolf).unwrap_err();
    assert_eq!(
        err,
        MoveError::RuleViolation {
            eater: Item::Goat,
            eaten: Item::Cabbage,
            bank: Bank::Left,
        }
    );
    assert_eq!(puzzle, before);

    // the ferryman leaving alone abandons everyone
    assert!(matches!(
        puzzle.attempt_move(Passenger::Nothing),
        Err(MoveError::RuleViolation { .. })
    ));
    assert_eq!(puzzle, before);
}

#[test]
fn test_passenger_on_far_bank_is_refused() {
    let mut puzzle = RiverCrossing::new();
    puzzle.attempt_move(Passenger::Goat).unwrap();
    let before = puzzle.clone();

    let err = puzzle.attempt_move(Passenger::Wolf).unwrap_err();
    assert_eq!(
        err,
        MoveError::Logistic {
            passenger: Item::Wolf,
            boat: Bank::Right,
        }
    );
    assert_eq!(puzzle, before);
}

#[test]
fn test_solving_is_confirmed() {
    let mut registry = ToolRegistry::with_default_tools();
    for passenger in SOLUTION {
        let status = move_status(
            registry
                .dispatch("move_across_river", json!({ "passenger": passenger }))
                .unwrap(),
        );
        assert!(matches!(status, MoveStatus::Success { .. }), "{} refused", passenger);
    }

    assert!(registry.environment().is_solved());
    assert_eq!(
        registry.environment().state(),
        &CrossingState::with_left([], Bank::Right)
    );

    let verdict = registry.dispatch("check_if_solved", json!({})).unwrap();
    assert!(verdict.to_text().unwrap().starts_with("Confirmed."));
}

#[test]
fn test_missing_passenger_leaves_state_alone() {
    let mut bridge = ProtocolBridge::new();
    let before = bridge.registry().environment().clone();

    let result = bridge.call_tool("move_across_river", args(json!({})));
    assert!(result.is_error);
    assert_eq!(result.first_text(), "Error: Parameter 'passenger' is required");
    assert_eq!(bridge.registry().environment(), &before);
}

#[test]
fn test_unknown_tool_is_named() {
    let mut bridge = ProtocolBridge::new();
    let result = bridge.call_tool("nonexistent_tool", args(json!({})));
    assert!(result.is_error);
    assert_eq!(result.first_text(), "Error: Unknown tool 'nonexistent_tool'");

    let mut registry = ToolRegistry::with_default_tools();
    assert_eq!(
        registry.dispatch("nonexistent_tool", json!({})).unwrap_err(),
        DispatchError::UnknownTool("nonexistent_tool".to_string())
    );
}

#[test]
fn test_refused_move_is_a_successful_call() {
    let mut bridge = ProtocolBridge::new();
    let result = bridge.call_tool("move_across_river", args(json!({ "passenger": "cabbage" })));
    assert!(!result.is_error);

    let payload: Value = serde_json::from_str(result.first_text()).unwrap();
    assert_eq!(payload["status"], "error");
    assert!(payload["reason"]
        .as_str()
        .unwrap()
        .contains("the wolf and the goat would be left alone on the left bank"));
}

#[test]
fn test_solve_over_the_bridge() {
    let mut bridge = ProtocolBridge::new();
    for passenger in SOLUTION {
        let result = bridge.call_tool("move_across_river", args(json!({ "passenger": passenger })));
        let payload: Value = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(payload["status"], "success", "{} refused", passenger);
    }

    let verdict = bridge.call_tool("check_if_solved", None);
    assert!(!verdict.is_error);
    assert!(verdict.first_text().starts_with("Confirmed."));
}
