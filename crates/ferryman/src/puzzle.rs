//! The wolf, goat and cabbage river crossing.
//!
//! A ferryman must bring a wolf, a goat and a cabbage from the left bank to
//! the right bank. The boat carries the ferryman plus at most one
//! passenger. Left alone on a bank without the ferryman, the wolf eats the
//! goat and the goat eats the cabbage.
//!
//! [`RiverCrossing::attempt_move`] is the only way the live state changes.
//! It builds a candidate state, checks it, and only then swaps it in, so a
//! rejected move never leaves a trace.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Something the ferryman has to get across.
///
/// Declared in name order so a `BTreeSet<Item>` iterates alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Cabbage,
    Goat,
    Wolf,
}

impl Item {
    pub const ALL: [Item; 3] = [Item::Cabbage, Item::Goat, Item::Wolf];

    pub fn name(self) -> &'static str {
        match self {
            Item::Cabbage => "cabbage",
            Item::Goat => "goat",
            Item::Wolf => "wolf",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Item::Wolf => Category::Predator,
            Item::Goat => Category::Prey,
            Item::Cabbage => Category::Consumable,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an item does to its neighbours when nobody is watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Predator,
    Prey,
    Consumable,
}

/// Unordered category pairs that may not share an unsupervised bank.
pub const FORBIDDEN_PAIRS: [(Category, Category); 2] = [
    (Category::Predator, Category::Prey),
    (Category::Prey, Category::Consumable),
];

/// One side of the river. Everything starts on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Left,
    Right,
}

impl Bank {
    pub fn opposite(self) -> Bank {
        match self {
            Bank::Left => Bank::Right,
            Bank::Right => Bank::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Bank::Left => "left",
            Bank::Right => "right",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who rides along on a crossing. `nothing` means the ferryman rows alone.
///
/// Parsing ignores ASCII case, so "Goat" and "GOAT" both mean the goat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Passenger {
    Wolf,
    Goat,
    Cabbage,
    Nothing,
}

impl Passenger {
    pub const ALL: [Passenger; 4] = [
        Passenger::Wolf,
        Passenger::Goat,
        Passenger::Cabbage,
        Passenger::Nothing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Passenger::Wolf => "wolf",
            Passenger::Goat => "goat",
            Passenger::Cabbage => "cabbage",
            Passenger::Nothing => "nothing",
        }
    }

    /// The item carried, or `None` for an empty boat.
    pub fn item(self) -> Option<Item> {
        match self {
            Passenger::Wolf => Some(Item::Wolf),
            Passenger::Goat => Some(Item::Goat),
            Passenger::Cabbage => Some(Item::Cabbage),
            Passenger::Nothing => None,
        }
    }
}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid passenger '{0}'. Must be one of: wolf, goat, cabbage, nothing")]
pub struct ParsePassengerError(pub String);

impl FromStr for Passenger {
    type Err = ParsePassengerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Passenger::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePassengerError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Passenger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where everything is: a partition of [`Item::ALL`] over the two banks,
/// plus the bank the boat (and so the ferryman) is on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrossingState {
    left: BTreeSet<Item>,
    right: BTreeSet<Item>,
    boat: Bank,
}

impl CrossingState {
    /// Everything on the left bank, boat included.
    pub fn initial() -> Self {
        Self::with_left(Item::ALL, Bank::Left)
    }

    /// Put `left` on the left bank and every other item on the right.
    ///
    /// Building from the complement keeps the partition intact by construction.
    pub fn with_left(left: impl IntoIterator<Item = Item>, boat: Bank) -> Self {
        let left: BTreeSet<Item> = left.into_iter().collect();
        let right = Item::ALL
            .into_iter()
            .filter(|item| !left.contains(item))
            .collect();
        Self { left, right, boat }
    }

    pub fn boat(&self) -> Bank {
        self.boat
    }

    pub fn bank(&self, bank: Bank) -> &BTreeSet<Item> {
        match bank {
            Bank::Left => &self.left,
            Bank::Right => &self.right,
        }
    }

    fn bank_mut(&mut self, bank: Bank) -> &mut BTreeSet<Item> {
        match bank {
            Bank::Left => &mut self.left,
            Bank::Right => &mut self.right,
        }
    }

    /// The bank without the ferryman.
    pub fn unsupervised(&self) -> Bank {
        self.boat.opposite()
    }

    /// First forbidden pair left together on the unsupervised bank, if any.
    pub fn conflict(&self) -> Option<(Item, Item)> {
        let bank = self.bank(self.unsupervised());
        let find = |category: Category| bank.iter().copied().find(|i| i.category() == category);

        FORBIDDEN_PAIRS.iter().find_map(|&(a, b)| Some((find(a)?, find(b)?)))
    }

    pub fn is_legal(&self) -> bool {
        self.conflict().is_none()
    }

    pub fn is_solved(&self) -> bool {
        self.left.is_empty() && self.right.len() == Item::ALL.len()
    }
}

impl Default for CrossingState {
    fn default() -> Self {
        Self::initial()
    }
}

fn render_bank(items: &BTreeSet<Item>) -> String {
    if items.is_empty() {
        return "empty".to_string();
    }
    items.iter().map(|i| i.name()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for CrossingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Left bank: [{}].", render_bank(&self.left))?;
        writeln!(f, "Right bank: [{}].", render_bank(&self.right))?;
        write!(f, "The boat with the ferryman is on the {} bank.", self.boat)
    }
}

/// Why a move was refused. Either way the state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Passenger '{passenger}' is not on the same bank as the boat (the {boat} bank).")]
    Logistic { passenger: Item, boat: Bank },

    #[error(
        "This move is invalid because it breaks the rules: the {eater} and the {eaten} \
         would be left alone on the {bank} bank. Try a different move."
    )]
    RuleViolation { eater: Item, eaten: Item, bank: Bank },
}

/// The live puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiverCrossing {
    state: CrossingState,
}

impl RiverCrossing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CrossingState {
        &self.state
    }

    pub fn describe(&self) -> String {
        self.state.to_string()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Cross the river with `passenger`.
    ///
    /// On success returns a sentence naming the passenger and where it went.
    pub fn attempt_move(&mut self, passenger: Passenger) -> Result<String, MoveError> {
        let origin = self.state.boat;
        let destination = origin.opposite();

        if let Some(item) = passenger.item() {
            if !self.state.bank(origin).contains(&item) {
                return Err(MoveError::Logistic {
                    passenger: item,
                    boat: origin,
                });
            }
        }

        let mut candidate = self.state.clone();
        candidate.boat = destination;
        if let Some(item) = passenger.item() {
            candidate.bank_mut(origin).remove(&item);
            candidate.bank_mut(destination).insert(item);
        }

        if let Some((eater, eaten)) = candidate.conflict() {
            return Err(MoveError::RuleViolation {
                eater,
                eaten,
                bank: candidate.unsupervised(),
            });
        }

        self.state = candidate;
        Ok(format!(
            "The ferryman successfully carried '{}' across to the {} bank.",
            passenger, destination
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{HashSet, VecDeque};

    const SOLUTION: [Passenger; 7] = [
        Passenger::Goat,
        Passenger::Nothing,
        Passenger::Wolf,
        Passenger::Goat,
        Passenger::Cabbage,
        Passenger::Nothing,
        Passenger::Goat,
    ];

    #[test]
    fn test_initial_state() {
        let puzzle = RiverCrossing::new();
        let state = puzzle.state();
        assert_eq!(state.bank(Bank::Left).len(), 3);
        assert!(state.bank(Bank::Right).is_empty());
        assert_eq!(state.boat(), Bank::Left);
        assert!(!puzzle.is_solved());
    }

    #[test]
    fn test_description() {
        assert_eq!(
            RiverCrossing::new().describe(),
            "Left bank: [cabbage, goat, wolf].\n\
             Right bank: [empty].\n\
             The boat with the ferryman is on the left bank."
        );

        let state = CrossingState::with_left([Item::Wolf], Bank::Right);
        assert_eq!(
            state.to_string(),
            "Left bank: [wolf].\n\
             Right bank: [cabbage, goat].\n\
             The boat with the ferryman is on the right bank."
        );
    }

    #[test]
    fn test_goat_first_succeeds() {
        let mut puzzle = RiverCrossing::new();
        let message = puzzle.attempt_move(Passenger::Goat).unwrap();
        assert!(message.contains("'goat'"));

        let state = puzzle.state();
        assert_eq!(state.boat(), Bank::Right);
        assert_eq!(state.bank(Bank::Right), &BTreeSet::from([Item::Goat]));
        assert_eq!(state.bank(Bank::Left), &BTreeSet::from([Item::Cabbage, Item::Wolf]));
    }

    #[test]
    fn test_rule_violations_leave_state_alone() {
        for (passenger, eater, eaten) in [
            (Passenger::Wolf, Item::Goat, Item::Cabbage),
            (Passenger::Cabbage, Item::Wolf, Item::Goat),
            (Passenger::Nothing, Item::Wolf, Item::Goat),
        ] {
            let mut puzzle = RiverCrossing::new();
            let before = puzzle.clone();

            let err = puzzle.attempt_move(passenger).unwrap_err();
            assert_eq!(
                err,
                MoveError::RuleViolation {
                    eater,
                    eaten,
                    bank: Bank::Left
                },
                "moving {}",
                passenger
            );
            assert_eq!(puzzle, before);
        }
    }

    #[test]
    fn test_passenger_on_wrong_bank() {
        let mut puzzle = RiverCrossing::new();
        puzzle.attempt_move(Passenger::Goat).unwrap();
        let before = puzzle.clone();

        // boat is on the right, the wolf is on the left
        let err = puzzle.attempt_move(Passenger::Wolf).unwrap_err();
        assert_eq!(
            err,
            MoveError::Logistic {
                passenger: Item::Wolf,
                boat: Bank::Right
            }
        );
        assert!(err.to_string().contains("'wolf'"));
        assert_eq!(puzzle, before);
    }

    #[test]
    fn test_full_solution() {
        let mut puzzle = RiverCrossing::new();
        for (step, passenger) in SOLUTION.into_iter().enumerate() {
            assert!(!puzzle.is_solved(), "solved too early at step {}", step);
            puzzle
                .attempt_move(passenger)
                .unwrap_or_else(|e| panic!("step {} ({}) failed: {}", step, passenger, e));
        }
        assert!(puzzle.is_solved());
        assert_eq!(
            puzzle.describe(),
            "Left bank: [empty].\n\
             Right bank: [cabbage, goat, wolf].\n\
             The boat with the ferryman is on the right bank."
        );
    }

    #[test]
    fn test_solved_ignores_boat_position() {
        let arrived = CrossingState::with_left([], Bank::Right);
        assert!(arrived.is_solved());
        assert!(arrived.is_legal());

        // everyone is across but the ferryman went back alone
        let abandoned = CrossingState::with_left([], Bank::Left);
        assert!(abandoned.is_solved());
        assert!(!abandoned.is_legal());
        assert_eq!(abandoned.conflict(), Some((Item::Wolf, Item::Goat)));
    }

    #[test]
    fn test_legality_only_checks_unsupervised_bank() {
        // wolf and goat together, but the ferryman is with them
        assert!(CrossingState::with_left([Item::Wolf, Item::Goat], Bank::Left).is_legal());
        assert!(!CrossingState::with_left([Item::Wolf, Item::Goat], Bank::Right).is_legal());
        assert!(!CrossingState::with_left([Item::Goat, Item::Cabbage], Bank::Right).is_legal());
        // predator and consumable may be left together
        assert!(CrossingState::with_left([Item::Wolf, Item::Cabbage], Bank::Right).is_legal());
        assert!(!CrossingState::with_left([Item::Cabbage], Bank::Left).is_legal());
    }

    #[test]
    fn test_every_reachable_state_is_legal() {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([RiverCrossing::new()]);

        while let Some(puzzle) = queue.pop_front() {
            if !seen.insert(puzzle.state().clone()) {
                continue;
            }
            let state = puzzle.state();
            assert!(state.is_legal(), "reached illegal state:\n{}", state);

            let mut all: Vec<Item> = state.bank(Bank::Left).iter().chain(state.bank(Bank::Right)).copied().collect();
            all.sort();
            assert_eq!(all, Item::ALL.to_vec(), "items lost or duplicated:\n{}", state);

            for passenger in Passenger::ALL {
                let mut next = puzzle.clone();
                match next.attempt_move(passenger) {
                    Ok(_) => queue.push_back(next),
                    Err(_) => assert_eq!(next, puzzle),
                }
            }
        }

        assert!(seen.iter().any(CrossingState::is_solved));
        // 8 arrangements x 2 boat positions, minus the ones the rules forbid
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_passenger_parsing() {
        assert_eq!("goat".parse::<Passenger>(), Ok(Passenger::Goat));
        assert_eq!("CABBAGE".parse::<Passenger>(), Ok(Passenger::Cabbage));
        assert_eq!("Nothing".parse::<Passenger>(), Ok(Passenger::Nothing));

        let err = "ferryman".parse::<Passenger>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid passenger 'ferryman'. Must be one of: wolf, goat, cabbage, nothing"
        );
    }

    #[test]
    fn test_passenger_serde() {
        let p: Passenger = serde_json::from_value(serde_json::json!("Wolf")).unwrap();
        assert_eq!(p, Passenger::Wolf);
        assert_eq!(serde_json::to_value(Passenger::Nothing).unwrap(), "nothing");
        assert!(serde_json::from_value::<Passenger>(serde_json::json!(3)).is_err());
    }
}
