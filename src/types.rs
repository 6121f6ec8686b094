//! This module defines the core data structures and types used throughout the interpreter,
//! including program representation, transition tables, step outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::Rule;

/// The blank symbol used on the tape when a program does not declare its own.
pub const BLANK_SYMBOL: char = 'a';
/// A special input symbol used in program definitions to represent the program's blank symbol.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The accept state used when a program does not declare its own.
pub const DEFAULT_ACCEPT_STATE: &str = "q_accept";
/// The maximum allowed size for a program definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// A state label. States have no internal structure.
pub type State = String;
/// A single tape symbol.
pub type Symbol = char;

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

/// The right-hand side of a transition rule.
///
/// A transition is looked up by the `(state, symbol)` pair the machine is currently in;
/// applying it writes `write` under the head, enters `next_state` and moves the head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The next state the machine transitions to.
    pub next_state: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(next_state: impl Into<State>, write: Symbol, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// A deterministic transition table keyed by `(state, symbol)`.
///
/// The presence of a key alone decides whether the machine can continue. The table is
/// built once and never changes during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RuleEntry>", into = "Vec<RuleEntry>")]
pub struct TransitionTable {
    rules: HashMap<(State, Symbol), Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule, returning the transition it replaced, if any.
    pub fn insert(
        &mut self,
        state: impl Into<State>,
        read: Symbol,
        transition: Transition,
    ) -> Option<Transition> {
        self.rules.insert((state.into(), read), transition)
    }

    /// Builder-style variant of [`TransitionTable::insert`].
    pub fn with(
        mut self,
        state: &str,
        read: Symbol,
        next_state: &str,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        self.insert(state, read, Transition::new(next_state, write, direction));
        self
    }

    /// Looks up the rule for `(state, symbol)`.
    pub fn get(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        // Borrowed tuple keys can't be looked up without an owned String.
        self.rules.get(&(state.to_string(), symbol))
    }

    pub fn contains(&self, state: &str, symbol: Symbol) -> bool {
        self.get(state, symbol).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over all rules as `(state, read, transition)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Symbol, &Transition)> {
        self.rules
            .iter()
            .map(|((state, read), transition)| (state.as_str(), *read, transition))
    }

    /// Returns `true` if at least one rule is keyed on `state`.
    pub fn has_rules_for(&self, state: &str) -> bool {
        self.rules.keys().any(|(s, _)| s == state)
    }
}

/// Flat serialized form of a single rule, as used in JSON program definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub state: State,
    pub read: Symbol,
    pub next_state: State,
    pub write: Symbol,
    pub direction: Direction,
}

impl From<Vec<RuleEntry>> for TransitionTable {
    fn from(rules: Vec<RuleEntry>) -> Self {
        let mut table = TransitionTable::new();
        for rule in rules {
            table.insert(
                rule.state,
                rule.read,
                Transition::new(rule.next_state, rule.write, rule.direction),
            );
        }
        table
    }
}

impl From<TransitionTable> for Vec<RuleEntry> {
    fn from(table: TransitionTable) -> Self {
        let mut rules: Vec<RuleEntry> = table
            .rules
            .into_iter()
            .map(|((state, read), t)| RuleEntry {
                state,
                read,
                next_state: t.next_state,
                write: t.write,
                direction: t.direction,
            })
            .collect();

        // Stable output regardless of hash order
        rules.sort_by(|a, b| (&a.state, a.read).cmp(&(&b.state, b.read)));
        rules
    }
}

/// A complete machine definition: everything needed to construct a [`crate::TuringMachine`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The initial tape content, one symbol per character.
    #[serde(default)]
    pub tape: String,
    /// The state the machine starts in.
    pub initial_state: State,
    /// The terminal state. Reaching it stops execution even if rules for it exist.
    #[serde(default = "default_accept_state")]
    pub accept_state: State,
    /// The symbol returned for any unwritten cell.
    #[serde(default = "default_blank")]
    pub blank: Symbol,
    /// The transition rules.
    pub rules: TransitionTable,
}

fn default_accept_state() -> State {
    DEFAULT_ACCEPT_STATE.to_string()
}

fn default_blank() -> Symbol {
    BLANK_SYMBOL
}

impl Program {
    /// Returns a copy of this program with a different initial tape.
    pub fn with_tape(mut self, tape: &str) -> Self {
        self.tape = tape.to_string();
        self
    }

    /// Returns the initial tape as symbols, with `INPUT_BLANK_SYMBOL` rewritten to the blank.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tape
            .chars()
            .map(|c| resolve_blank(c, self.blank))
            .collect()
    }
}

/// Rewrites `INPUT_BLANK_SYMBOL` to `blank`, leaving every other symbol as is.
pub fn resolve_blank(symbol: Symbol, blank: Symbol) -> Symbol {
    if symbol == INPUT_BLANK_SYMBOL {
        blank
    } else {
        symbol
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied; the machine may continue.
    Continue,
    /// The machine stopped without mutating anything.
    Halt(Halt),
}

impl Step {
    /// The boolean progress signal: `true` if a transition was applied.
    pub fn is_continue(&self) -> bool {
        matches!(self, Step::Continue)
    }
}

/// Why a machine stopped. Both reasons are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The current state is the accept state.
    Accepted,
    /// No rule exists for the current `(state, symbol)` pair.
    NoRule,
}

/// The result of running a machine to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The rendered tape with its trailing run of blanks removed.
    pub output: String,
    /// Number of transitions applied.
    pub steps: usize,
    /// The state the machine stopped in.
    pub state: State,
    pub halt: Halt,
}

/// Represents various errors that can occur while building or loading machines.
///
/// Stepping a machine never produces one of these; halting is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a write more than one cell outside the tape's written range.
    #[error("Tape boundary exceeded at position {0}")]
    TapeBoundary(i64),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a malformed JSON program definition.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for TuringMachineError {
    fn from(error: serde_json::Error) -> Self {
        TuringMachineError::JsonError(error.to_string())
    }
}
