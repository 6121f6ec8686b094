//! The built-in tasks: small machines over the alphabet `{a, 1}` where `a` is the blank.
//!
//! Each task builds its transition table directly. The same machines are also shipped as
//! text definitions under `programs/` so they can be inspected or loaded like any other
//! program file.

use crate::machine::TuringMachine;
use crate::types::{Direction, Program, TransitionTable, BLANK_SYMBOL, DEFAULT_ACCEPT_STATE};

/// The initial state of every built-in task.
pub const INITIAL_STATE: &str = "q0";

const ERASE_ALL_ONES_TEXT: &str = include_str!("../programs/erase-all-ones.tm");
const APPEND_ONE_TEXT: &str = include_str!("../programs/append-one.tm");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Replaces every `1` with a blank.
    EraseAllOnes,
    /// Appends a single `1` after the existing ones.
    AppendOne,
}

impl Task {
    pub const ALL: [Task; 2] = [Task::EraseAllOnes, Task::AppendOne];

    pub fn name(&self) -> &'static str {
        match self {
            Task::EraseAllOnes => "Erase all ones",
            Task::AppendOne => "Append one",
        }
    }

    /// The input used when the operator doesn't provide one.
    pub fn default_input(&self) -> &'static str {
        match self {
            Task::EraseAllOnes => "111",
            Task::AppendOne => "11",
        }
    }

    /// The text definition of this task, as shipped under `programs/`.
    pub fn definition(&self) -> &'static str {
        match self {
            Task::EraseAllOnes => ERASE_ALL_ONES_TEXT,
            Task::AppendOne => APPEND_ONE_TEXT,
        }
    }

    pub fn table(&self) -> TransitionTable {
        use Direction::Right;

        let (q0, q1, accept, blank) = (INITIAL_STATE, "q1", DEFAULT_ACCEPT_STATE, BLANK_SYMBOL);

        match self {
            Task::EraseAllOnes => TransitionTable::new()
                .with(q0, '1', q1, blank, Right)
                .with(q1, '1', q1, blank, Right)
                .with(q1, blank, accept, blank, Right)
                // Empty input goes straight to accept
                .with(q0, blank, accept, blank, Right),
            Task::AppendOne => TransitionTable::new()
                .with(q0, '1', q0, '1', Right)
                .with(q0, blank, accept, '1', Right),
        }
    }

    /// Builds the complete program for this task on the given input tape.
    pub fn program(&self, input: &str) -> Program {
        Program {
            name: self.name().to_string(),
            tape: input.to_string(),
            initial_state: INITIAL_STATE.to_string(),
            accept_state: DEFAULT_ACCEPT_STATE.to_string(),
            blank: BLANK_SYMBOL,
            rules: self.table(),
        }
    }

    /// Runs this task on `input` and returns the tape with trailing blanks removed.
    pub fn run(&self, input: &str, trace: bool) -> String {
        TuringMachine::new(self.program(input)).run(trace)
    }

    /// The output a correct run produces for an input made only of ones.
    pub fn expected(&self, input: &str) -> String {
        match self {
            Task::EraseAllOnes => String::new(),
            Task::AppendOne => format!("{input}1"),
        }
    }
}

/// Erases every `1` on `input`. The result is empty for any input made only of ones.
pub fn erase_all_ones(input: &str, trace: bool) -> String {
    Task::EraseAllOnes.run(input, trace)
}

/// Appends one `1` to `input`.
pub fn append_one(input: &str, trace: bool) -> String {
    Task::AppendOne.run(input, trace)
}
