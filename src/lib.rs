//! This crate provides a deterministic single-tape Turing Machine interpreter.
//! It includes modules for describing machines, parsing machine definitions, simulating
//! their execution step by step, and the built-in tasks that ship with it.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the built-in tasks.
pub use programs::{append_one, erase_all_ones, Task};
pub use tape::Tape;
pub use trace::{NoTrace, TextTrace, Trace};
/// Re-exports the types describing machines and their execution.
pub use types::{
    Direction, Halt, Outcome, Program, Step, Transition, TransitionTable, TuringMachineError,
    BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
