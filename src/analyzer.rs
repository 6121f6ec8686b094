//! This module provides functions for analyzing programs to detect common mistakes before
//! execution: a start state with nothing to do and rule blocks that can never be reached.
//!
//! Tape symbols are not checked, and neither is whether the accept state can be reached:
//! a missing rule halts the machine normally. Those cases are only logged.

use crate::types::{Program, State, INPUT_BLANK_SYMBOL};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Represents various errors that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial state has no rules and is not the accept state.
    InvalidStartState(String),
    /// States that have rules but cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// Indicates structural problems with the program (empty state names and the like).
    StructuralError(String),
}

impl From<AnalysisError> for crate::types::TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        let message = match error {
            AnalysisError::InvalidStartState(state) => format!("Invalid start state: {}", state),
            AnalysisError::UnreachableStates(states) => {
                format!("Unreachable states detected: {:?}", states)
            }
            AnalysisError::StructuralError(msg) => msg,
        };

        Self::ValidationError(message)
    }
}

/// Analyzes a given `Program` for structural and logical errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` describing the first problem found.
pub fn analyze(program: &Program) -> Result<(), crate::types::TuringMachineError> {
    let errors = [
        check_structure,
        check_valid_start_state,
        check_unreachable_states,
    ]
    .iter()
    .filter_map(|f| f(program).err())
    .collect::<Vec<_>>();

    if let Some(first_error) = errors.into_iter().next() {
        return Err(first_error.into());
    }

    if !accept_state_reachable(program) {
        tracing::warn!(
            program = %program.name,
            state = %program.accept_state,
            "no rule leads to the accept state, the machine can only halt on a missing rule"
        );
    }

    if program.rules.has_rules_for(&program.accept_state) {
        tracing::warn!(
            program = %program.name,
            state = %program.accept_state,
            "rules for the accept state are never applied"
        );
    }

    Ok(())
}

/// Checks that states are named and the blank is a real tape symbol.
fn check_structure(program: &Program) -> Result<(), AnalysisError> {
    if program.initial_state.is_empty() {
        return Err(AnalysisError::StructuralError(
            "Initial state is empty".to_string(),
        ));
    }

    if program.accept_state.is_empty() {
        return Err(AnalysisError::StructuralError(
            "Accept state is empty".to_string(),
        ));
    }

    if program.blank == INPUT_BLANK_SYMBOL {
        return Err(AnalysisError::StructuralError(format!(
            "'{}' is reserved and cannot be the blank symbol",
            INPUT_BLANK_SYMBOL
        )));
    }

    if let Some((state, read, _)) = program.rules.iter().find(|(state, _, _)| state.is_empty()) {
        return Err(AnalysisError::StructuralError(format!(
            "Rule for symbol '{}' has an empty state {:?}",
            read, state
        )));
    }

    Ok(())
}

/// Checks that the machine can do something from its initial state.
///
/// Starting in the accept state is valid: the machine halts immediately.
fn check_valid_start_state(program: &Program) -> Result<(), AnalysisError> {
    if program.initial_state != program.accept_state
        && !program.rules.has_rules_for(&program.initial_state)
    {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Returns whether the machine starts in the accept state or some rule leads into it.
fn accept_state_reachable(program: &Program) -> bool {
    program.initial_state == program.accept_state
        || program
            .rules
            .iter()
            .any(|(_, _, transition)| transition.next_state == program.accept_state)
}

/// Checks for states with rules that the initial state can never lead to.
///
/// The search stops at the accept state, whose rules are never applied.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    reachable.insert(&program.initial_state);
    queue.push_back(&program.initial_state);

    while let Some(state) = queue.pop_front() {
        if state == program.accept_state {
            continue;
        }

        for (from, _, transition) in program.rules.iter() {
            if from == state && reachable.insert(&transition.next_state) {
                queue.push_back(&transition.next_state);
            }
        }
    }

    let unreachable: BTreeSet<State> = program
        .rules
        .iter()
        .map(|(state, _, _)| state)
        .filter(|state| !reachable.contains(state) && *state != program.accept_state)
        .map(str::to_string)
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(
            unreachable.into_iter().collect(),
        ));
    }

    Ok(())
}
