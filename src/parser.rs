//! This module provides the parser for machine definitions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a `Program`.

use crate::{
    analyzer::analyze,
    types::{
        resolve_blank, Direction, Program, State, Symbol, Transition, TransitionTable,
        TuringMachineError, BLANK_SYMBOL, DEFAULT_ACCEPT_STATE, MAX_PROGRAM_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// The first state listed under `rules:` becomes the initial state. The parsed program
/// is analyzed before being returned.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    check_size(input)?;

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .unwrap();

    let program = parse_program(root)?;

    analyze(&program)?;

    Ok(program)
}

/// Rejects definitions larger than `MAX_PROGRAM_SIZE`.
pub(crate) fn check_size(input: &str) -> Result<(), TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program is {} bytes, the limit is {}",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    Ok(())
}

/// A rule as written in the source, before the blank symbol is known.
struct ParsedAction<'i> {
    state: State,
    read: Symbol,
    write: Symbol,
    direction: Direction,
    next: State,
    span: Span<'i>,
}

/// Parses the top-level structure of a program from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut tape: Option<Vec<Symbol>> = None;
    let mut blank: Option<Symbol> = None;
    let mut accept: Option<State> = None;
    let mut actions: Option<Vec<ParsedAction>> = None;
    let mut initial_state: Option<State> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::accept => accept = Some(parse_inner_string(p)),
            Rule::tape => tape = Some(parse_tape(p)),
            Rule::rules => actions = Some(parse_transitions(p, &mut initial_state)?),
            _ => {} // Skip EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let actions = check_required_rule(actions, "rules")?;
    let initial_state = initial_state.ok_or_else(|| {
        TuringMachineError::ValidationError("The 'rules' section has no states".to_string())
    })?;
    let blank = blank.unwrap_or(BLANK_SYMBOL);

    let tape = tape
        .unwrap_or_default()
        .into_iter()
        .map(|symbol| resolve_blank(symbol, blank))
        .collect();

    Ok(Program {
        name,
        tape,
        initial_state,
        accept_state: accept.unwrap_or_else(|| DEFAULT_ACCEPT_STATE.to_string()),
        blank,
        rules: build_table(actions, blank)?,
    })
}

/// Parses the symbols of a `Pair<Rule::tape>`. An empty `tape:` yields no symbols.
fn parse_tape(pair: Pair<Rule>) -> Vec<Symbol> {
    // Rule: tape > symbols > [symbol]
    pair.into_inner()
        .flat_map(|symbols| symbols.into_inner())
        .map(|symbol| parse_symbol(symbol.as_str()))
        .collect()
}

/// Parses the `rules:` section.
///
/// The first state block sets the initial state. A state may only have one block.
fn parse_transitions<'i>(
    pair: Pair<'i, Rule>,
    initial_state: &mut Option<State>,
) -> Result<Vec<ParsedAction<'i>>, TuringMachineError> {
    let mut states = HashSet::new();
    let mut actions = Vec::new();

    for transition_pair in pair.into_inner() {
        let span = transition_pair.as_span();
        let mut pairs = transition_pair.into_inner();
        let state = parse_string(&mut pairs);

        if initial_state.is_none() {
            *initial_state = Some(state.clone());
        }

        if !states.insert(state.clone()) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {state}"),
                span,
            ));
        }

        for action in pairs {
            actions.push(parse_action(&state, action)?);
        }
    }

    Ok(actions)
}

/// Parses a single action from a `Pair<Rule::action>`.
///
/// If the write symbol is omitted, the read symbol is written back.
fn parse_action<'i>(
    state: &str,
    pair: Pair<'i, Rule>,
) -> Result<ParsedAction<'i>, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let read = parse_symbol_from_pairs(&mut pairs);

    let write = match pairs.peek().map(|p| p.as_rule()) {
        Some(Rule::symbol) => parse_symbol_from_pairs(&mut pairs),
        _ => read,
    };

    let direction = parse_direction(pairs.next().unwrap())?;
    let next = parse_string(&mut pairs);

    Ok(ParsedAction {
        state: state.to_string(),
        read,
        write,
        direction,
        next,
        span,
    })
}

/// Builds the transition table, rewriting `INPUT_BLANK_SYMBOL` to the program's blank.
///
/// Two rules for the same `(state, symbol)` pair would make the machine nondeterministic
/// and are rejected.
fn build_table(
    actions: Vec<ParsedAction>,
    blank: Symbol,
) -> Result<TransitionTable, TuringMachineError> {
    let mut table = TransitionTable::new();

    for action in actions {
        let read = resolve_blank(action.read, blank);
        let transition = Transition::new(
            action.next,
            resolve_blank(action.write, blank),
            action.direction,
        );

        if table.insert(action.state.as_str(), read, transition).is_some() {
            return Err(parse_error(
                &format!(
                    "Duplicate rule for state {} and symbol '{}'",
                    action.state, read
                ),
                action.span,
            ));
        }
    }

    Ok(table)
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-' or 'S' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        "-" | "S" => Ok(Direction::Stay),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> Symbol {
    let inner = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    inner.chars().next().unwrap_or(BLANK_SYMBOL)
}

/// Parses a single character symbol from a `Pairs` iterator.
fn parse_symbol_from_pairs(pairs: &mut Pairs<Rule>) -> Symbol {
    parse_symbol(&parse_string(pairs))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner().next().unwrap().as_str().into()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs.next().unwrap().as_str().into()
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::name | Rule::blank | Rule::accept | Rule::tape | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}
