//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! definitions from files and strings.

use crate::analyzer::analyze;
use crate::parser::{check_size, parse};
use crate::types::{resolve_blank, Program, Transition, TransitionTable, TuringMachineError};
use std::fs;
use std::path::Path;

/// `ProgramLoader` is a utility struct for loading programs.
///
/// Files ending in `.json` are read as serialized [`Program`]s; anything else is parsed as
/// the text definition format.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read, parsed and analyzed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` or `Err(TuringMachineError::JsonError)` if
    ///   the content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "loading program");

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::load_program_from_json(&content)
        } else {
            parse(&content)
        }
    }

    /// Loads a single program from text definition content.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads a single program from its JSON form.
    ///
    /// As in text definitions, `_` in the tape and in rules stands for the program's blank.
    pub fn load_program_from_json(content: &str) -> Result<Program, TuringMachineError> {
        check_size(content)?;

        let mut program: Program = serde_json::from_str(content)?;
        program.tape = program.symbols().into_iter().collect();
        program.rules = resolve_rule_blanks(&program.rules, program.blank)?;

        analyze(&program)?;

        Ok(program)
    }
}

/// Rewrites `_` in every rule to `blank`, rejecting rules that then collide.
fn resolve_rule_blanks(
    rules: &TransitionTable,
    blank: char,
) -> Result<TransitionTable, TuringMachineError> {
    let mut table = TransitionTable::new();

    for (state, read, transition) in rules.iter() {
        let read = resolve_blank(read, blank);
        let resolved = Transition::new(
            transition.next_state.as_str(),
            resolve_blank(transition.write, blank),
            transition.direction,
        );

        if table.insert(state, read, resolved).is_some() {
            return Err(TuringMachineError::ValidationError(format!(
                "Duplicate rule for state {} and symbol '{}'",
                state, read
            )));
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;
    use crate::programs::Task;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("append.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(Task::AppendOne.definition().as_bytes())
            .unwrap();

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.name, "Append one");
        assert_eq!(program.tape, "11");

        let mut machine = TuringMachine::new(program);
        assert_eq!(machine.run(false), "111");
    }

    #[test]
    fn test_load_json_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("erase.json");

        let program = Task::EraseAllOnes.program("11");
        let json = serde_json::to_string_pretty(&program).unwrap();
        fs::write(&file_path, json).unwrap();

        let loaded = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(loaded, program);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        fs::write(&file_path, "This is not a valid program").unwrap();

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::ParseError(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let result = ProgramLoader::load_program_from_json("{\"name\": 1}");
        assert!(matches!(result, Err(TuringMachineError::JsonError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_program_from_string() {
        let program = ProgramLoader::load_program_from_string(Task::EraseAllOnes.definition());

        assert!(program.is_ok());
    }

    #[test]
    fn test_load_json_resolves_input_blank() {
        let json = r#"{
            "name": "Blank Rules",
            "tape": "1_",
            "initial_state": "q0",
            "blank": "b",
            "rules": [
                {"state": "q0", "read": "1", "next_state": "q0", "write": "_", "direction": "Right"},
                {"state": "q0", "read": "_", "next_state": "q_accept", "write": "1", "direction": "Right"}
            ]
        }"#;

        let program = ProgramLoader::load_program_from_json(json).unwrap();
        assert_eq!(program.tape, "1b");
        assert_eq!(program.rules.get("q0", '1').unwrap().write, 'b');
        assert!(program.rules.contains("q0", 'b'));
        assert!(!program.rules.contains("q0", '_'));

        let mut machine = TuringMachine::new(program);
        assert_eq!(machine.run(false), "b1");
    }

    #[test]
    fn test_load_json_rejects_blank_collision() {
        let json = r#"{
            "name": "Collision",
            "initial_state": "q0",
            "rules": [
                {"state": "q0", "read": "a", "next_state": "q_accept", "write": "1", "direction": "Right"},
                {"state": "q0", "read": "_", "next_state": "q_accept", "write": "1", "direction": "Left"}
            ]
        }"#;

        let result = ProgramLoader::load_program_from_json(json);
        assert!(matches!(result, Err(TuringMachineError::ValidationError(_))));
    }

    #[test]
    fn test_load_oversized_json() {
        let json = format!("{{\"name\": \"{}\"}}", "x".repeat(crate::MAX_PROGRAM_SIZE));

        let result = ProgramLoader::load_program_from_json(&json);
        assert!(matches!(result, Err(TuringMachineError::ValidationError(_))));
    }
}
