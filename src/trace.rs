//! Step-by-step reporting for machine runs.
//!
//! The text trace is a human-readable diagnostic, one line per event. It is not meant to
//! be parsed.

use std::io::{self, Write};

use crate::machine::TuringMachine;

/// Receives the configuration of a machine at each point of a run.
pub trait Trace {
    /// Called once before the first step.
    fn start(&mut self, _machine: &TuringMachine) -> io::Result<()> {
        Ok(())
    }

    /// Called after every applied transition.
    fn step(&mut self, _machine: &TuringMachine) -> io::Result<()> {
        Ok(())
    }

    /// Called once after the machine halted.
    fn finish(&mut self, _machine: &TuringMachine) -> io::Result<()> {
        Ok(())
    }
}

/// Discards every event.
pub struct NoTrace;

impl Trace for NoTrace {}

/// Writes a line-oriented text trace to any writer.
pub struct TextTrace<W: Write> {
    out: W,
}

impl<W: Write> TextTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Trace for TextTrace<W> {
    fn start(&mut self, machine: &TuringMachine) -> io::Result<()> {
        writeln!(self.out, "Initial tape: {}", machine.tape())?;
        writeln!(
            self.out,
            "Initial state: {}, head position: {}",
            machine.state(),
            machine.head()
        )
    }

    fn step(&mut self, machine: &TuringMachine) -> io::Result<()> {
        writeln!(
            self.out,
            "Step {}: state={}, tape={}, head position={}",
            machine.step_count(),
            machine.state(),
            machine.tape(),
            machine.head()
        )
    }

    fn finish(&mut self, machine: &TuringMachine) -> io::Result<()> {
        writeln!(self.out, "Halted in state: {}", machine.state())?;
        writeln!(self.out, "Final tape: {}", machine.tape())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Program, TransitionTable};

    #[test]
    fn test_text_trace_lines() {
        let program = Program {
            name: "Append".to_string(),
            tape: "1".to_string(),
            initial_state: "q0".to_string(),
            accept_state: "q_accept".to_string(),
            blank: 'a',
            rules: TransitionTable::new()
                .with("q0", '1', "q0", '1', Direction::Right)
                .with("q0", 'a', "q_accept", '1', Direction::Right),
        };
        let mut machine = TuringMachine::new(program);
        let mut trace = TextTrace::new(Vec::new());

        machine.run_with(&mut trace);

        let text = String::from_utf8(trace.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Initial tape: 1",
                "Initial state: q0, head position: 0",
                "Step 1: state=q0, tape=1, head position=1",
                "Step 2: state=q_accept, tape=11, head position=2",
                "Halted in state: q_accept",
                "Final tape: 11",
            ]
        );
    }
}
