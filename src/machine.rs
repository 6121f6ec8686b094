//! This module defines the `TuringMachine` struct, which simulates a deterministic
//! single-tape Turing Machine. It owns the tape, head position and current state, and
//! applies transition rules one step at a time.

use std::io;

use crate::tape::Tape;
use crate::trace::{NoTrace, TextTrace, Trace};
use crate::types::{Direction, Halt, Outcome, Program, Step, Symbol, Transition};

/// Represents a single-tape Turing Machine.
///
/// This struct encapsulates the runtime configuration of a machine: its current state,
/// its tape, the head position and the program it executes. A machine is owned by a
/// single run; [`TuringMachine::reset`] restores the program's initial configuration.
pub struct TuringMachine {
    state: String,
    tape: Tape,
    head: i64,
    program: Program,
    step_count: usize,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` from a given `Program`.
    ///
    /// The head starts at position 0, on the first symbol of the program's tape.
    pub fn new(program: Program) -> Self {
        Self {
            state: program.initial_state.clone(),
            tape: Tape::new(program.symbols(), program.blank),
            head: 0,
            program,
            step_count: 0,
        }
    }

    /// Executes a single step of the machine's computation.
    ///
    /// Nothing is mutated when the machine halts, either because it is in the accept
    /// state or because no rule exists for the current state and symbol. Otherwise the
    /// new symbol is written under the head, the state is updated and the head moves.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt(_)` if the machine stopped.
    pub fn step(&mut self) -> Step {
        if self.is_accepted() {
            return Step::Halt(Halt::Accepted);
        }

        let transition = match self.transition().cloned() {
            Some(t) => t,
            None => return Step::Halt(Halt::NoRule),
        };

        // Every applied step writes under the head and the head moves at most one cell,
        // so it never sits more than one cell outside the written range.
        if let Err(e) = self.tape.write(self.head, transition.write) {
            unreachable!("head left the tape frontier: {e}");
        }

        self.state = transition.next_state;

        match transition.direction {
            Direction::Left => self.head -= 1,
            Direction::Right => self.head += 1,
            Direction::Stay => {}
        }

        self.step_count += 1;

        tracing::debug!(
            step = self.step_count,
            state = %self.state,
            head = self.head,
            tape = %self.tape,
            "applied transition"
        );

        Step::Continue
    }

    /// Runs the machine until it halts and returns the tape with trailing blanks removed.
    ///
    /// When `trace` is set, the initial configuration, every applied step and the final
    /// configuration are printed to standard output. There is no step limit: a table that
    /// never halts keeps this call running forever.
    pub fn run(&mut self, trace: bool) -> String {
        let outcome = if trace {
            self.run_with(&mut TextTrace::new(io::stdout().lock()))
        } else {
            self.run_with(&mut NoTrace)
        };

        outcome.output
    }

    /// Runs the machine until it halts, reporting progress to `trace`.
    ///
    /// Stepping continues to completion even if the machine was already partially run;
    /// the reported step count covers every step applied since construction or reset.
    /// The first failed trace write is logged and silences the trace for the rest of the
    /// run. It never stops the machine.
    pub fn run_with(&mut self, trace: &mut impl Trace) -> Outcome {
        let mut traced = report(trace.start(self));

        let halt = loop {
            match self.step() {
                Step::Continue if traced => traced = report(trace.step(self)),
                Step::Continue => {}
                Step::Halt(halt) => break halt,
            }
        };

        tracing::info!(
            state = %self.state,
            steps = self.step_count,
            ?halt,
            "machine halted"
        );

        if traced {
            report(trace.finish(self));
        }

        Outcome {
            output: self.tape.trimmed(),
            steps: self.step_count,
            state: self.state.clone(),
            halt,
        }
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Checks if the machine has reached its accept state.
    pub fn is_accepted(&self) -> bool {
        self.state == self.program.accept_state
    }

    /// Resets the machine to its initial configuration.
    pub fn reset(&mut self) {
        self.state = self.program.initial_state.clone();
        self.tape = Tape::new(self.program.symbols(), self.program.blank);
        self.head = 0;
        self.step_count = 0;
    }

    /// Returns the total number of steps applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the head position. It may be negative after moving left of the start.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the symbol under the head, or the blank if that cell was never written.
    pub fn symbol(&self) -> Symbol {
        self.tape.read(self.head)
    }

    /// Finds the rule for the current state and the symbol under the head.
    pub fn transition(&self) -> Option<&Transition> {
        self.program.rules.get(&self.state, self.symbol())
    }
}

/// Logs a failed trace write. Returns whether tracing should continue.
fn report(result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("failed to write trace, continuing without it: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::Task;
    use crate::trace::TextTrace;
    use crate::types::{TransitionTable, DEFAULT_ACCEPT_STATE};
    use std::io::Write;

    /// Accepts a fixed number of writes, then fails every one after that.
    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.remaining -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn program(tape: &str, rules: TransitionTable) -> Program {
        Program {
            name: "Test".to_string(),
            tape: tape.to_string(),
            initial_state: "q0".to_string(),
            accept_state: DEFAULT_ACCEPT_STATE.to_string(),
            blank: 'a',
            rules,
        }
    }

    #[test]
    fn test_machine_creation() {
        let machine = TuringMachine::new(program("11", TransitionTable::new()));

        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.tape().to_string(), "11");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.symbol(), '1');
    }

    #[test]
    fn test_missing_rule_halts_without_mutation() {
        let rules = TransitionTable::new().with("q0", 'a', "q_accept", 'a', Direction::Right);
        let mut machine = TuringMachine::new(program("11", rules));

        assert_eq!(machine.step(), Step::Halt(Halt::NoRule));
        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.tape().to_string(), "11");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_accept_state_is_absorbing() {
        // A rule exists for the accept state, but reaching it still stops the machine.
        let rules = TransitionTable::new()
            .with("q0", '1', "q_accept", '1', Direction::Right)
            .with("q_accept", 'a', "q0", '1', Direction::Right);
        let mut machine = TuringMachine::new(program("1", rules));

        assert_eq!(machine.step(), Step::Continue);
        assert!(machine.is_accepted());
        assert_eq!(machine.step(), Step::Halt(Halt::Accepted));
        assert_eq!(machine.tape().to_string(), "1");
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_write_past_end_appends_exactly_one_cell() {
        let rules = TransitionTable::new().with("q0", 'a', "q0", '1', Direction::Right);
        let mut machine = TuringMachine::new(program("", rules));

        for expected in 1..=5 {
            assert!(machine.step().is_continue());
            assert_eq!(machine.tape().len(), expected);
            assert_eq!(machine.head(), expected as i64);
        }
        assert_eq!(machine.tape().to_string(), "11111");
    }

    #[test]
    fn test_left_moves_grow_tape_leftward() {
        let rules = TransitionTable::new()
            .with("q0", '1', "q1", '1', Direction::Left)
            .with("q1", 'a', "q2", 'x', Direction::Left)
            .with("q2", 'a', "q_accept", 'y', Direction::Stay);
        let mut machine = TuringMachine::new(program("1", rules));

        let outcome = machine.run_with(&mut NoTrace);

        assert_eq!(machine.head(), -2);
        assert_eq!(machine.tape().origin(), -2);
        assert_eq!(outcome.output, "yx1");
        assert_eq!(outcome.halt, Halt::Accepted);
        assert_eq!(outcome.steps, 3);
    }

    #[test]
    fn test_stay_keeps_head_in_place() {
        let rules = TransitionTable::new().with("q0", '1', "q_accept", 'a', Direction::Stay);
        let mut machine = TuringMachine::new(program("1", rules));

        assert!(machine.step().is_continue());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.tape().to_string(), "a");
    }

    #[test]
    fn test_run_strips_only_trailing_blanks() {
        // Writes "a1aa" and stops on the empty cell after it.
        let rules = TransitionTable::new()
            .with("q0", 'a', "q1", 'a', Direction::Right)
            .with("q1", 'a', "q2", '1', Direction::Right)
            .with("q2", 'a', "q3", 'a', Direction::Right)
            .with("q3", 'a', "q4", 'a', Direction::Right);
        let mut machine = TuringMachine::new(program("", rules));

        let output = machine.run(false);

        assert_eq!(machine.tape().to_string(), "a1aa");
        assert_eq!(output, "a1");
        assert_eq!(machine.state(), "q4");
    }

    #[test]
    fn test_run_reports_no_rule_halt() {
        let rules = TransitionTable::new().with("q0", '1', "q0", '1', Direction::Right);
        let mut machine = TuringMachine::new(program("1x1", rules));

        let outcome = machine.run_with(&mut NoTrace);

        assert_eq!(outcome.halt, Halt::NoRule);
        assert_eq!(outcome.state, "q0");
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.output, "1x1");
    }

    #[test]
    fn test_reset() {
        let rules = TransitionTable::new().with("q0", '1', "q1", 'a', Direction::Right);
        let mut machine = TuringMachine::new(program("1", rules));

        machine.step();
        assert_eq!(machine.state(), "q1");
        assert_eq!(machine.step_count(), 1);

        machine.reset();
        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.tape().to_string(), "1");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_trace_failure_does_not_stop_the_run() {
        for remaining in [0, 3] {
            let mut machine = TuringMachine::new(Task::EraseAllOnes.program("111"));
            let mut trace = TextTrace::new(FailingWriter { remaining });

            let outcome = machine.run_with(&mut trace);

            assert_eq!(outcome.output, "");
            assert_eq!(outcome.steps, 4);
            assert_eq!(outcome.halt, Halt::Accepted);
            assert_eq!(machine.state(), DEFAULT_ACCEPT_STATE);
        }
    }
}
