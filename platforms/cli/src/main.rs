use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tmachine::{NoTrace, ProgramLoader, Task, TextTrace, TuringMachine};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs the built-in tasks interactively when called without arguments.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// A machine definition to run (`.tm` text or `.json`)
    #[clap(short, long, conflicts_with = "task")]
    program: Option<PathBuf>,

    /// A built-in task to run
    #[clap(short, long, value_enum)]
    task: Option<TaskArg>,

    /// The initial tape, replacing the one from the program
    #[clap(short, long)]
    input: Option<String>,

    /// Don't print the step trace
    #[clap(short, long)]
    quiet: bool,

    /// Print the outcome as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TaskArg {
    EraseAllOnes,
    AppendOne,
}

impl From<TaskArg> for Task {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::EraseAllOnes => Task::EraseAllOnes,
            TaskArg::AppendOne => Task::AppendOne,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let program = match (&cli.program, cli.task) {
        (Some(path), _) => {
            let program = ProgramLoader::load_program(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!(program = %program.name, path = %path.display(), "loaded program");
            program
        }
        (None, Some(task)) => {
            let task = Task::from(task);
            task.program(task.default_input())
        }
        (None, None) => {
            interactive(&mut io::stdin().lock(), &mut io::stdout().lock())?;
            return Ok(());
        }
    };

    let program = match &cli.input {
        Some(input) => program.with_tape(input),
        None => program,
    };

    let mut machine = TuringMachine::new(program);
    let outcome = if cli.quiet || cli.json {
        machine.run_with(&mut NoTrace)
    } else {
        machine.run_with(&mut TextTrace::new(io::stdout().lock()))
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Output: {}", outcome.output);
    }

    Ok(())
}

/// Prompts for an input per task, runs both tasks with a trace and waits for Enter.
///
/// An empty answer (or end of input) selects the task's default input.
fn interactive(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<()> {
    for (i, task) in Task::ALL.into_iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "===== Task {}: {} =====", i + 1, task.name())?;

        let answer = prompt(
            input,
            out,
            &format!("Enter a binary string (e.g. '{}'): ", task.default_input()),
        )?;
        let tape = if answer.is_empty() {
            task.default_input().to_string()
        } else {
            answer
        };

        tracing::debug!(task = task.name(), input = %tape, "running task");

        writeln!(out, "Input: {tape}")?;
        let mut machine = TuringMachine::new(task.program(&tape));
        let outcome = machine.run_with(&mut TextTrace::new(&mut *out));
        writeln!(
            out,
            "Output: {} (expected: {})",
            outcome.output,
            describe(&task.expected(&tape))
        )?;
    }

    prompt(input, out, "Press Enter to exit")?;

    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, message: &str) -> io::Result<String> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim().to_string())
}

fn describe(expected: &str) -> &str {
    if expected.is_empty() {
        "empty string"
    } else {
        expected
    }
}

/// Diagnostics go to stderr so they never mix with the trace on stdout.
/// Reads `RUST_LOG`, defaulting to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).compact())
        .init();
}
