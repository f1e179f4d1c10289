//! CLI entry point for the TK64 image runner.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
#[cfg(test)]
use tempfile as _;
use tk64_core::{
    load_image_file, run, AlignmentPolicy, CoreConfig, RunOutcome, RunStop, StreamPorts,
};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Exit status for a fault, a load error or an exhausted step limit.
const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(
    name = "tk64-run",
    version,
    about = "Run a TK64 program image",
    long_about = "Loads a flat image of little-endian instruction words at 0x1000 and runs it \
                  until it halts or faults.\n\nPort 0 reads decimal integers from stdin; port 1 \
                  writes decimal integers to stdout. Logs go to stderr (RUST_LOG)."
)]
struct Cli {
    /// Program image to execute.
    image: PathBuf,

    /// Log every executed instruction to stderr.
    #[arg(long)]
    trace: bool,

    /// Stop with a failure after this many retired instructions.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Require 8-byte alignment for loads, stores, call and return.
    #[arg(long)]
    strict_alignment: bool,
}

impl Cli {
    fn core_config(&self) -> CoreConfig {
        CoreConfig {
            alignment: if self.strict_alignment {
                AlignmentPolicy::Natural
            } else {
                AlignmentPolicy::BoundsOnly
            },
            step_limit: self.max_steps,
            ..CoreConfig::default()
        }
    }
}

fn init_tracing(trace: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if trace {
        if let Ok(directive) = "tk64_core=trace".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
    {
        eprintln!("warning: logging disabled: {err}");
    }
}

/// One-line stderr diagnostic for a run that did not halt.
fn diagnostic(outcome: &RunOutcome) -> Option<String> {
    if outcome.succeeded() {
        return None;
    }
    match outcome.stop {
        RunStop::Fault { cause, pc } => Some(format!(
            "error: {cause} at pc {pc:#x} ({} fault)",
            cause.class()
        )),
        RunStop::StepLimit => Some(format!(
            "error: step limit reached after {} instructions",
            outcome.steps
        )),
        RunStop::Halted => None,
    }
}

fn report(outcome: &RunOutcome) -> Result<(), i32> {
    match diagnostic(outcome) {
        None => Ok(()),
        Some(message) => {
            eprintln!("{message}");
            Err(EXIT_FAILURE)
        }
    }
}

fn run_image(cli: &Cli) -> Result<(), i32> {
    let config = cli.core_config();
    let mut machine = load_image_file(&cli.image, &config).map_err(|err| {
        eprintln!("error: {err}");
        EXIT_FAILURE
    })?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut ports = StreamPorts::new(stdin.lock(), stdout.lock());

    let outcome = run(&mut machine, &mut ports, &config);
    tracing::info!(
        image = %cli.image.display(),
        steps = outcome.steps,
        stop = ?outcome.stop,
        "run finished"
    );

    report(&outcome)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let exit_code = match run_image(&cli) {
        Ok(()) => 0,
        Err(code) => code,
    };
    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tk64_core::FaultCode;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_image_and_flags() {
        let cli = Cli::try_parse_from([
            "tk64-run",
            "prog.bin",
            "--trace",
            "--max-steps",
            "500",
            "--strict-alignment",
        ])
        .expect("valid arguments");

        assert_eq!(cli.image, PathBuf::from("prog.bin"));
        assert!(cli.trace);
        assert_eq!(cli.max_steps, Some(500));
        assert!(cli.strict_alignment);
    }

    #[test]
    fn missing_image_is_a_usage_error() {
        let err = Cli::try_parse_from(["tk64-run"]).expect_err("image is required");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_non_numeric_step_limit() {
        assert!(Cli::try_parse_from(["tk64-run", "a.bin", "--max-steps", "lots"]).is_err());
    }

    #[test]
    fn flags_map_onto_core_config() {
        let cli = Cli::try_parse_from(["tk64-run", "a.bin"]).expect("valid arguments");
        assert_eq!(cli.core_config(), CoreConfig::default());

        let cli = Cli::try_parse_from([
            "tk64-run",
            "a.bin",
            "--strict-alignment",
            "--max-steps",
            "7",
        ])
        .expect("valid arguments");
        let config = cli.core_config();
        assert_eq!(config.alignment, AlignmentPolicy::Natural);
        assert_eq!(config.step_limit, Some(7));
    }

    #[test]
    fn only_halt_reports_success() {
        let halted = RunOutcome {
            steps: 1,
            stop: RunStop::Halted,
        };
        let faulted = RunOutcome {
            steps: 0,
            stop: RunStop::Fault {
                cause: FaultCode::IllegalOpcode,
                pc: 0x1000,
            },
        };
        let limited = RunOutcome {
            steps: 9,
            stop: RunStop::StepLimit,
        };

        assert_eq!(report(&halted), Ok(()));
        assert_eq!(report(&faulted), Err(EXIT_FAILURE));
        assert_eq!(report(&limited), Err(EXIT_FAILURE));
    }

    #[test]
    fn fault_diagnostic_names_cause_pc_and_class() {
        let faulted = RunOutcome {
            steps: 3,
            stop: RunStop::Fault {
                cause: FaultCode::DivideByZero,
                pc: 0x1008,
            },
        };
        let limited = RunOutcome {
            steps: 100,
            stop: RunStop::StepLimit,
        };
        let halted = RunOutcome {
            steps: 1,
            stop: RunStop::Halted,
        };

        assert_eq!(
            diagnostic(&faulted).as_deref(),
            Some("error: division by zero at pc 0x1008 (arithmetic fault)")
        );
        assert_eq!(
            diagnostic(&limited).as_deref(),
            Some("error: step limit reached after 100 instructions")
        );
        assert_eq!(diagnostic(&halted), None);
    }
}
