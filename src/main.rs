//! Binary entry point for the tugtrace CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Qualify every frame of a saved traceback
//! tugtrace frames --input failure.txt
//!
//! # Read the trace from stdin, first five frames only, as text
//! pytest 2>&1 | tugtrace frames --limit 5 --format text
//!
//! # Resolve one frame
//! tugtrace qualname --at src/app.py:42 --name step
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugtrace::cli::{format_frames_text, run_frames, run_qualname};
use tugtrace_core::error::TraceError;
use tugtrace_core::output::{emit_response, ErrorResponse};
use tugtrace_python::{PythonVersion, StackTraceParser};

// ============================================================================
// CLI Structure
// ============================================================================

/// Qualified stack frames for Python tracebacks.
///
/// Resolves each frame's bare function name to its lexical path, e.g.
/// `D.e in c in A.b`. JSON output by default.
#[derive(Parser, Debug)]
#[command(name = "tugtrace", version, about = "Qualified stack frames for Python tracebacks")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Python version for traces without a version tag line.
    #[arg(
        long,
        global = true,
        env = "TUGTRACE_PYTHON_VERSION",
        value_parser = parse_python_version
    )]
    python_version: Option<PythonVersion>,
}

/// Parse a dotted Python version such as `3.12` or `3.11.4`.
fn parse_python_version(s: &str) -> Result<PythonVersion, String> {
    PythonVersion::try_parse(s).ok_or_else(|| {
        format!(
            "invalid python version '{}', expected a dotted version (e.g., '3.12')",
            s
        )
    })
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the frames command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum FramesFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// One frame per line.
    Text,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble qualified frames from traceback text.
    Frames {
        /// File holding the trace (default: stdin).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Stop after this many frames; later files are never read.
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = FramesFormat::Json)]
        format: FramesFormat,
    },
    /// Resolve the qualified name of one frame.
    Qualname {
        /// Frame location: path:line
        #[arg(long)]
        at: String,
        /// Bare function name reported for the frame.
        #[arg(long)]
        name: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = err.error_code();
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like successful responses
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), TraceError> {
    let parser = StackTraceParser::new()
        .with_default_version(cli.global.python_version.unwrap_or_default());

    match cli.command {
        Command::Frames {
            input,
            limit,
            format,
        } => execute_frames(&parser, input, limit, format),
        Command::Qualname { at, name } => execute_qualname(&parser, &at, &name),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

/// Execute frames command.
fn execute_frames(
    parser: &StackTraceParser,
    input: Option<PathBuf>,
    limit: Option<usize>,
    format: FramesFormat,
) -> Result<(), TraceError> {
    let trace = read_trace(input)?;
    let response = run_frames(parser, &trace, limit);

    match format {
        FramesFormat::Json => {
            emit_response(&response, &mut io::stdout())?;
        }
        FramesFormat::Text => {
            print!("{}", format_frames_text(&response));
        }
    }
    let _ = io::stdout().flush();

    Ok(())
}

/// Execute qualname command.
fn execute_qualname(parser: &StackTraceParser, at: &str, name: &str) -> Result<(), TraceError> {
    let response = run_qualname(parser, at, name)?;
    emit_response(&response, &mut io::stdout())?;
    let _ = io::stdout().flush();
    Ok(())
}

/// Read trace text from `input`, or stdin when absent.
///
/// Invalid UTF-8 is replaced rather than rejected; frame extraction only
/// needs the ASCII frame lines.
fn read_trace(input: Option<PathBuf>) -> Result<String, TraceError> {
    let bytes = match input {
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| TraceError::unreadable("<stdin>", e.to_string()))?;
            bytes
        }
        Some(path) => fs::read(&path).map_err(|e| {
            let display = path.display().to_string();
            if e.kind() == io::ErrorKind::NotFound {
                TraceError::file_not_found(display)
            } else {
                TraceError::unreadable(display, e.to_string())
            }
        })?,
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
