use crate::jobs::{GraphError, ParseError};
use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::Parser;
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Input, parse or setup error exit code
pub const EXIT_ERROR: i32 = 1;
/// The job list contains a circular dependency
pub const EXIT_CYCLE: i32 = 2;

/// CLI-specific error types with diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The job list could not be read.
    #[error("Failed to read {path}")]
    #[diagnostic(
        code(jobdeps::cli::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// Display form of the input location.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The job list is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// The job list does not describe a valid graph.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// Logging could not be set up.
    #[error("Tracing initialization failed: {message}")]
    #[diagnostic(
        code(jobdeps::cli::tracing),
        help("Check RUST_LOG and the --level flag")
    )]
    Tracing {
        /// The error message
        message: String,
    },

    /// The report could not be encoded.
    #[error("Failed to encode JSON output")]
    #[diagnostic(code(jobdeps::cli::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an I/O error for the given input location.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a tracing setup error.
    pub fn tracing(message: impl Into<String>) -> Self {
        Self::Tracing {
            message: message.into(),
        }
    }

    /// Short machine-readable category, used in JSON error envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse(_) => "parse",
            Self::Graph(_) => "graph",
            Self::Tracing { .. } => "tracing",
            Self::Json(_) => "json",
        }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// Error category
    pub code: &'static str,
    /// Rendered error message
    pub message: String,
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope {
            status: "error",
            code: err.code(),
            message: err.to_string(),
        };
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err);
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Order a list of jobs so that every job runs after the jobs it is linked from.
///
/// Reads lines of the form `name =>` or `name => dependency` and prints the
/// resulting job order, or `Having circular dependency`.
#[derive(Parser, Debug)]
#[command(name = "jobdeps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Job list to read; omit or pass `-` to read stdin.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print one line per dependency level instead of a single order.
    #[arg(long)]
    pub levels: bool,

    /// Emit JSON envelope instead of plain text.
    #[arg(long)]
    pub json: bool,

    /// Logging verbosity level.
    #[arg(short = 'L', long, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, env = "JOBDEPS_LOG_FORMAT", default_value = "compact", value_enum)]
    pub log_format: TracingFormat,
}

impl Cli {
    /// Input file, or `None` for stdin.
    #[must_use]
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }

    /// Tracing settings derived from the flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: self.log_format,
            level: self.level.into(),
            filter: None,
        }
    }
}

/// Parse command-line arguments.
///
/// Usage errors exit with [`EXIT_ERROR`] so that [`EXIT_CYCLE`] stays
/// unambiguous; `--help` and `--version` exit with [`EXIT_OK`].
#[must_use]
pub fn parse() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_ERROR } else { EXIT_OK };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}
