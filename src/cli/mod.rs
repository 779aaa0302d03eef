//! CLI module for dsrun
//!
//! This module provides the command-line interface of the test orchestrator.
//!
//! ## Actions
//!
//! Evaluated in a fixed priority order:
//!
//! - `--list-tests` - Print the discovered test names (no build)
//! - `--run-all` - Build, then run every registered test through ctest
//! - `--test-name <NAME>` - Build, then run one test binary directly
//! - no action flag - Build only
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use crate::discovery::{DEFAULT_BINARY_SUFFIX, DEFAULT_GROUP_DIR, DiscoveryError, Layout};
use crate::process::{ProcessError, ProcessRunner, SystemRunner};
use crate::toolchain::{Toolchain, default_jobs};
use crate::version::DSRUN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<DiscoveryError> for CliError {
    fn from(err: DiscoveryError) -> Self {
        CliError::failure(err.to_string())
    }
}

impl From<ProcessError> for CliError {
    fn from(err: ProcessError) -> Self {
        CliError::failure(err.to_string())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Build directory used when `--build` is omitted or given without a value.
pub const DEFAULT_BUILD_DIR: &str = "./build";

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Builds the project and runs its unit tests
#[derive(Parser, Debug)]
#[command(name = "dsrun")]
#[command(version = DSRUN_VERSION)]
#[command(
    about = "Runs either all unit tests in the project or the tests for a specific data structure",
    long_about = None
)]
pub struct Cli {
    /// List the name of the tests you can choose
    #[arg(short = 'l', long = "list-tests")]
    pub list_tests: bool,

    /// Run all tests available
    #[arg(short = 'r', long = "run-all", conflicts_with = "test_name")]
    pub run_all: bool,

    /// Run a specific data structure's tests. Use "--list-tests" to get a listing of the available test names
    #[arg(short = 't', long = "test-name", value_name = "NAME")]
    pub test_name: Option<String>,

    /// Build and compile the project into the build directory specified
    #[arg(
        short = 'b',
        long = "build",
        value_name = "PATH",
        num_args = 0..=1,
        default_value = DEFAULT_BUILD_DIR,
        default_missing_value = DEFAULT_BUILD_DIR
    )]
    pub build: PathBuf,

    /// Project source directory handed to the configure step
    #[arg(short = 'S', long = "source-dir", value_name = "PATH", default_value = ".")]
    pub source_dir: PathBuf,

    /// Worker count for compiling and running tests (default: logical cores)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Where compiled tests live inside the build directory
    #[arg(long = "layout", value_enum, default_value_t = LayoutKind::TestBin)]
    pub layout: LayoutKind,

    /// Group root inside the build directory (groups layout)
    #[arg(long = "group-dir", value_name = "NAME", default_value = DEFAULT_GROUP_DIR)]
    pub group_dir: String,

    /// File name suffix of a group's test binary (groups layout)
    #[arg(long = "binary-suffix", value_name = "SUFFIX", default_value = DEFAULT_BINARY_SUFFIX)]
    pub binary_suffix: String,

    /// Stop when the configure or compile step fails
    #[arg(long)]
    pub strict: bool,

    /// Build-system executable
    #[arg(long = "cmake", value_name = "PROGRAM", default_value = "cmake")]
    pub cmake: PathBuf,

    /// Test-runner executable
    #[arg(long = "ctest", value_name = "PROGRAM", default_value = "ctest")]
    pub ctest: PathBuf,
}

/// Discovery convention selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutKind {
    /// One binary per test under `<build>/test_bin/`
    TestBin,
    /// One group per directory under `<build>/<group-dir>/`, binary in `tests/`
    Groups,
}

/// What a single invocation does, after flag precedence is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    RunAll,
    RunOne(String),
    BuildOnly,
}

impl Cli {
    /// Resolve the action flags. `--list-tests` always wins.
    pub fn action(&self) -> Action {
        if self.list_tests {
            Action::List
        } else if self.run_all {
            Action::RunAll
        } else if let Some(name) = &self.test_name {
            Action::RunOne(name.clone())
        } else {
            Action::BuildOnly
        }
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            cmake: self.cmake.clone(),
            ctest: self.ctest.clone(),
            source_dir: self.source_dir.clone(),
            jobs: self.jobs.unwrap_or_else(default_jobs),
        }
    }

    pub fn discovery_layout(&self) -> Layout {
        match self.layout {
            LayoutKind::TestBin => Layout::TestBin,
            LayoutKind::Groups => Layout::Groups {
                group_dir: self.group_dir.clone(),
                suffix: self.binary_suffix.clone(),
            },
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    let mut runner = SystemRunner;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match execute(&cli, &mut runner, &mut out) {
        Ok(exit_code) => {
            let _ = out.flush();
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            let _ = out.flush();
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed invocation and return its exit code.
#[tracing::instrument(skip_all, fields(build_dir = %cli.build.display()))]
pub fn execute(cli: &Cli, runner: &mut dyn ProcessRunner, out: &mut dyn Write) -> CliResult<ExitCode> {
    let layout = cli.discovery_layout();
    let action = cli.action();
    tracing::debug!(?action, ?layout, "dispatching");

    match action {
        Action::List => commands::list_tests(&cli.build, &layout, out),
        Action::RunAll => commands::run_all(&cli.toolchain(), &cli.build, cli.strict, runner),
        Action::RunOne(name) => {
            commands::run_one(&cli.toolchain(), &cli.build, &layout, &name, cli.strict, runner, out)
        }
        Action::BuildOnly => commands::build_only(&cli.toolchain(), &cli.build, cli.strict, runner),
    }
}

// ============================================================================
// Tests
// ============================================================================
