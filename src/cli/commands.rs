//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::Write;
use std::path::Path;

use crate::discovery::{self, Layout};
use crate::process::{Invocation, LAUNCH_FAILURE_CODE, ProcessRunner};
use crate::toolchain::Toolchain;

use super::{CliError, CliResult, ExitCode};

/// Message shown when listing finds no compiled tests.
pub const NOTHING_TO_LIST: &str = "[!] Nothing to list. Please build the project first with --build";

// ============================================================================
// Build step (shared by every action except listing)
// ============================================================================

/// Configure and compile the project into `build_dir`.
///
/// Exit codes of the two steps are not acted upon unless `strict` is set: a
/// failed step is logged and the next one runs anyway. With `strict`, the
/// first failing step stops the run and its exit code is returned.
#[tracing::instrument(skip_all, fields(build_dir = %build_dir.display(), strict = strict))]
pub fn build(toolchain: &Toolchain, build_dir: &Path, strict: bool, runner: &mut dyn ProcessRunner) -> CliResult<()> {
    for step in [toolchain.configure(build_dir), toolchain.compile(build_dir)] {
        let code = match runner.run(&step) {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("{}", e);
                LAUNCH_FAILURE_CODE
            }
        };

        if code == 0 {
            continue;
        }
        if strict {
            return Err(CliError::with_code(
                format!("Build step `{}` failed with exit code {}", step, code),
                code,
            ));
        }
        tracing::warn!(exit_code = code, "build step `{}` failed, continuing", step);
    }

    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

/// Print every discovered test name, one per line.
///
/// Never builds: an empty build directory is reported as an error.
pub fn list_tests(build_dir: &Path, layout: &Layout, out: &mut dyn Write) -> CliResult<ExitCode> {
    let targets = discovery::discover(build_dir, layout);
    if targets.is_empty() {
        return Err(CliError::failure(NOTHING_TO_LIST));
    }

    for target in &targets {
        writeln!(out, "{}", target.name)
            .map_err(|e| CliError::failure(format!("Error writing test list: {}", e)))?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Build, then hand the whole build tree to the test runner.
pub fn run_all(
    toolchain: &Toolchain,
    build_dir: &Path,
    strict: bool,
    runner: &mut dyn ProcessRunner,
) -> CliResult<ExitCode> {
    build(toolchain, build_dir, strict, runner)?;

    let code = runner.run(&toolchain.test_all(build_dir))?;
    Ok(ExitCode(code))
}

/// Build, then run the single binary registered under `name`.
///
/// The resolved binary path is echoed to `out` before the binary starts.
pub fn run_one(
    toolchain: &Toolchain,
    build_dir: &Path,
    layout: &Layout,
    name: &str,
    strict: bool,
    runner: &mut dyn ProcessRunner,
    out: &mut dyn Write,
) -> CliResult<ExitCode> {
    build(toolchain, build_dir, strict, runner)?;

    let binary = discovery::resolve(build_dir, layout, name)?;
    writeln!(out, "{}", binary.display())
        .and_then(|()| out.flush())
        .map_err(|e| CliError::failure(format!("Error writing test path: {}", e)))?;

    let code = runner.run(&Invocation::new(binary))?;
    Ok(ExitCode(code))
}

/// Build and stop.
pub fn build_only(
    toolchain: &Toolchain,
    build_dir: &Path,
    strict: bool,
    runner: &mut dyn ProcessRunner,
) -> CliResult<ExitCode> {
    build(toolchain, build_dir, strict, runner)?;
    Ok(ExitCode::SUCCESS)
}
