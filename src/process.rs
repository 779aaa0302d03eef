//! External process boundary
//!
//! Every child process the orchestrator starts (build tool, test runner, test
//! binary) is described by an [`Invocation`] and started through a
//! [`ProcessRunner`]. The dispatcher only ever talks to the trait, so it can be
//! driven in tests without spawning anything.
//!
//! Children inherit stdin/stdout/stderr: their output streams straight to the
//! terminal and only the exit status comes back.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Exit code used when a child could not be started at all (same as a shell's "command not found").
pub const LAUNCH_FAILURE_CODE: i32 = 127;

/// Errors raised while starting an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// A fully built command line for one external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Build the std `Command` with inherited stdio.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Starts external processes and waits for them.
///
/// Implementations block until the child exits and return its exit code.
pub trait ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<i32, ProcessError>;
}

/// Spawns real child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<i32, ProcessError> {
        tracing::debug!(command = %invocation, "spawning");
        let status = invocation
            .to_command()
            .status()
            .map_err(|source| ProcessError::Launch {
                program: invocation.program_name(),
                source,
            })?;
        Ok(exit_code_of(status))
    }
}

/// Map a child's exit status to the code the orchestrator reports.
///
/// A child killed by a signal has no exit code; that is reported as a plain failure.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| {
        tracing::warn!(%status, "child terminated without an exit code");
        1
    })
}

/// Test double that records invocations instead of spawning them.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    pub calls: Vec<Invocation>,
    // (needle, exit code) - `None` means the launch itself fails
    scripted: Vec<(String, Option<i32>)>,
}

#[cfg(test)]
impl RecordingRunner {
    /// Any invocation whose rendering contains `needle` exits with `code`.
    pub fn exit_with(mut self, needle: &str, code: i32) -> Self {
        self.scripted.push((needle.to_string(), Some(code)));
        self
    }

    /// Any invocation whose rendering contains `needle` fails to launch.
    pub fn unlaunchable(mut self, needle: &str) -> Self {
        self.scripted.push((needle.to_string(), None));
        self
    }

    pub fn rendered(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.to_string()).collect()
    }
}

#[cfg(test)]
impl ProcessRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<i32, ProcessError> {
        self.calls.push(invocation.clone());
        let rendered = invocation.to_string();
        match self.scripted.iter().find(|(needle, _)| rendered.contains(needle.as_str())) {
            Some((_, Some(code))) => Ok(*code),
            Some((_, None)) => Err(ProcessError::Launch {
                program: invocation.program_name(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            }),
            None => Ok(0),
        }
    }
}
