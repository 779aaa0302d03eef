#![forbid(unsafe_code)]
//! dsrun: build the data-structures project and run its unit tests
//!
//! A thin orchestrator around two external tools: CMake configures and
//! compiles the project, CTest (or a single compiled test binary) runs the
//! tests. This crate parses the command line, discovers compiled test targets
//! by directory convention, and dispatches to list / run-all / run-one /
//! build-only.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod discovery;
pub mod process;
pub mod toolchain;
pub mod version;

pub use discovery::{Layout, TestTarget};
pub use process::{Invocation, ProcessRunner, SystemRunner};
pub use toolchain::Toolchain;
