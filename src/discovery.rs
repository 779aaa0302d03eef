//! Test target discovery
//!
//! Compiled test artifacts are found purely by directory convention inside the
//! build directory. Two conventions are supported, selected by [`Layout`]:
//!
//! - `test_bin`: every entry of `<build>/test_bin/` is a runnable test binary
//!   and its file name is the test name.
//! - groups: every entry of `<build>/<group_dir>/` is a test group; the group's
//!   binary is the entry of `<group>/tests/` whose name ends with a fixed suffix
//!   (`gtest` by default).
//!
//! Discovery is never cached. Each call rescans the filesystem, so a build that
//! ran earlier in the same invocation is picked up.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Subdirectory of the build directory holding one binary per test.
pub const TEST_BIN_DIR: &str = "test_bin";
/// Default group root for the groups layout.
pub const DEFAULT_GROUP_DIR: &str = "src";
/// Default suffix identifying a group's test binary.
pub const DEFAULT_BINARY_SUFFIX: &str = "gtest";

const GROUP_TESTS_DIR: &str = "tests";

/// Filesystem convention mapping a test name to its binary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Layout {
    /// `<build>/test_bin/<name>`
    #[default]
    TestBin,
    /// `<build>/<group_dir>/<name>/tests/<...suffix>`
    Groups { group_dir: String, suffix: String },
}

impl Layout {
    /// Groups layout with the default directory and suffix.
    pub fn groups() -> Self {
        Layout::Groups {
            group_dir: DEFAULT_GROUP_DIR.to_string(),
            suffix: DEFAULT_BINARY_SUFFIX.to_string(),
        }
    }

    /// Directory whose immediate children are the test targets.
    pub fn root(&self, build_dir: &Path) -> PathBuf {
        match self {
            Layout::TestBin => build_dir.join(TEST_BIN_DIR),
            Layout::Groups { group_dir, .. } => build_dir.join(group_dir),
        }
    }
}

/// A discovered test binary or test group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTarget {
    pub name: String,
    /// The binary itself (`test_bin`) or the group directory (groups)
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Could not find the test name you supplied ({name}). Use the --list-tests to see all available tests")]
    NotFound { name: String },

    #[error("Could not find a `*{suffix}` test binary in {}", .dir.display())]
    MissingBinary { dir: PathBuf, suffix: String },
}

/// List every test target under the layout's root.
///
/// A missing (or non-directory) root yields an empty list rather than an
/// error: nothing has been built yet. Entries come back in the order the
/// filesystem enumerates them.
#[tracing::instrument(skip_all, fields(build_dir = %build_dir.display()))]
pub fn discover(build_dir: &Path, layout: &Layout) -> Vec<TestTarget> {
    let root = layout.root(build_dir);
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "no test directory");
        return Vec::new();
    }

    let Ok(entries) = fs::read_dir(&root) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Finder droppings and other dotfiles are not groups
            if matches!(layout, Layout::Groups { .. }) && name.starts_with('.') {
                return None;
            }
            Some(TestTarget { name, path: entry.path() })
        })
        .collect()
}

/// Resolve one test name to the binary that runs it.
pub fn resolve(build_dir: &Path, layout: &Layout, name: &str) -> Result<PathBuf, DiscoveryError> {
    let target = discover(build_dir, layout)
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| DiscoveryError::NotFound { name: name.to_string() })?;

    match layout {
        Layout::TestBin => Ok(target.path),
        Layout::Groups { suffix, .. } => find_suffixed_binary(&target.path.join(GROUP_TESTS_DIR), suffix),
    }
}

fn find_suffixed_binary(dir: &Path, suffix: &str) -> Result<PathBuf, DiscoveryError> {
    let missing = || DiscoveryError::MissingBinary {
        dir: dir.to_path_buf(),
        suffix: suffix.to_string(),
    };

    let entries = fs::read_dir(dir).map_err(|_| missing())?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix))
        })
        .ok_or_else(missing)
}
