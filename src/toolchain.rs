//! Build-system and test-runner command lines
//!
//! The project is configured and compiled with CMake and its registered tests
//! are run with CTest. This module only builds the command lines; spawning
//! happens through [`crate::process::ProcessRunner`].

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::process::Invocation;

/// CMake build type used for every configure step.
pub const BUILD_TYPE: &str = "Debug";

/// Worker-count hint derived from the host's logical core count.
pub fn default_jobs() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// External tools and the settings shared by their invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Build-system driver (`cmake`)
    pub cmake: PathBuf,
    /// Test-runner driver (`ctest`)
    pub ctest: PathBuf,
    /// Project source tree handed to the configure step
    pub source_dir: PathBuf,
    /// Parallelism hint passed to compile and test runs
    pub jobs: NonZeroUsize,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cmake: PathBuf::from("cmake"),
            ctest: PathBuf::from("ctest"),
            source_dir: PathBuf::from("."),
            jobs: default_jobs(),
        }
    }
}

impl Toolchain {
    /// `cmake -DCMAKE_BUILD_TYPE=Debug -S <source> -B <build>`
    pub fn configure(&self, build_dir: &Path) -> Invocation {
        Invocation::new(&self.cmake)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", BUILD_TYPE))
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(build_dir)
    }

    /// `cmake --build <build> -j <jobs>`
    pub fn compile(&self, build_dir: &Path) -> Invocation {
        Invocation::new(&self.cmake)
            .arg("--build")
            .arg(build_dir)
            .arg("-j")
            .arg(self.jobs.to_string())
    }

    /// `ctest -j <jobs> --test-dir <build>`, covering the whole build tree.
    pub fn test_all(&self, build_dir: &Path) -> Invocation {
        Invocation::new(&self.ctest)
            .arg("-j")
            .arg(self.jobs.to_string())
            .arg("--test-dir")
            .arg(build_dir)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn toolchain() -> Toolchain {
        Toolchain {
            jobs: NonZeroUsize::new(8).unwrap(),
            ..Toolchain::default()
        }
    }

    #[test]
    fn test_configure_command() {
        let inv = toolchain().configure(Path::new("./build"));
        insta::assert_snapshot!(inv.to_string(), @"cmake -DCMAKE_BUILD_TYPE=Debug -S . -B ./build");
    }

    #[test]
    fn test_compile_command() {
        let inv = toolchain().compile(Path::new("/tmp/out"));
        insta::assert_snapshot!(inv.to_string(), @"cmake --build /tmp/out -j 8");
    }

    #[test]
    fn test_test_all_command() {
        let inv = toolchain().test_all(Path::new("./build"));
        insta::assert_snapshot!(inv.to_string(), @"ctest -j 8 --test-dir ./build");
    }

    #[test]
    fn test_custom_programs_and_source_dir() {
        let tc = Toolchain {
            cmake: PathBuf::from("/opt/cmake/bin/cmake"),
            ctest: PathBuf::from("/opt/cmake/bin/ctest"),
            source_dir: PathBuf::from("project"),
            jobs: NonZeroUsize::new(2).unwrap(),
        };
        assert_eq!(
            tc.configure(Path::new("out")).to_string(),
            "/opt/cmake/bin/cmake -DCMAKE_BUILD_TYPE=Debug -S project -B out"
        );
        assert_eq!(tc.test_all(Path::new("out")).program_name(), "/opt/cmake/bin/ctest");
    }

    #[test]
    fn test_default_jobs_is_at_least_one() {
        assert!(default_jobs().get() >= 1);
    }
}
