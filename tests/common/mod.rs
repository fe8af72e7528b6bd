//! Shared test utilities for E2E tests.
//!
//! Builds a throwaway repository (a temp dir with a `.git` marker) and a fake
//! toolchain: small shell scripts that log their arguments and create the
//! file they were asked to produce.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let repo = TestRepo::new();
//!     repo.rules("lib", "core:\n  srcs: [core.cc]\n  deps: []\n");
//!     repo.xmake_in("lib").assert().success();
//! }
//! ```

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::TestRepo;
}

const FAKE_CXX: &str = r#"#!/bin/sh
echo "cxx $*" >> "$XMAKE_TEST_LOG"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
if [ -n "$out" ]; then : > "$out"; fi
exit 0
"#;

const FAKE_AR: &str = r#"#!/bin/sh
echo "ar $*" >> "$XMAKE_TEST_LOG"
: > "$2"
exit 0
"#;

const FAILING_CXX: &str = r#"#!/bin/sh
echo "cxx $*" >> "$XMAKE_TEST_LOG"
echo "broken.cc:1:1: error: expected unqualified-id" >&2
exit 1
"#;

/// A temporary repository plus a fake toolchain outside of it.
pub struct TestRepo {
    pub temp: TempDir,
    tools: TempDir,
}

#[allow(dead_code)]
impl TestRepo {
    /// Create a repository root with a `.git` marker.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        temp.child(".git").create_dir_all().unwrap();
        let tools = TempDir::new().unwrap();
        write_script(tools.path(), "cxx", FAKE_CXX);
        write_script(tools.path(), "ar", FAKE_AR);
        write_script(tools.path(), "failing-cxx", FAILING_CXX);
        Self { temp, tools }
    }

    /// Path of a directory inside the repository; `""` is the root.
    pub fn path(&self, dir: &str) -> PathBuf {
        if dir.is_empty() {
            self.temp.path().to_path_buf()
        } else {
            self.temp.path().join(dir)
        }
    }

    /// Write `<dir>/xmake.yml`.
    pub fn rules(&self, dir: &str, yaml: &str) {
        let path = self.path(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("xmake.yml"), yaml).unwrap();
    }

    /// Write a small source file at `<dir>/<name>`.
    pub fn source(&self, dir: &str, name: &str) {
        let path = self.path(dir).join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "int f() { return 0; }\n").unwrap();
    }

    /// `xmake` started from `dir`, wired to the fake toolchain.
    pub fn xmake_in(&self, dir: &str) -> Command {
        let mut cmd = cargo_bin_cmd!("xmake");
        cmd.current_dir(self.path(dir))
            .env_remove("XMAKE_JOBS")
            .env("XMAKE_CXX", self.tools.path().join("cxx"))
            .env("XMAKE_AR", self.tools.path().join("ar"))
            .env("XMAKE_TEST_LOG", self.log_path())
            .env("NO_COLOR", "1");
        cmd
    }

    /// Path of a fake compiler that always fails.
    pub fn failing_cxx(&self) -> PathBuf {
        self.tools.path().join("failing-cxx")
    }

    fn log_path(&self) -> PathBuf {
        self.tools.path().join("commands.log")
    }

    /// Every toolchain invocation so far, one per line, in order.
    pub fn commands(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}
