//! Default values for xmake.
//!
//! This module centralizes the fixed names and toolchain settings used across
//! the resolver, the rule loader, and the toolchain driver.

/// Name of the per-directory rule file.
pub const RULE_FILE: &str = "xmake.yml";

/// Directory whose presence marks the repository root.
pub const REPO_MARKER: &str = ".git";

/// Name of the per-directory build output subdirectory.
pub const OUTPUT_DIR: &str = ".out";

/// Subdirectory of the output directory holding one object tree per target.
pub const OBJECT_DIR: &str = ".objs";

/// Compiler (and link driver) used when `--cxx` / `XMAKE_CXX` is not given.
pub const DEFAULT_CXX: &str = "clang++";

/// Archiver used when `--ar` / `XMAKE_AR` is not given.
pub const DEFAULT_AR: &str = "ar";

/// Optimization level passed to every compile.
pub const OPT_FLAG: &str = "-O3";

/// Language standard passed to every compile.
pub const STD_FLAG: &str = "-std=c++20";

/// Threading runtime flag passed when linking executables.
pub const THREAD_FLAG: &str = "-pthread";

/// Flags used to create an archive.
pub const ARCHIVE_FLAGS: &str = "rcs";

/// Extension of compiled objects.
pub const OBJECT_EXTENSION: &str = "o";

/// Extension of library archives.
pub const ARCHIVE_EXTENSION: &str = "a";

/// Number of targets executed concurrently when `--jobs` is not given.
pub const DEFAULT_JOBS: usize = 1;
