//! Process exit codes for the `xmake` binary.
//!
//! - `0`: the build (or other command) succeeded
//! - `1`: general error not covered below
//! - `2`: invalid command-line usage
//! - `3` to `7`: one code per build failure category

/// Successful run.
pub const SUCCESS: u8 = 0;

/// General error.
pub const ERROR: u8 = 1;

/// Arguments rejected by the command-line parser.
pub const USAGE: u8 = 2;

/// No repository marker directory above the working directory.
pub const REPOSITORY_NOT_FOUND: u8 = 3;

/// A rule file is missing, malformed, or defines an incomplete target.
pub const RULE_ERROR: u8 = 4;

/// A dependency names a target its directory does not define.
pub const UNDEFINED_TARGET: u8 = 5;

/// Scheduling stalled on a dependency cycle.
pub const DEPENDENCY_CYCLE: u8 = 6;

/// The compiler, archiver, or linker failed.
pub const TOOLCHAIN_FAILURE: u8 = 7;
