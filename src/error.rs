//! # Error Handling
//!
//! This module defines the centralized error type for `xmake`. It uses the
//! `thiserror` library to describe every failure mode of a build run with a
//! clear, user-facing message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The rule-file variants carry the directory
//!   prefix they came from; the scheduling variants carry target identifiers;
//!   the toolchain variant carries the failed step and the exact command line.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! No error is recovered locally. Every variant aborts the whole run and is
//! mapped to a process exit code by [`Error::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// Main error type for xmake operations
#[derive(Error, Debug)]
pub enum Error {
    /// No directory containing the repository marker was found above the
    /// starting directory.
    #[error("Repository root not found: no `{marker}` directory above {}", start.display())]
    RepositoryNotFound { start: PathBuf, marker: String },

    /// A directory referenced by the dependency closure has no rule file.
    #[error("Rule file missing for {prefix}: {} does not exist", path.display())]
    RuleFileMissing { prefix: String, path: PathBuf },

    /// A rule file exists but is not valid YAML, or not a mapping of records.
    #[error("Rule file parse error in {prefix}: {message}")]
    RuleParse { prefix: String, message: String },

    /// A rule file parsed, but one of its target records is incomplete or
    /// contains an invalid value.
    #[error("Invalid definition of {target}: {message}")]
    RuleDefinition { target: String, message: String },

    /// A dependency references a target its directory never defines.
    #[error("Undefined target {target} (referenced by {referenced_by})")]
    UndefinedTarget {
        target: String,
        referenced_by: String,
    },

    /// The scheduler completed a full pass without executing anything.
    #[error("Dependency cycle detected, no target can make progress: {cycle}")]
    CyclicOrMissingDependency { cycle: String },

    /// A toolchain subprocess could not be started or exited unsuccessfully.
    #[error("{step} step failed for {target}: {status}\n  command: {command}{}", stderr_block(stderr))]
    ToolchainInvocation {
        target: String,
        step: String,
        command: String,
        status: String,
        stderr: String,
    },

    /// An error converting between prefixes and real paths.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// A worker pool could not be created for parallel execution.
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_block(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n  output:\n{}", trimmed)
    }
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::RepositoryNotFound { .. } => exit_codes::REPOSITORY_NOT_FOUND,
            Error::RuleFileMissing { .. }
            | Error::RuleParse { .. }
            | Error::RuleDefinition { .. } => exit_codes::RULE_ERROR,
            Error::UndefinedTarget { .. } => exit_codes::UNDEFINED_TARGET,
            Error::CyclicOrMissingDependency { .. } => exit_codes::DEPENDENCY_CYCLE,
            Error::ToolchainInvocation { .. } => exit_codes::TOOLCHAIN_FAILURE,
            Error::Path { .. } | Error::WorkerPool { .. } | Error::Io(_) => exit_codes::ERROR,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
