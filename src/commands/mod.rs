//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `xmake`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `xmake` library.

pub mod build;
pub mod clean;
pub mod completions;
pub mod graph;
pub mod validate;

use anyhow::Result;

use xmake::graph::{build_graph, BuildGraph};
use xmake::loader::RuleLoader;
use xmake::path::{Prefix, Workspace};

/// Locate the repository from the current directory and load the dependency
/// closure of the current directory's rule file.
pub fn discover_graph() -> Result<(Workspace, Prefix, BuildGraph)> {
    let workspace = Workspace::discover()?;
    let start = workspace.current_prefix()?;
    let graph = build_graph(&RuleLoader::new(&workspace), &start)?;
    Ok((workspace, start, graph))
}
