//! # Clean Command Implementation
//!
//! This module implements the `clean` subcommand, which removes the `.out`
//! directories holding objects, archives and executables.
//!
//! By default only the directories in the dependency closure of the current
//! directory are cleaned. With `--all`, every `.out` directory under the
//! repository root is removed, which also works when rule files are broken.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use walkdir::WalkDir;

use xmake::defaults::{OUTPUT_DIR, REPO_MARKER};
use xmake::output::OutputConfig;
use xmake::path::Workspace;

/// Remove build outputs
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Remove every output directory in the repository, not only those of
    /// the current dependency closure.
    #[arg(long)]
    pub all: bool,

    /// Show what would be removed without actually removing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let targets = if args.all {
        let workspace = Workspace::discover()?;
        collect_output_dirs(workspace.root())
    } else {
        let (workspace, _start, graph) = super::discover_graph()?;
        graph
            .loaded
            .iter()
            .map(|prefix| workspace.prefix_to_path(prefix).join(OUTPUT_DIR))
            .filter(|dir| dir.is_dir())
            .collect()
    };

    if targets.is_empty() {
        println!("{} Nothing to clean", out.emoji("✨", "[OK]"));
        return Ok(());
    }

    if args.dry_run {
        println!(
            "{} Would remove {} output director(ies):",
            out.emoji("🔍", "[DRY-RUN]"),
            targets.len()
        );
        for dir in &targets {
            println!("  {}", dir.display());
        }
        return Ok(());
    }

    for dir in &targets {
        log::debug!("removing {}", dir.display());
        fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
    }

    println!(
        "{}",
        out.success(&format!("Removed {} output director(ies)", targets.len()))
    );
    Ok(())
}

/// Every output directory under `root`, in path order.
///
/// The repository marker directory is not descended into, nor are output
/// directories themselves.
fn collect_output_dirs(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() || entry.depth() == 0 {
            continue;
        }
        let name = entry.file_name();
        if name == REPO_MARKER {
            walker.skip_current_dir();
        } else if name == OUTPUT_DIR {
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    found
}
