//! # Build Command Implementation
//!
//! This module implements the `build` subcommand, which is also what a bare
//! `xmake` invocation runs. It loads the dependency closure of the current
//! directory's `xmake.yml` and builds every discovered target in dependency
//! order.
//!
//! Every reached target is rebuilt; there is no up-to-date check.

use std::time::Instant;

use anyhow::Result;
use clap::Args;

use xmake::defaults::{DEFAULT_AR, DEFAULT_CXX, DEFAULT_JOBS};
use xmake::output::OutputConfig;
use xmake::scheduler::Scheduler;
use xmake::toolchain::{ToolchainConfig, ToolchainDriver};

/// Build every target reachable from the current directory
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Number of targets to build at the same time.
    ///
    /// Targets only run together when all of their dependencies are already
    /// built.
    #[arg(short, long, value_name = "N", env = "XMAKE_JOBS", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Compiler, also used to link executables.
    #[arg(long, value_name = "PROGRAM", env = "XMAKE_CXX", default_value = DEFAULT_CXX)]
    pub cxx: String,

    /// Archiver used for library targets.
    #[arg(long, value_name = "PROGRAM", env = "XMAKE_AR", default_value = DEFAULT_AR)]
    pub ar: String,

    /// Suppress the header and summary lines
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let start_time = Instant::now();

    let (workspace, start, graph) = super::discover_graph()?;

    if !args.quiet {
        println!(
            "{} Building {}: {} target(s) in {} director(ies)",
            out.emoji("🔨", "[BUILD]"),
            start,
            graph.discovered.len(),
            graph.loaded.len()
        );
    }

    let driver = ToolchainDriver::new(
        workspace,
        ToolchainConfig {
            cxx: args.cxx,
            ar: args.ar,
        },
    );

    match Scheduler::new(args.jobs).run(&graph, &driver) {
        Ok(completed) => {
            if !args.quiet {
                println!(
                    "{}",
                    out.success(&format!(
                        "Built {} target(s) in {:.2}s",
                        completed.len(),
                        start_time.elapsed().as_secs_f64()
                    ))
                );
            }
            Ok(())
        }
        Err(err) => {
            if !args.quiet {
                println!("{}", out.failure("Build failed"));
            }
            Err(err.into())
        }
    }
}
