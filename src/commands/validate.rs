//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which loads the
//! dependency closure of the current directory and checks that every
//! target can be scheduled, without running the toolchain.
//!
//! ## Functionality
//!
//! - **Rule Validation**: Every rule file in the closure is parsed and every
//!   target record is checked for required keys and valid values.
//! - **Reference Validation**: Every dependency must name a target its
//!   directory defines.
//! - **Cycle Detection**: A scheduling dry run with a no-op executor reports
//!   the first dependency cycle found.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;

use xmake::output::OutputConfig;
use xmake::scheduler::{NoopExecutor, Scheduler};

/// Check rule files and dependencies without building
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Print the order targets would be built in.
    #[arg(long)]
    pub show_order: bool,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let (_workspace, start, graph) = super::discover_graph()?;
    println!(
        "{} Validating {}: {} rule file(s) loaded",
        out.emoji("🔍", "[SCAN]"),
        start,
        graph.loaded.len()
    );

    let completed = match Scheduler::default().run(&graph, &NoopExecutor) {
        Ok(completed) => completed,
        Err(err) => {
            println!("{}", out.failure("Validation failed"));
            return Err(err.into());
        }
    };

    if args.show_order {
        for (position, target) in completed.order().iter().enumerate() {
            println!("  {:>3}. {}", position + 1, target);
        }
    }

    println!(
        "{}",
        out.success(&format!("{} target(s) can be built", completed.len()))
    );
    Ok(())
}
