//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// xmake - Build everything reachable from the current directory's xmake.yml
#[derive(Parser, Debug)]
#[command(name = "xmake")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `build`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Build options used when no subcommand is given
    #[command(flatten)]
    build: commands::build::BuildArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every target reachable from the current directory
    Build(commands::build::BuildArgs),

    /// Show the dependency tree of the current directory's targets
    Graph(commands::graph::GraphArgs),

    /// Check that the dependency closure loads and has no cycles, without building
    Validate(commands::validate::ValidateArgs),

    /// Remove build outputs
    Clean(commands::clean::CleanArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            None => commands::build::execute(self.build, &self.color),
            Some(Commands::Build(args)) => commands::build::execute(args, &self.color),
            Some(Commands::Graph(args)) => commands::graph::execute(args),
            Some(Commands::Validate(args)) => commands::validate::execute(args, &self.color),
            Some(Commands::Clean(args)) => commands::clean::execute(args, &self.color),
            Some(Commands::Completions(args)) => commands::completions::execute(args),
        }
    }
}

/// Route `log` records to stderr, filtered by `--log-level`.
///
/// The level accepts the `RUST_LOG` filter syntax, e.g. `xmake=debug`.
fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp(None)
        .format_target(false)
        .format_level(false)
        .try_init()
        .ok();
}
