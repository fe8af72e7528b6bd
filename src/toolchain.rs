//! # Toolchain Driver
//!
//! [`ToolchainDriver`] is the production [`TargetExecutor`]. For one target it:
//!
//! 1. creates the target's `.out` directory,
//! 2. compiles every source into an object that mirrors the source path under
//!    the target's own `.out/.objs/<name>` tree,
//! 3. either links an executable from its own objects plus the archives of all
//!    transitive library dependencies, or archives its own objects into a
//!    library. Dependency archives are never copied into another archive.
//!
//! The driver builds command lines; a [`CommandRunner`] executes them. The
//! default runner spawns the process and waits for it; tests swap in a
//! recording runner.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::defaults::{ARCHIVE_FLAGS, DEFAULT_AR, DEFAULT_CXX, OPT_FLAG, STD_FLAG, THREAD_FLAG};
use crate::error::{Error, Result};
use crate::graph::BuildGraph;
use crate::path::{TargetId, Workspace};
use crate::scheduler::TargetExecutor;

/// One kind of toolchain invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Compile,
    Archive,
    Link,
}

impl Step {
    /// Short tag printed in front of each command line.
    pub fn label(self) -> &'static str {
        match self {
            Step::Compile => "CC",
            Step::Archive => "AR",
            Step::Link => "LK",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Compile => "compile",
            Step::Archive => "archive",
            Step::Link => "link",
        };
        f.write_str(name)
    }
}

/// Trait for running toolchain commands - allows mocking in tests
pub trait CommandRunner: Send + Sync {
    /// Run `command` (program first) to completion on behalf of `target`.
    fn run(&self, target: &TargetId, step: Step, command: &[String]) -> Result<()>;
}

/// Runs commands as child processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, target: &TargetId, step: Step, command: &[String]) -> Result<()> {
        let line = command.join(" ");
        log::info!("[{}] {}", step.label(), line);

        let failure = |status: String, stderr: String| Error::ToolchainInvocation {
            target: target.to_string(),
            step: step.to_string(),
            command: line.clone(),
            status,
            stderr,
        };

        let (program, args) = command
            .split_first()
            .ok_or_else(|| failure("empty command".to_string(), String::new()))?;

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| failure(format!("failed to start `{}`: {}", program, e), String::new()))?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(failure(output.status.to_string(), diagnostics));
        }
        if !diagnostics.trim().is_empty() {
            log::warn!("{} ({}):\n{}", target, step, diagnostics.trim_end());
        }
        Ok(())
    }
}

/// Programs used for compiling, archiving and linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Compiler, also used as the link driver.
    pub cxx: String,
    /// Archiver.
    pub ar: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cxx: DEFAULT_CXX.to_string(),
            ar: DEFAULT_AR.to_string(),
        }
    }
}

/// Compiles, archives and links targets with a fixed native toolchain.
pub struct ToolchainDriver {
    workspace: Workspace,
    config: ToolchainConfig,
    runner: Box<dyn CommandRunner>,
}

impl fmt::Debug for ToolchainDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolchainDriver")
            .field("workspace", &self.workspace)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ToolchainDriver {
    /// Create a driver that spawns real processes.
    pub fn new(workspace: Workspace, config: ToolchainConfig) -> Self {
        Self::with_runner(workspace, config, Box::new(ProcessRunner))
    }

    /// Create a driver with a custom command runner.
    pub fn with_runner(
        workspace: Workspace,
        config: ToolchainConfig,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            workspace,
            config,
            runner,
        }
    }

    /// `<cxx> -O3 -std=c++20 -I<root> -c <source> -o <object>`
    pub fn compile_command(&self, source: &Path, object: &Path) -> Vec<String> {
        vec![
            self.config.cxx.clone(),
            OPT_FLAG.to_string(),
            STD_FLAG.to_string(),
            format!("-I{}", self.workspace.root().display()),
            "-c".to_string(),
            path_arg(source),
            "-o".to_string(),
            path_arg(object),
        ]
    }

    /// `<ar> rcs <archive> <objects...>`
    pub fn archive_command(&self, archive: &Path, objects: &[PathBuf]) -> Vec<String> {
        let mut command = vec![
            self.config.ar.clone(),
            ARCHIVE_FLAGS.to_string(),
            path_arg(archive),
        ];
        command.extend(objects.iter().map(|p| path_arg(p)));
        command
    }

    /// `<cxx> -pthread -o <output> <inputs...>`
    pub fn link_command(&self, output: &Path, inputs: &[PathBuf]) -> Vec<String> {
        let mut command = vec![
            self.config.cxx.clone(),
            THREAD_FLAG.to_string(),
            "-o".to_string(),
            path_arg(output),
        ];
        command.extend(inputs.iter().map(|p| path_arg(p)));
        command
    }

    /// Archives of every library `target` depends on, directly or not.
    ///
    /// Dependents come before their dependencies so that a single left-to-right
    /// pass of the linker resolves every symbol. Executable dependencies only
    /// order the build and contribute nothing.
    pub fn dependency_archives(&self, target: &TargetId, graph: &BuildGraph) -> Vec<PathBuf> {
        graph
            .transitive_dependencies(target)
            .into_iter()
            .filter(|dependency| match graph.get(dependency) {
                Some(properties) if properties.is_executable => {
                    log::debug!("{}: {} is an executable, not linked", target, dependency);
                    false
                }
                Some(_) => true,
                None => false,
            })
            .map(|dependency| self.workspace.output_location(&dependency).archive())
            .collect()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl TargetExecutor for ToolchainDriver {
    fn execute(&self, target: &TargetId, graph: &BuildGraph) -> Result<()> {
        let properties = graph.get(target).ok_or_else(|| Error::UndefinedTarget {
            target: target.to_string(),
            referenced_by: target.prefix().to_string(),
        })?;
        log::info!("[Doing] {}", target);

        let location = self.workspace.output_location(target);
        fs::create_dir_all(&location.dir)?;
        let directory = self.workspace.prefix_to_path(target.prefix());

        let mut objects = Vec::with_capacity(properties.sources.len());
        for source in &properties.sources {
            let object = location.object_for(source);
            if let Some(parent) = object.parent() {
                fs::create_dir_all(parent)?;
            }
            let command = self.compile_command(&directory.join(source), &object);
            self.runner.run(target, Step::Compile, &command)?;
            objects.push(object);
        }

        if properties.is_executable {
            let mut inputs = objects;
            inputs.extend(self.dependency_archives(target, graph));
            let command = self.link_command(&location.executable(), &inputs);
            self.runner.run(target, Step::Link, &command)
        } else {
            let archive = location.archive();
            if archive.exists() {
                fs::remove_file(&archive)?;
            }
            let command = self.archive_command(&archive, &objects);
            self.runner.run(target, Step::Archive, &command)
        }
    }
}
