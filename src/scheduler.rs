//! # Scheduling
//!
//! Targets are executed by a readiness scan rather than a precomputed
//! topological order: the scheduler repeatedly walks every pending target in
//! identifier order and executes the ones whose dependencies have all
//! completed, until every discovered target is complete.
//!
//! ## Guarantees
//!
//! - Before anything runs, every dependency is dereferenced. A dependency the
//!   graph does not define fails the run with [`Error::UndefinedTarget`] and
//!   nothing is executed.
//! - Each pass must complete at least one target. A pass that completes
//!   nothing while targets are pending means the pending targets depend on
//!   each other; the run fails with [`Error::CyclicOrMissingDependency`]
//!   naming one such cycle.
//! - A target is executed strictly after all of its dependencies. Among
//!   targets ready at the same time, order is by identifier.
//!
//! ## Execution
//!
//! The work itself is delegated to a [`TargetExecutor`]. With `jobs > 1` the
//! ready batch of each pass runs on a rayon thread pool; the completion set is
//! still only updated by the scheduling thread, after the batch finishes.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::graph::BuildGraph;
use crate::path::TargetId;

/// Trait for running one target's build action - allows mocking in tests
pub trait TargetExecutor: Send + Sync {
    /// Build `target`. Every dependency of `target` has already completed.
    fn execute(&self, target: &TargetId, graph: &BuildGraph) -> Result<()>;
}

/// Executor that does nothing, used to check a graph without building it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExecutor;

impl TargetExecutor for NoopExecutor {
    fn execute(&self, _target: &TargetId, _graph: &BuildGraph) -> Result<()> {
        Ok(())
    }
}

/// Targets whose build action has finished, in completion order.
#[derive(Debug, Clone, Default)]
pub struct CompletionSet {
    members: BTreeSet<TargetId>,
    order: Vec<TargetId>,
}

impl CompletionSet {
    pub fn contains(&self, target: &TargetId) -> bool {
        self.members.contains(target)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Completed targets in the order they finished.
    pub fn order(&self) -> &[TargetId] {
        &self.order
    }

    /// Completed targets as a set.
    pub fn members(&self) -> &BTreeSet<TargetId> {
        &self.members
    }

    fn insert(&mut self, target: TargetId) {
        if self.members.insert(target.clone()) {
            self.order.push(target);
        }
    }
}

/// Runs targets of a [`BuildGraph`] in dependency order.
#[derive(Debug, Clone)]
pub struct Scheduler {
    jobs: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_JOBS)
    }
}

impl Scheduler {
    /// Create a scheduler running at most `jobs` targets at once.
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    /// Execute every discovered target of `graph`.
    pub fn run(&self, graph: &BuildGraph, executor: &dyn TargetExecutor) -> Result<CompletionSet> {
        check_dependencies_defined(graph)?;

        let pool = if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| Error::WorkerPool {
                    message: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        let mut completed = CompletionSet::default();
        let mut pass = 0usize;
        while completed.members() != &graph.discovered {
            pass += 1;
            let before = completed.len();

            match &pool {
                None => run_pass_sequential(graph, executor, &mut completed)?,
                Some(pool) => run_pass_parallel(pool, graph, executor, &mut completed)?,
            }

            log::debug!(
                "pass {}: {} target(s) completed, {} pending",
                pass,
                completed.len() - before,
                graph.discovered.len() - completed.len()
            );

            if completed.len() == before {
                return Err(Error::CyclicOrMissingDependency {
                    cycle: describe_cycle(graph, &completed),
                });
            }
        }

        Ok(completed)
    }
}

fn is_ready(graph: &BuildGraph, target: &TargetId, completed: &CompletionSet) -> bool {
    graph
        .get(target)
        .map(|properties| properties.dependencies.iter().all(|d| completed.contains(d)))
        .unwrap_or(false)
}

fn run_pass_sequential(
    graph: &BuildGraph,
    executor: &dyn TargetExecutor,
    completed: &mut CompletionSet,
) -> Result<()> {
    for target in &graph.discovered {
        if completed.contains(target) || !is_ready(graph, target, completed) {
            continue;
        }
        log::debug!("executing {}", target);
        executor.execute(target, graph)?;
        completed.insert(target.clone());
    }
    Ok(())
}

fn run_pass_parallel(
    pool: &rayon::ThreadPool,
    graph: &BuildGraph,
    executor: &dyn TargetExecutor,
    completed: &mut CompletionSet,
) -> Result<()> {
    let ready: Vec<&TargetId> = graph
        .discovered
        .iter()
        .filter(|target| !completed.contains(target) && is_ready(graph, target, completed))
        .collect();

    let finished = pool.install(|| {
        ready
            .par_iter()
            .map(|target| executor.execute(target, graph).map(|_| *target))
            .collect::<Result<Vec<&TargetId>>>()
    })?;

    for target in finished {
        completed.insert(target.clone());
    }
    Ok(())
}

fn check_dependencies_defined(graph: &BuildGraph) -> Result<()> {
    for target in &graph.discovered {
        let Some(properties) = graph.get(target) else {
            continue;
        };
        if let Some(missing) = properties.dependencies.iter().find(|d| !graph.contains(d)) {
            return Err(Error::UndefinedTarget {
                target: missing.to_string(),
                referenced_by: target.to_string(),
            });
        }
    }
    Ok(())
}

/// Follow pending dependencies from the first pending target until a target
/// repeats, and render the loop.
fn describe_cycle(graph: &BuildGraph, completed: &CompletionSet) -> String {
    let Some(start) = graph.discovered.iter().find(|t| !completed.contains(t)) else {
        return String::new();
    };

    let mut path: Vec<&TargetId> = vec![start];
    let mut current = start;
    loop {
        let next = graph
            .get(current)
            .and_then(|properties| properties.dependencies.iter().find(|d| !completed.contains(d)));
        let Some(next) = next else {
            // Unreachable with a fully-defined graph; report what is pending.
            return graph
                .discovered
                .iter()
                .filter(|t| !completed.contains(t))
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ");
        };

        if let Some(index) = path.iter().position(|t| *t == next) {
            let mut cycle: Vec<String> = path[index..].iter().map(|t| t.to_string()).collect();
            cycle.push(next.to_string());
            return cycle.join(" -> ");
        }
        path.push(next);
        current = next;
    }
}
