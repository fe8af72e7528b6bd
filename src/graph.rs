//! # Graph Building
//!
//! The build graph is discovered lazily. Only the directory the build starts
//! in is loaded up front; every other rule file is read because some already
//! loaded target depends on a target in that directory.
//!
//! ## Algorithm
//!
//! [`build_graph`] computes a fixpoint over the set of loaded directories:
//!
//! 1. Load the starting directory and seed the graph with its targets.
//! 2. Scan every target in the graph. For each dependency whose directory has
//!    not been loaded yet, load that directory and merge its targets.
//! 3. Repeat the scan until a full pass loads no new directory.
//!
//! The loaded set grows strictly on every pass that does anything and a
//! repository has finitely many directories, so the loop terminates.
//!
//! A dependency naming a target that its directory never defines is not an
//! error here. The scheduler reports it when it dereferences the dependency.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::loader::{RuleLoader, TargetProperties};
use crate::path::{Prefix, TargetId};

/// Every target reachable from the starting directory, plus the bookkeeping
/// of how it was discovered.
#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    /// Properties of every loaded target.
    pub targets: BTreeMap<TargetId, TargetProperties>,
    /// Targets the scheduler has to complete.
    pub discovered: BTreeSet<TargetId>,
    /// Directories whose rule file has been read.
    pub loaded: BTreeSet<Prefix>,
}

impl BuildGraph {
    /// Properties of `target`, if its directory defines it.
    pub fn get(&self, target: &TargetId) -> Option<&TargetProperties> {
        self.targets.get(target)
    }

    pub fn contains(&self, target: &TargetId) -> bool {
        self.targets.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Merge targets loaded from `prefix` into the graph.
    pub fn merge(&mut self, prefix: Prefix, targets: BTreeMap<TargetId, TargetProperties>) {
        self.loaded.insert(prefix);
        self.targets.extend(targets);
    }

    /// Targets declared in the starting directory, i.e. the roots of the
    /// dependency tree.
    pub fn targets_in<'a>(&'a self, prefix: &'a Prefix) -> impl Iterator<Item = &'a TargetId> + 'a {
        self.targets.keys().filter(move |id| id.prefix() == prefix)
    }

    /// Transitive dependencies of `target`, dependents before their
    /// dependencies, each listed once.
    ///
    /// Undefined dependencies are listed but not descended into.
    pub fn transitive_dependencies(&self, target: &TargetId) -> Vec<TargetId> {
        let mut postorder = Vec::new();
        let mut visited = BTreeSet::new();
        if let Some(properties) = self.get(target) {
            for dependency in &properties.dependencies {
                self.visit(dependency, &mut visited, &mut postorder);
            }
        }
        postorder.reverse();
        postorder
    }

    fn visit(&self, target: &TargetId, visited: &mut BTreeSet<TargetId>, postorder: &mut Vec<TargetId>) {
        if !visited.insert(target.clone()) {
            return;
        }
        if let Some(properties) = self.get(target) {
            for dependency in &properties.dependencies {
                self.visit(dependency, visited, postorder);
            }
        }
        postorder.push(target.clone());
    }
}

/// Build the dependency graph reachable from `start`.
pub fn build_graph(loader: &RuleLoader<'_>, start: &Prefix) -> Result<BuildGraph> {
    let mut graph = BuildGraph::default();
    let targets = loader.load_directory(start)?;
    graph.merge(start.clone(), targets);

    let mut passes = 0usize;
    loop {
        passes += 1;
        let pending: BTreeSet<Prefix> = graph
            .targets
            .values()
            .flat_map(|properties| properties.dependencies.iter())
            .map(|dependency| dependency.prefix())
            .filter(|prefix| !graph.loaded.contains(*prefix))
            .cloned()
            .collect();

        graph.discovered.extend(graph.targets.keys().cloned());
        if pending.is_empty() {
            break;
        }

        for prefix in pending {
            let targets = loader.load_directory(&prefix)?;
            graph.merge(prefix, targets);
        }
    }

    log::debug!(
        "graph complete after {} pass(es): {} target(s) in {} director(ies)",
        passes,
        graph.discovered.len(),
        graph.loaded.len()
    );
    Ok(graph)
}
