//! # Graph Command Implementation
//!
//! This module implements the `graph` subcommand, which prints the dependency
//! tree of the current directory's targets.
//!
//! A target whose subtree was already printed is marked with `(*)` instead of
//! being expanded again; a dependency looping back to one of its ancestors is
//! marked `(cycle)`; a dependency its directory does not define is marked
//! `(undefined)`.
//!
//! This command is a safe, read-only operation that does not run the
//! toolchain.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use xmake::graph::BuildGraph;
use xmake::path::TargetId;

/// Display the dependency tree
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree. Use 0 to show only the
    /// current directory's targets.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `graph` command.
pub fn execute(args: GraphArgs) -> Result<()> {
    let (_workspace, start, graph) = super::discover_graph()?;

    let tree = build_tree(&graph, start.to_string(), graph.targets_in(&start), args.depth);
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// Build the display tree rooted at `roots`.
fn build_tree<'a>(
    graph: &BuildGraph,
    label: String,
    roots: impl Iterator<Item = &'a TargetId>,
    depth: Option<usize>,
) -> TreeNode {
    let max_depth = depth.unwrap_or(usize::MAX);
    let mut expanded = BTreeSet::new();
    let mut ancestors = Vec::new();
    let children = roots
        .map(|target| build_tree_node(graph, target, max_depth, 0, &mut expanded, &mut ancestors))
        .collect();
    TreeNode { label, children }
}

fn build_tree_node(
    graph: &BuildGraph,
    target: &TargetId,
    max_depth: usize,
    current_depth: usize,
    expanded: &mut BTreeSet<TargetId>,
    ancestors: &mut Vec<TargetId>,
) -> TreeNode {
    let Some(properties) = graph.get(target) else {
        return TreeNode::leaf(format!("{} (undefined)", target));
    };
    let kind = if properties.is_executable {
        "executable"
    } else {
        "library"
    };
    let label = format!("{} [{}]", target, kind);

    if ancestors.contains(target) {
        return TreeNode::leaf(format!("{} (cycle)", label));
    }
    if properties.dependencies.is_empty() || current_depth >= max_depth {
        return TreeNode::leaf(label);
    }
    if !expanded.insert(target.clone()) {
        return TreeNode::leaf(format!("{} (*)", label));
    }

    ancestors.push(target.clone());
    let children = properties
        .dependencies
        .iter()
        .map(|dependency| {
            build_tree_node(
                graph,
                dependency,
                max_depth,
                current_depth + 1,
                expanded,
                ancestors,
            )
        })
        .collect();
    ancestors.pop();

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
