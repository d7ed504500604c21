//! The resolved package set and the dependency edges between packages.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use sdm_core::lockfile::{LockedPackage, Lockfile};
use sdm_core::specifier::VersionSpecifier;
use sdm_core::version::SemanticVersion;

/// A package pinned to a concrete revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub name: String,
    pub location: String,
    /// Commit identifier.
    pub revision: String,
    /// `None` for branch and revision pins.
    pub version: Option<SemanticVersion>,
    /// Branch the revision was taken from, for branch pins.
    pub branch: Option<String>,
}

impl ResolvedNode {
    /// Commit id shortened to 7 characters for display.
    pub fn short_revision(&self) -> &str {
        self.revision.get(..7).unwrap_or(&self.revision)
    }
}

impl fmt::Display for ResolvedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, &self.branch) {
            (Some(v), _) => write!(f, "{} {v} ({})", self.name, self.short_revision()),
            (None, Some(b)) => write!(f, "{} @{b} ({})", self.name, self.short_revision()),
            (None, None) => write!(f, "{} ({})", self.name, self.short_revision()),
        }
    }
}

/// Edge label: the specifier the parent declared for the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEdge {
    pub specifier: VersionSpecifier,
}

/// Resolved packages keyed by name, plus every declared `parent -> child` edge.
///
/// The root package is a graph vertex without a [`ResolvedNode`]. Edges are
/// recorded for every declaration, including ones pointing back at packages
/// already resolved, so cycles remain visible.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    graph: DiGraph<String, DepEdge>,
    index: HashMap<String, NodeIndex>,
    nodes: BTreeMap<String, ResolvedNode>,
    root: NodeIndex,
}

impl ResolvedGraph {
    pub fn new(root_name: &str) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(root_name.to_string());
        let mut index = HashMap::new();
        index.insert(root_name.to_string(), root);
        Self {
            graph,
            index,
            nodes: BTreeMap::new(),
            root,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.graph[self.root]
    }

    fn vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record a resolved package. The first insertion for a name wins.
    pub fn insert(&mut self, node: ResolvedNode) {
        self.vertex(&node.name);
        self.nodes.entry(node.name.clone()).or_insert(node);
    }

    /// Record a dependency edge. Repeated `parent -> child` pairs are kept once.
    pub fn add_edge(&mut self, parent: &str, child: &str, specifier: VersionSpecifier) {
        let from = self.vertex(parent);
        let to = self.vertex(child);
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, DepEdge { specifier });
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// All resolved packages, sorted by name (the root is not included).
    pub fn nodes(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.nodes.values()
    }

    /// All `(parent, child)` edges in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                )
            })
            .collect()
    }

    /// Direct dependencies of a package, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> Vec<(&str, &VersionSpecifier)> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), self.graph[e.target()].as_str(), &e.weight().specifier))
            .collect();
        deps.sort_by_key(|(id, _, _)| *id);
        deps.into_iter().map(|(_, n, s)| (n, s)).collect()
    }

    /// Packages that declare a dependency on `name`.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), self.graph[e.source()].as_str()))
            .collect();
        deps.sort_by_key(|(id, _)| *id);
        deps.into_iter().map(|(_, n)| n).collect()
    }

    /// Dependency cycles: every strongly connected component with more than
    /// one package, or a single package depending on itself. Each cycle is
    /// sorted by name, and the list of cycles is sorted too.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc
                        .first()
                        .is_some_and(|&idx| self.graph.contains_edge(idx, idx))
            })
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Number of resolved packages (excluding root).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Derive the lockfile: one entry per resolved package.
    pub fn to_lockfile(&self) -> Lockfile {
        let packages = self
            .nodes
            .values()
            .map(|node| LockedPackage {
                name: node.name.clone(),
                location: node.location.clone(),
                revision: node.revision.clone(),
                version: node.version.as_ref().map(ToString::to_string),
                branch: node.branch.clone(),
                dependencies: self
                    .dependencies_of(&node.name)
                    .into_iter()
                    .map(|(child, _)| child.to_string())
                    .collect(),
            })
            .collect();
        Lockfile::generate(packages)
    }

    fn label(&self, idx: NodeIndex) -> String {
        let name = &self.graph[idx];
        match self.nodes.get(name) {
            Some(node) => node.to_string(),
            None => name.clone(),
        }
    }

    /// Print the dependency tree to a string.
    ///
    /// A package already on the current path is printed once more with a
    /// `(cycle)` marker and not expanded again.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.label(self.root)));

        let mut visited = HashSet::new();
        visited.insert(self.root);

        let deps = self.child_indices(self.root);
        let count = deps.len();
        for (i, idx) in deps.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(&mut output, idx, "", is_last, 1, max_depth, &mut visited);
        }

        output
    }

    fn child_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    fn parent_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), e.source()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, source)| source).collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        if visited.contains(&idx) {
            output.push_str(&format!("{prefix}{connector}{} (cycle)\n", self.label(idx)));
            return;
        }
        output.push_str(&format!("{prefix}{connector}{}\n", self.label(idx)));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        visited.insert(idx);
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.child_indices(idx);
        let count = deps.len();
        for (i, child) in deps.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                child,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }
        visited.remove(&idx);
    }

    /// Find a path of package names from the root to `target`.
    pub fn find_path(&self, target: &str) -> Option<Vec<&str>> {
        let target = *self.index.get(target)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| self.graph[idx].as_str()).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.child_indices(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Build an inverted dependency tree (who depends on `target`, transitively).
    pub fn print_inverted_tree(&self, target: &str) -> String {
        let mut output = String::new();
        let Some(&idx) = self.index.get(target) else {
            return output;
        };

        output.push_str(&format!("{}\n", self.label(idx)));

        let mut visited = HashSet::new();
        visited.insert(idx);

        let dependents = self.parent_indices(idx);
        let count = dependents.len();
        for (i, dep_idx) in dependents.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(&mut output, dep_idx, "", is_last, &mut visited);
        }

        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.label(idx)));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.parent_indices(idx);
        let count = dependents.len();
        for (i, dep_idx) in dependents.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(output, dep_idx, &child_prefix, is_last, visited);
        }

        visited.remove(&idx);
    }
}
