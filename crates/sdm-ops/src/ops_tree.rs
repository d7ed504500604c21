//! Operation: display the dependency tree.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use sdm_resolver::ResolvedGraph;

use crate::project::Project;
use crate::reporter::ConsoleReporter;
use crate::{resolve_project, ResolveSettings};

/// Options for `sdm tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show one path from the root to this package.
    pub why: Option<String>,
    /// Show everything that depends on this package.
    pub inverted: Option<String>,
    /// List dependency cycles instead of the tree.
    pub cycles: bool,
}

/// Display the dependency tree for the project.
pub async fn tree(
    project_root: &Path,
    settings: &ResolveSettings,
    opts: &TreeOptions,
) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let reporter = Arc::new(ConsoleReporter::new(settings.output_format));
    let options = settings.options(&project.config);
    let (resolution, _source) = resolve_project(&project, options, reporter).await?;

    print!("{}", render(&resolution.graph, opts));
    Ok(())
}

/// Render whichever view `opts` selects.
pub fn render(graph: &ResolvedGraph, opts: &TreeOptions) -> String {
    if let Some(target) = &opts.why {
        return match graph.find_path(target) {
            Some(path) => {
                let mut out = format!("Path to {target}:\n");
                for (i, name) in path.iter().enumerate() {
                    let _ = writeln!(out, "{}{name}", "  ".repeat(i));
                }
                out
            }
            None => format!("Dependency '{target}' not found in the graph.\n"),
        };
    }

    if let Some(target) = &opts.inverted {
        let out = graph.print_inverted_tree(target);
        return if out.is_empty() {
            format!("Dependency '{target}' not found in the graph.\n")
        } else {
            out
        };
    }

    if opts.cycles {
        let cycles = graph.cycles();
        if cycles.is_empty() {
            return "No dependency cycles.\n".to_string();
        }
        let mut out = String::new();
        for members in &cycles {
            let path = cycle_path(graph, members);
            let _ = writeln!(out, "{}", path.join(" -> "));
        }
        return out;
    }

    graph.print_tree(opts.depth)
}

/// A closed walk through one strongly connected component, starting and
/// ending at its first member. Only edges between members are followed.
fn cycle_path<'a>(graph: &'a ResolvedGraph, members: &'a [String]) -> Vec<&'a str> {
    let Some(start) = members.first().map(String::as_str) else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut visited = HashSet::from([start]);
    if walk_back_to(graph, members, start, &mut path, &mut visited) {
        path
    } else {
        // Members of one component always reach each other; keep the set.
        members.iter().map(String::as_str).collect()
    }
}

fn walk_back_to<'a>(
    graph: &'a ResolvedGraph,
    members: &[String],
    start: &'a str,
    path: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> bool {
    let Some(&current) = path.last() else {
        return false;
    };
    for (next, _) in graph.dependencies_of(current) {
        if next == start {
            path.push(start);
            return true;
        }
        if !members.iter().any(|m| m == next) || !visited.insert(next) {
            continue;
        }
        path.push(next);
        if walk_back_to(graph, members, start, path, visited) {
            return true;
        }
        path.pop();
    }
    false
}
