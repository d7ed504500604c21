//! Compatibility checks between an already-resolved package and a new request.

use std::fmt;

use sdm_core::specifier::VersionSpecifier;

use crate::graph::ResolvedNode;

/// One point in the graph that asked for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Name of the package whose manifest declared the dependency.
    pub parent: String,
    pub specifier: VersionSpecifier,
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires {}", self.parent, self.specifier)
    }
}

/// Render requesters one per line, indented, for error messages.
pub fn format_requesters(requesters: &[Requester]) -> String {
    requesters
        .iter()
        .map(|r| format!("  {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a new request cannot reuse an existing resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incompatibility {
    Location { resolved: String, requested: String },
    Specifier,
}

/// Check whether `node` can serve a request for `location` at `specifier`.
pub fn check(
    node: &ResolvedNode,
    location: &str,
    specifier: &VersionSpecifier,
) -> Result<(), Incompatibility> {
    if node.location != location {
        return Err(Incompatibility::Location {
            resolved: node.location.clone(),
            requested: location.to_string(),
        });
    }
    if satisfies(node, specifier) {
        Ok(())
    } else {
        Err(Incompatibility::Specifier)
    }
}

/// Whether the resolved revision of `node` satisfies `specifier`.
pub fn satisfies(node: &ResolvedNode, specifier: &VersionSpecifier) -> bool {
    match specifier {
        VersionSpecifier::Branch(branch) => node.branch.as_deref() == Some(branch.as_str()),
        VersionSpecifier::Revision(rev) => same_commit(&node.revision, rev),
        numeric => node.version.as_ref().is_some_and(|v| numeric.matches(v)),
    }
}

/// Commit ids match when equal, or when the shorter one is an abbreviation
/// (at least 7 characters) of the longer.
pub fn same_commit(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short == long || (short.len() >= 7 && long.starts_with(short))
}
