//! Progress notifications emitted while resolving.

use sdm_core::dependency::Dependency;

use crate::graph::ResolvedNode;

/// Something the resolver did that a front-end may want to show.
#[derive(Debug, Clone, Copy)]
pub enum ResolveEvent<'a> {
    /// Resolution of the root package began.
    Started {
        package: &'a str,
        dependencies: usize,
    },
    /// A package not yet resolved is being located.
    Resolving { dependency: &'a Dependency },
    Resolved { node: &'a ResolvedNode },
    /// An already-resolved package satisfied another requester.
    Reused {
        node: &'a ResolvedNode,
        requested_by: &'a str,
    },
    Finished { packages: usize },
}

/// Receives [`ResolveEvent`]s. Called only from the task driving the walk.
pub trait Reporter: Send + Sync {
    fn report(&self, event: ResolveEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: ResolveEvent<'_>) {}
}
