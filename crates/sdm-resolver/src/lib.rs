//! Dependency resolution engine: picks a revision for every package reachable
//! from a root manifest, walking the manifest graph breadth-first and failing
//! fast on the first unsatisfiable or conflicting requirement.

pub mod cache;
pub mod conflict;
pub mod error;
pub mod graph;
pub mod locator;
pub mod reporter;
pub mod resolver;
pub mod source;

pub use error::ResolutionError;
pub use graph::{ResolvedGraph, ResolvedNode};
pub use reporter::{NullReporter, Reporter, ResolveEvent};
pub use resolver::{Resolution, ResolveOptions, ResolveStats, Resolver};
pub use source::{RefKind, RemoteRef, RevisionSource, SourceError};
