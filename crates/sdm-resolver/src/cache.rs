//! Per-run memoization of repository listings and fetched manifests.
//!
//! A fresh [`SessionCache`] and [`VisitedSet`] are created for every call to
//! [`Resolver::resolve`](crate::Resolver::resolve); nothing survives between runs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sdm_core::manifest::Manifest;

use crate::source::{RemoteRef, SourceError};

/// Tags and branches of one repository.
pub type Listing = Arc<Vec<RemoteRef>>;

/// Why the manifest at a `(location, revision)` could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Source(SourceError),
    /// The revision exists but carries no manifest.
    Missing,
    /// The manifest bytes did not decode.
    Decode(String),
}

/// Tracks which `(location, revision)` pairs have had their dependencies
/// enqueued, so cycles in the manifest graph terminate.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<(String, String)>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a pair as visited. Returns `false` if already visited.
    pub fn visit(&mut self, location: &str, revision: &str) -> bool {
        self.visited
            .insert((location.to_string(), revision.to_string()))
    }

    pub fn contains(&self, location: &str, revision: &str) -> bool {
        self.visited
            .contains(&(location.to_string(), revision.to_string()))
    }
}

/// Memoized collaborator results. Failures are cached too, so a failing
/// repository is asked once per run.
#[derive(Debug, Default)]
pub struct SessionCache {
    listings: HashMap<String, Result<Listing, SourceError>>,
    manifests: HashMap<(String, String), Result<Arc<Manifest>, FetchFailure>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(&self, location: &str) -> Option<&Result<Listing, SourceError>> {
        self.listings.get(location)
    }

    pub fn store_listing(&mut self, location: &str, listing: Result<Listing, SourceError>) {
        self.listings.insert(location.to_string(), listing);
    }

    pub fn manifest(
        &self,
        location: &str,
        revision: &str,
    ) -> Option<&Result<Arc<Manifest>, FetchFailure>> {
        self.manifests
            .get(&(location.to_string(), revision.to_string()))
    }

    pub fn store_manifest(
        &mut self,
        location: &str,
        revision: &str,
        manifest: Result<Arc<Manifest>, FetchFailure>,
    ) {
        self.manifests
            .insert((location.to_string(), revision.to_string()), manifest);
    }
}

/// Decode what a source returned for a manifest read.
pub fn decode_manifest(
    fetched: Result<Option<Vec<u8>>, SourceError>,
) -> Result<Arc<Manifest>, FetchFailure> {
    let bytes = fetched.map_err(FetchFailure::Source)?;
    let bytes = bytes.ok_or(FetchFailure::Missing)?;
    Manifest::from_slice(&bytes)
        .map(Arc::new)
        .map_err(|e| FetchFailure::Decode(e.to_string()))
}
