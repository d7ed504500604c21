//! Core resolution algorithm: breadth-first walk over manifests, first
//! resolution of a name wins, every later request must be compatible with it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use sdm_core::config::BranchPolicy;
use sdm_core::dependency::Dependency;
use sdm_core::lockfile::Lockfile;
use sdm_core::manifest::Manifest;
use sdm_core::specifier::VersionSpecifier;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{decode_manifest, FetchFailure, Listing, SessionCache, VisitedSet};
use crate::conflict::{self, Incompatibility, Requester};
use crate::error::ResolutionError;
use crate::graph::{ResolvedGraph, ResolvedNode};
use crate::locator::{self, LocateError, LocatedRevision};
use crate::reporter::{NullReporter, Reporter, ResolveEvent};
use crate::source::{RefKind, RevisionSource};

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Tuning for a resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub branch_policy: BranchPolicy,
    /// Upper bound on collaborator calls in flight at once.
    pub max_concurrent_fetches: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            branch_policy: BranchPolicy::Refresh,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Collaborator calls made during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub listings: usize,
    pub manifest_fetches: usize,
}

/// The output of a successful resolution.
#[derive(Debug)]
pub struct Resolution {
    pub graph: ResolvedGraph,
    pub stats: ResolveStats,
}

/// Entry in the BFS queue.
struct Request {
    dependency: Dependency,
    /// Name of the package whose manifest declared the dependency.
    parent: String,
}

/// State owned by a single run. Only the task driving [`Resolver::resolve`]
/// touches it; concurrent fetches hand their results back to that task.
struct Run {
    graph: ResolvedGraph,
    requesters: HashMap<String, Vec<Requester>>,
    pending: VecDeque<Request>,
    visited: VisitedSet,
    cache: SessionCache,
    stats: ResolveStats,
    semaphore: Arc<Semaphore>,
}

/// Resolves a root manifest into a [`ResolvedGraph`].
pub struct Resolver {
    source: Arc<dyn RevisionSource>,
    reporter: Arc<dyn Reporter>,
    options: ResolveOptions,
    locked: Option<Lockfile>,
}

impl Resolver {
    pub fn new(source: Arc<dyn RevisionSource>) -> Self {
        Self {
            source,
            reporter: Arc::new(NullReporter),
            options: ResolveOptions::default(),
            locked: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Previous lockfile, consulted only by [`BranchPolicy::Sticky`].
    pub fn with_lockfile(mut self, lockfile: Option<Lockfile>) -> Self {
        self.locked = lockfile;
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve every package reachable from `root`.
    ///
    /// Requests are processed in FIFO order. Each wave (the queue contents at
    /// the start of an iteration) is prefetched concurrently, then merged one
    /// request at a time in queue order, so the outcome and the first reported
    /// error match a purely sequential walk.
    pub async fn resolve(&self, root: &Manifest) -> Result<Resolution, ResolutionError> {
        let root_name = root.package_name();
        self.reporter.report(ResolveEvent::Started {
            package: root_name,
            dependencies: root.dependencies.len(),
        });
        tracing::debug!(
            "resolving {root_name} with {} direct dependencies",
            root.dependencies.len()
        );

        let mut run = Run {
            graph: ResolvedGraph::new(root_name),
            requesters: HashMap::new(),
            pending: root
                .dependencies
                .iter()
                .map(|dependency| Request {
                    dependency: dependency.clone(),
                    parent: root_name.to_string(),
                })
                .collect(),
            visited: VisitedSet::new(),
            cache: SessionCache::new(),
            stats: ResolveStats::default(),
            semaphore: Arc::new(Semaphore::new(self.options.max_concurrent_fetches.max(1))),
        };

        while !run.pending.is_empty() {
            let wave: Vec<Request> = run.pending.drain(..).collect();
            self.prefetch(&mut run, &wave).await;
            for request in wave {
                self.merge(&mut run, request).await?;
            }
        }

        self.reporter.report(ResolveEvent::Finished {
            packages: run.graph.len(),
        });
        tracing::debug!(
            "resolved {} packages ({} listings, {} manifest fetches)",
            run.graph.len(),
            run.stats.listings,
            run.stats.manifest_fetches
        );

        Ok(Resolution {
            graph: run.graph,
            stats: run.stats,
        })
    }

    /// Merge one request into the run state.
    async fn merge(&self, run: &mut Run, request: Request) -> Result<(), ResolutionError> {
        let Request { dependency, parent } = request;
        run.graph
            .add_edge(&parent, &dependency.name, dependency.version.clone());
        let requester = Requester {
            parent: parent.clone(),
            specifier: dependency.version.clone(),
        };

        if dependency.name == run.graph.root_name() {
            tracing::debug!("{parent} depends on the root package {}", dependency.name);
            return Ok(());
        }

        if let Some(existing) = run.graph.get(&dependency.name) {
            return match conflict::check(existing, &dependency.location, &dependency.version) {
                Ok(()) => {
                    tracing::debug!("{} already satisfies {parent}", existing);
                    self.reporter.report(ResolveEvent::Reused {
                        node: existing,
                        requested_by: &parent,
                    });
                    run.requesters
                        .entry(dependency.name.clone())
                        .or_default()
                        .push(requester);
                    Ok(())
                }
                Err(incompatibility) => {
                    match incompatibility {
                        Incompatibility::Location {
                            resolved,
                            requested,
                        } => tracing::debug!(
                            "{} resolved from {resolved} but {parent} wants {requested}",
                            dependency.name
                        ),
                        Incompatibility::Specifier => tracing::debug!(
                            "{existing} does not satisfy {} from {parent}",
                            dependency.version
                        ),
                    }
                    let mut requested_by = run
                        .requesters
                        .remove(&dependency.name)
                        .unwrap_or_default();
                    requested_by.push(requester);
                    Err(ResolutionError::VersionConflict {
                        package: dependency.name,
                        requested_by,
                    })
                }
            };
        }

        self.reporter.report(ResolveEvent::Resolving {
            dependency: &dependency,
        });
        let located = self.locate(run, &dependency).await?;
        let manifest = self
            .manifest(run, &dependency.location, &located.commit)
            .await
            .map_err(|failure| match failure {
                FetchFailure::Source(err) => err.into(),
                FetchFailure::Missing => ResolutionError::ManifestNotFound {
                    package: dependency.name.clone(),
                    revision: located.commit.clone(),
                },
                FetchFailure::Decode(detail) => ResolutionError::ManifestParseError {
                    package: dependency.name.clone(),
                    revision: located.commit.clone(),
                    detail,
                },
            })?;

        if manifest.package_name() != dependency.name {
            tracing::warn!(
                "{} at {} declares package name '{}'",
                dependency.name,
                located.commit,
                manifest.package_name()
            );
        }

        let node = ResolvedNode {
            name: dependency.name.clone(),
            location: dependency.location.clone(),
            revision: located.commit,
            version: located.version,
            branch: match located.kind {
                Some(RefKind::Branch) => located.reference,
                _ => None,
            },
        };
        tracing::debug!("resolved {node} for {parent}");
        self.reporter.report(ResolveEvent::Resolved { node: &node });

        let first_visit = run.visited.visit(&node.location, &node.revision);
        run.graph.insert(node);
        run.requesters.insert(dependency.name.clone(), vec![requester]);

        if first_visit {
            for child in &manifest.dependencies {
                run.pending.push_back(Request {
                    dependency: child.clone(),
                    parent: dependency.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Warm the run cache for every request in `wave` that will need fetching.
    ///
    /// Failures are cached like successes and reported when the request is
    /// merged, so nothing here can change the outcome of the run.
    async fn prefetch(&self, run: &mut Run, wave: &[Request]) {
        let mut names = HashSet::new();
        let fresh: Vec<&Dependency> = wave
            .iter()
            .map(|request| &request.dependency)
            .filter(|dep| {
                dep.name != run.graph.root_name()
                    && !run.graph.contains(&dep.name)
                    && names.insert(dep.name.as_str())
            })
            .collect();

        let mut locations = Vec::new();
        for dep in &fresh {
            if self.needs_listing(dep)
                && run.cache.listing(&dep.location).is_none()
                && !locations.contains(&dep.location)
            {
                locations.push(dep.location.clone());
            }
        }
        self.fetch_listings(run, locations).await;

        let mut targets = Vec::new();
        for dep in &fresh {
            let Some(located) = self.locate_cached(&run.cache, dep) else {
                continue;
            };
            let target = (dep.location.clone(), located.commit);
            if run.cache.manifest(&target.0, &target.1).is_none() && !targets.contains(&target) {
                targets.push(target);
            }
        }
        self.fetch_manifests(run, targets).await;
    }

    async fn fetch_listings(&self, run: &mut Run, locations: Vec<String>) {
        if locations.is_empty() {
            return;
        }
        tracing::debug!("prefetching {} listings", locations.len());

        let mut join_set = JoinSet::new();
        for location in locations {
            let source = Arc::clone(&self.source);
            let sem = Arc::clone(&run.semaphore);
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                let listing = source.list_revisions(&location).await;
                (location, listing)
            });
        }
        while let Some(result) = join_set.join_next().await {
            if let Ok((location, listing)) = result {
                run.stats.listings += 1;
                run.cache.store_listing(&location, listing.map(Arc::new));
            }
        }
    }

    async fn fetch_manifests(&self, run: &mut Run, targets: Vec<(String, String)>) {
        if targets.is_empty() {
            return;
        }
        tracing::debug!("prefetching {} manifests", targets.len());

        let mut join_set = JoinSet::new();
        for (location, revision) in targets {
            let source = Arc::clone(&self.source);
            let sem = Arc::clone(&run.semaphore);
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                let fetched = source.checkout_manifest(&location, &revision).await;
                (location, revision, decode_manifest(fetched))
            });
        }
        while let Some(result) = join_set.join_next().await {
            if let Ok((location, revision, manifest)) = result {
                run.stats.manifest_fetches += 1;
                run.cache.store_manifest(&location, &revision, manifest);
            }
        }
    }

    /// Listing for `location`, from the run cache when possible.
    async fn listing(&self, run: &mut Run, location: &str) -> Result<Listing, ResolutionError> {
        if let Some(cached) = run.cache.listing(location) {
            return cached.clone().map_err(Into::into);
        }
        let listing = self.source.list_revisions(location).await.map(Arc::new);
        run.stats.listings += 1;
        run.cache.store_listing(location, listing.clone());
        listing.map_err(Into::into)
    }

    /// Manifest at `(location, revision)`, from the run cache when possible.
    async fn manifest(
        &self,
        run: &mut Run,
        location: &str,
        revision: &str,
    ) -> Result<Arc<Manifest>, FetchFailure> {
        if let Some(cached) = run.cache.manifest(location, revision) {
            return cached.clone();
        }
        let fetched = decode_manifest(self.source.checkout_manifest(location, revision).await);
        run.stats.manifest_fetches += 1;
        run.cache
            .store_manifest(location, revision, fetched.clone());
        fetched
    }

    async fn locate(
        &self,
        run: &mut Run,
        dependency: &Dependency,
    ) -> Result<LocatedRevision, ResolutionError> {
        if let Some(locked) = self.sticky_revision(dependency) {
            tracing::debug!(
                "keeping locked {} for {}",
                locked.commit,
                dependency.name
            );
            return Ok(locked);
        }
        let listing = if locator::needs_listing(&dependency.version) {
            self.listing(run, &dependency.location).await?
        } else {
            Listing::default()
        };
        locator::locate(&dependency.version, &listing).map_err(|err| match err {
            LocateError::NoMatchingVersion => ResolutionError::NoMatchingVersion {
                package: dependency.name.clone(),
                specifier: dependency.version.clone(),
            },
            LocateError::MissingBranch(branch) => ResolutionError::RevisionNotFound {
                location: dependency.location.clone(),
                revision: branch,
            },
        })
    }

    /// Same choice as [`Self::locate`], without fetching anything.
    fn locate_cached(&self, cache: &SessionCache, dependency: &Dependency) -> Option<LocatedRevision> {
        if let Some(locked) = self.sticky_revision(dependency) {
            return Some(locked);
        }
        if !locator::needs_listing(&dependency.version) {
            return locator::locate(&dependency.version, &[]).ok();
        }
        match cache.listing(&dependency.location)? {
            Ok(listing) => locator::locate(&dependency.version, listing).ok(),
            Err(_) => None,
        }
    }

    fn needs_listing(&self, dependency: &Dependency) -> bool {
        locator::needs_listing(&dependency.version) && self.sticky_revision(dependency).is_none()
    }

    /// Under [`BranchPolicy::Sticky`], the commit locked for the same name,
    /// location and branch.
    fn sticky_revision(&self, dependency: &Dependency) -> Option<LocatedRevision> {
        if self.options.branch_policy != BranchPolicy::Sticky {
            return None;
        }
        let VersionSpecifier::Branch(branch) = &dependency.version else {
            return None;
        };
        let locked = self.locked.as_ref()?.find(&dependency.name)?;
        if locked.location != dependency.location || locked.branch.as_deref() != Some(branch.as_str()) {
            return None;
        }
        Some(LocatedRevision {
            commit: locked.revision.clone(),
            version: None,
            reference: Some(branch.clone()),
            kind: Some(RefKind::Branch),
        })
    }
}
