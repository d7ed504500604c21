//! Picks the revision a [`VersionSpecifier`] selects from a repository's refs.

use sdm_core::specifier::VersionSpecifier;
use sdm_core::version::SemanticVersion;

use crate::source::{RefKind, RemoteRef};

/// The revision chosen for a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRevision {
    pub commit: String,
    /// Set when the revision was chosen through a version tag.
    pub version: Option<SemanticVersion>,
    /// The tag or branch name the commit was reached through.
    pub reference: Option<String>,
    pub kind: Option<RefKind>,
}

/// Why no revision could be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// No version tag satisfies a numeric specifier.
    NoMatchingVersion,
    /// The pinned branch does not exist.
    MissingBranch(String),
}

/// Whether locating `specifier` needs the repository's ref listing.
pub fn needs_listing(specifier: &VersionSpecifier) -> bool {
    !matches!(specifier, VersionSpecifier::Revision(_))
}

/// Choose the revision `specifier` selects among `refs`.
///
/// Numeric specifiers pick the greatest matching version tag; tags that don't
/// parse as versions are skipped. Tags that parse to equal versions are
/// ordered by their name so the choice never depends on listing order.
pub fn locate(
    specifier: &VersionSpecifier,
    refs: &[RemoteRef],
) -> Result<LocatedRevision, LocateError> {
    match specifier {
        VersionSpecifier::Revision(commit) => Ok(LocatedRevision {
            commit: commit.clone(),
            version: None,
            reference: None,
            kind: None,
        }),
        VersionSpecifier::Branch(branch) => refs
            .iter()
            .find(|r| r.kind == RefKind::Branch && r.name == *branch)
            .map(|r| LocatedRevision {
                commit: r.commit.clone(),
                version: None,
                reference: Some(r.name.clone()),
                kind: Some(RefKind::Branch),
            })
            .ok_or_else(|| LocateError::MissingBranch(branch.clone())),
        numeric => best_tag(numeric, refs)
            .map(|(version, tag)| LocatedRevision {
                commit: tag.commit.clone(),
                version: Some(version),
                reference: Some(tag.name.clone()),
                kind: Some(RefKind::Tag),
            })
            .ok_or(LocateError::NoMatchingVersion),
    }
}

fn best_tag<'a>(
    specifier: &VersionSpecifier,
    refs: &'a [RemoteRef],
) -> Option<(SemanticVersion, &'a RemoteRef)> {
    refs.iter()
        .filter(|r| r.kind == RefKind::Tag)
        .filter_map(|r| {
            let version = SemanticVersion::parse(&r.name);
            if version.is_none() {
                tracing::trace!("skipping non-version tag {}", r.name);
            }
            version.map(|v| (v, r))
        })
        .filter(|(v, _)| specifier.matches(v))
        .max_by(|(va, ra), (vb, rb)| va.cmp(vb).then_with(|| ra.name.cmp(&rb.name)))
}
