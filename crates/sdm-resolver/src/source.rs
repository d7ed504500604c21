//! Contract between the resolver and the version-control layer.

use async_trait::async_trait;
use thiserror::Error;

/// Whether a remote reference is a tag or a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Tag,
    Branch,
}

/// A tag or branch exposed by a repository, with the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub kind: RefKind,
    pub commit: String,
}

impl RemoteRef {
    pub fn tag(name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Tag,
            commit: commit.into(),
        }
    }

    pub fn branch(name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Branch,
            commit: commit.into(),
        }
    }
}

/// Failures reported by a [`RevisionSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("repository {location} is unreachable: {detail}")]
    RepositoryUnreachable { location: String, detail: String },

    #[error("revision {revision} not found in {location}")]
    RevisionNotFound { location: String, revision: String },
}

/// Access to remote repositories.
///
/// Implementations own whatever handles or working copies they need and must
/// release them on every exit path; the resolver only ever sees names, commits
/// and raw manifest bytes.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// List the tags and branches published at `location`.
    async fn list_revisions(&self, location: &str) -> Result<Vec<RemoteRef>, SourceError>;

    /// Read the manifest file at `revision`. `Ok(None)` means the revision
    /// exists but has no manifest.
    async fn checkout_manifest(
        &self,
        location: &str,
        revision: &str,
    ) -> Result<Option<Vec<u8>>, SourceError>;
}
