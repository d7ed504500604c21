//! Errors that abort a resolution run.

use miette::Diagnostic;
use sdm_core::specifier::VersionSpecifier;
use thiserror::Error;

use crate::conflict::{format_requesters, Requester};
use crate::source::SourceError;

/// The first problem encountered while walking the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolutionError {
    #[error("no version of '{package}' matches {specifier}")]
    #[diagnostic(
        code(sdm::resolve::no_matching_version),
        help("Check the tags published by the repository or relax the requirement")
    )]
    NoMatchingVersion {
        package: String,
        specifier: VersionSpecifier,
    },

    #[error("conflicting requirements for '{package}':\n{}", format_requesters(.requested_by))]
    #[diagnostic(
        code(sdm::resolve::version_conflict),
        help("Align the requirements so a single revision satisfies all of them")
    )]
    VersionConflict {
        package: String,
        requested_by: Vec<Requester>,
    },

    #[error("'{package}' has no Sdm.toml at revision {revision}")]
    #[diagnostic(code(sdm::resolve::manifest_not_found))]
    ManifestNotFound { package: String, revision: String },

    #[error("failed to parse Sdm.toml of '{package}' at revision {revision}: {detail}")]
    #[diagnostic(code(sdm::resolve::manifest_parse_error))]
    ManifestParseError {
        package: String,
        revision: String,
        detail: String,
    },

    #[error("repository {location} is unreachable: {detail}")]
    #[diagnostic(
        code(sdm::resolve::repository_unreachable),
        help("Check the location and your network connection")
    )]
    RepositoryUnreachable { location: String, detail: String },

    #[error("revision {revision} not found in {location}")]
    #[diagnostic(code(sdm::resolve::revision_not_found))]
    RevisionNotFound { location: String, revision: String },
}

impl From<SourceError> for ResolutionError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::RepositoryUnreachable { location, detail } => {
                Self::RepositoryUnreachable { location, detail }
            }
            SourceError::RevisionNotFound { location, revision } => {
                Self::RevisionNotFound { location, revision }
            }
        }
    }
}
