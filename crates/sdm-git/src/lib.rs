//! Version-control collaborator backed by the `git` executable.
//!
//! [`GitSource`] implements [`sdm_resolver::RevisionSource`]: remote refs come
//! from `git ls-remote`, manifests are read out of blob-filtered clones held in
//! temporary directories for the lifetime of the source.

pub mod checkout;
pub mod remote;
pub mod source;

pub use source::GitSource;
