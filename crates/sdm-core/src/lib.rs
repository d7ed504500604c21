//! Core data types for the sdm dependency manager.
//!
//! This crate defines the values the resolver consumes and produces:
//! semantic versions, version specifiers, dependency declarations, manifests,
//! lockfiles, and global configuration.
//!
//! This crate is intentionally free of async code and network I/O.

/// File name of a package manifest, both in the project and inside dependencies.
pub const MANIFEST_FILE: &str = "Sdm.toml";

/// File name of the lockfile written next to the project manifest.
pub const LOCKFILE_FILE: &str = "Sdm.lock";

pub mod config;
pub mod dependency;
pub mod lockfile;
pub mod manifest;
pub mod specifier;
pub mod version;
