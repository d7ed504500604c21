use serde::{Deserialize, Serialize};

use crate::specifier::VersionSpecifier;

/// A dependency declaration in `Sdm.toml`.
///
/// Identified by `(name, location)`; `location` is a git URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(alias = "git")]
    pub location: String,
    pub version: VersionSpecifier,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        version: VersionSpecifier,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            version,
        }
    }

    /// Whether both declarations point at the same repository.
    pub fn same_source(&self, other: &Dependency) -> bool {
        self.name == other.name && self.location == other.location
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.location, self.version)
    }
}
