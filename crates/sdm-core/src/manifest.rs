use serde::{Deserialize, Serialize};
use std::path::Path;

use sdm_util::errors::SdmError;

use crate::dependency::Dependency;
use crate::specifier::VersionSpecifier;

/// The parsed representation of an `Sdm.toml` file.
///
/// Dependencies keep their declaration order; the resolver walks them in
/// exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageMetadata,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Package identity from the `[package]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, dependencies: Vec<Dependency>) -> Self {
        Self {
            package: PackageMetadata {
                name: name.into(),
                description: None,
            },
            dependencies,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package.name
    }

    /// Load and parse an `Sdm.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SdmError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::from_str(&content)?)
    }

    /// Parse an `Sdm.toml` from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SdmError> {
        let manifest: Self = toml::from_str(content).map_err(|e| SdmError::Manifest {
            message: format!("Failed to parse Sdm.toml: {e}"),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Decode manifest bytes read out of a repository.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SdmError> {
        let content = std::str::from_utf8(bytes).map_err(|e| SdmError::Manifest {
            message: format!("Sdm.toml is not valid UTF-8: {e}"),
        })?;
        Self::from_str(content)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, SdmError> {
        toml::to_string_pretty(self).map_err(|e| SdmError::Manifest {
            message: format!("Failed to serialize manifest: {e}"),
        })
    }

    fn validate(&self) -> Result<(), SdmError> {
        if !is_plain_name(&self.package.name) {
            return Err(SdmError::Manifest {
                message: format!(
                    "package name '{}' must be a single path component (no '/', '\\', '.' or '..')",
                    self.package.name
                ),
            });
        }

        for dep in &self.dependencies {
            if dep.name.trim().is_empty() || dep.location.trim().is_empty() {
                return Err(SdmError::Manifest {
                    message: format!(
                        "dependency entries need a name and a location (got name '{}', location '{}')",
                        dep.name, dep.location
                    ),
                });
            }
            if !is_plain_name(&dep.name) {
                return Err(SdmError::Manifest {
                    message: format!(
                        "dependency name '{}' must be a single path component (no '/', '\\', '.' or '..')",
                        dep.name
                    ),
                });
            }
            if dep.location.starts_with('-') {
                return Err(SdmError::Manifest {
                    message: format!("dependency '{}' has invalid location '{}'", dep.name, dep.location),
                });
            }
            if let VersionSpecifier::Branch(r) | VersionSpecifier::Revision(r) = &dep.version {
                if r.trim().is_empty() || r.starts_with('-') {
                    return Err(SdmError::Manifest {
                        message: format!("dependency '{}' pins invalid ref '{r}'", dep.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A name usable as one directory entry: `.sdm/checkouts/<name>`.
pub fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}