//! Version constraints declared on a dependency.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::SemanticVersion;

/// A constraint selecting the acceptable versions or revisions of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpecifierRepr", into = "SpecifierRepr")]
pub enum VersionSpecifier {
    Exact(SemanticVersion),
    Range(VersionRange),
    /// `v >= from` within the same major version.
    UpToNextMajor(SemanticVersion),
    /// `v >= from` within the same major and minor version.
    UpToNextMinor(SemanticVersion),
    /// A named branch, matched by name and never ordered.
    Branch(String),
    /// A fixed commit, never re-resolved.
    Revision(String),
}

/// Half-open range `[lower, upper)`. Construction guarantees `lower < upper`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: SemanticVersion,
    upper: SemanticVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("empty version range: lower bound {lower} is not below upper bound {upper}")]
pub struct InvalidRange {
    pub lower: SemanticVersion,
    pub upper: SemanticVersion,
}

impl VersionRange {
    pub fn new(lower: SemanticVersion, upper: SemanticVersion) -> Result<Self, InvalidRange> {
        if lower < upper {
            Ok(Self { lower, upper })
        } else {
            Err(InvalidRange { lower, upper })
        }
    }

    /// Inclusive lower bound.
    pub fn lower(&self) -> &SemanticVersion {
        &self.lower
    }

    /// Exclusive upper bound.
    pub fn upper(&self) -> &SemanticVersion {
        &self.upper
    }
}

impl VersionSpecifier {
    /// Shorthand for a validated [`VersionSpecifier::Range`].
    pub fn range(lower: SemanticVersion, upper: SemanticVersion) -> Result<Self, InvalidRange> {
        VersionRange::new(lower, upper).map(Self::Range)
    }

    /// True for specifiers that select among tagged versions.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Branch(_) | Self::Revision(_))
    }

    /// The smallest version a numeric specifier accepts.
    pub fn lower_bound(&self) -> Option<&SemanticVersion> {
        match self {
            Self::Exact(v) | Self::UpToNextMajor(v) | Self::UpToNextMinor(v) => Some(v),
            Self::Range(r) => Some(&r.lower),
            Self::Branch(_) | Self::Revision(_) => None,
        }
    }

    /// Whether `version` satisfies this specifier.
    ///
    /// Pre-releases are opt-in: ranges and `upToNext*` specifiers only accept
    /// them when their own lower bound is a pre-release. Branch and revision
    /// specifiers never match a version.
    pub fn matches(&self, version: &SemanticVersion) -> bool {
        let allows_pre_release = self
            .lower_bound()
            .is_some_and(SemanticVersion::is_pre_release);
        match self {
            Self::Exact(v) => version == v,
            Self::Range(r) => {
                (allows_pre_release || !version.is_pre_release())
                    && version >= &r.lower
                    && version < &r.upper
            }
            Self::UpToNextMajor(from) => {
                (allows_pre_release || !version.is_pre_release())
                    && version >= from
                    && version.major == from.major
            }
            Self::UpToNextMinor(from) => {
                (allows_pre_release || !version.is_pre_release())
                    && version >= from
                    && version.major == from.major
                    && version.minor == from.minor
            }
            Self::Branch(_) | Self::Revision(_) => false,
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "={v}"),
            Self::Range(r) => write!(f, ">={}, <{}", r.lower, r.upper),
            Self::UpToNextMajor(v) => write!(f, "^{v}"),
            Self::UpToNextMinor(v) => write!(f, "~{v}"),
            Self::Branch(b) => write!(f, "branch {b}"),
            Self::Revision(r) => write!(f, "revision {r}"),
        }
    }
}

/// On-disk shape: a single-key table such as `{ up-to-next-major = "1.0.0" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
enum SpecifierRepr {
    Exact(SemanticVersion),
    Range {
        from: SemanticVersion,
        to: SemanticVersion,
    },
    UpToNextMajor(SemanticVersion),
    UpToNextMinor(SemanticVersion),
    Branch(String),
    Revision(String),
}

impl TryFrom<SpecifierRepr> for VersionSpecifier {
    type Error = InvalidRange;

    fn try_from(repr: SpecifierRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            SpecifierRepr::Exact(v) => Self::Exact(v),
            SpecifierRepr::Range { from, to } => Self::range(from, to)?,
            SpecifierRepr::UpToNextMajor(v) => Self::UpToNextMajor(v),
            SpecifierRepr::UpToNextMinor(v) => Self::UpToNextMinor(v),
            SpecifierRepr::Branch(b) => Self::Branch(b),
            SpecifierRepr::Revision(r) => Self::Revision(r),
        })
    }
}

impl From<VersionSpecifier> for SpecifierRepr {
    fn from(spec: VersionSpecifier) -> Self {
        match spec {
            VersionSpecifier::Exact(v) => Self::Exact(v),
            VersionSpecifier::Range(r) => Self::Range {
                from: r.lower,
                to: r.upper,
            },
            VersionSpecifier::UpToNextMajor(v) => Self::UpToNextMajor(v),
            VersionSpecifier::UpToNextMinor(v) => Self::UpToNextMinor(v),
            VersionSpecifier::Branch(b) => Self::Branch(b),
            VersionSpecifier::Revision(r) => Self::Revision(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn up_to_next_major() {
        let spec = VersionSpecifier::UpToNextMajor(v("1.2.0"));
        assert!(spec.matches(&v("1.2.0")));
        assert!(spec.matches(&v("1.9.0")));
        assert!(!spec.matches(&v("2.0.0")));
        assert!(!spec.matches(&v("1.1.0")));
        assert!(!spec.matches(&v("1.3.0-beta")));
    }

    #[test]
    fn up_to_next_minor() {
        let spec = VersionSpecifier::UpToNextMinor(v("1.2.3"));
        assert!(spec.matches(&v("1.2.3")));
        assert!(spec.matches(&v("1.2.99")));
        assert!(!spec.matches(&v("1.3.0")));
        assert!(!spec.matches(&v("1.2.2")));
    }

    #[test]
    fn pre_release_lower_bound_opts_in() {
        let spec = VersionSpecifier::UpToNextMajor(v("2.0.0-beta.1"));
        assert!(spec.matches(&v("2.0.0-beta.2")));
        assert!(spec.matches(&v("2.0.0")));
        assert!(!spec.matches(&v("2.0.0-alpha")));
    }

    #[test]
    fn range_is_half_open() {
        let spec = VersionSpecifier::range(v("1.0.0"), v("2.0.0")).unwrap();
        assert!(spec.matches(&v("1.0.0")));
        assert!(spec.matches(&v("1.99.0")));
        assert!(!spec.matches(&v("2.0.0")));
        assert!(!spec.matches(&v("0.9.9")));
        assert!(!spec.matches(&v("1.5.0-rc.1")));
    }

    #[test]
    fn empty_range_rejected() {
        assert!(VersionSpecifier::range(v("2.0.0"), v("2.0.0")).is_err());
        assert!(VersionSpecifier::range(v("2.0.0"), v("1.0.0")).is_err());
        // Metadata does not make a range non-empty
        assert!(VersionSpecifier::range(v("1.0.0+a"), v("1.0.0+b")).is_err());
    }

    #[test]
    fn exact_ignores_metadata() {
        let spec = VersionSpecifier::Exact(v("1.0.0"));
        assert!(spec.matches(&v("1.0.0+build.5")));
        assert!(!spec.matches(&v("1.0.1")));

        let pre = VersionSpecifier::Exact(v("1.0.0-rc.1"));
        assert!(pre.matches(&v("1.0.0-rc.1")));
    }

    #[test]
    fn branch_and_revision_never_match_versions() {
        assert!(!VersionSpecifier::Branch("main".into()).matches(&v("1.0.0")));
        assert!(!VersionSpecifier::Revision("abc".into()).matches(&v("1.0.0")));
        assert!(!VersionSpecifier::Branch("main".into()).is_numeric());
        assert!(VersionSpecifier::Exact(v("1.0.0")).is_numeric());
    }

    #[test]
    fn display() {
        assert_eq!(VersionSpecifier::Exact(v("1.0")).to_string(), "=1.0.0");
        assert_eq!(
            VersionSpecifier::range(v("1.0.0"), v("2.0.0"))
                .unwrap()
                .to_string(),
            ">=1.0.0, <2.0.0"
        );
        assert_eq!(VersionSpecifier::UpToNextMajor(v("1.2.0")).to_string(), "^1.2.0");
        assert_eq!(VersionSpecifier::UpToNextMinor(v("1.2.0")).to_string(), "~1.2.0");
        assert_eq!(VersionSpecifier::Branch("main".into()).to_string(), "branch main");
    }
}
