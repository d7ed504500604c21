//! Semantic version parsing, precedence, and canonical rendering.
//!
//! Accepted grammar: `["v"] MAJOR "." MINOR ["." PATCH] ["-" PRERELEASE] ["+" METADATA]`.
//!
//! - Numeric components are decimal; leading zeros are allowed (`05` is `5`)
//! - A missing patch component defaults to `0`
//! - Everything after the first `+` is metadata, so a `-` there is literal
//! - Build metadata never takes part in ordering, equality, or hashing;
//!   use [`SemanticVersion::is_identical`] when metadata must match too

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parsed semantic version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// `None` iff the version had no pre-release suffix.
    pub pre_release: Option<Vec<String>>,
    pub metadata: Option<String>,
}

/// Returned by [`SemanticVersion::from_str`] for strings outside the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid semantic version '{0}'")]
pub struct InvalidVersion(pub String);

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            metadata: None,
        }
    }

    /// Parse a version string. Returns `None` for anything outside the grammar,
    /// since callers try arbitrary tag names and skip the ones that aren't versions.
    pub fn parse(input: &str) -> Option<Self> {
        let body = input.strip_prefix('v').unwrap_or(input);

        let (body, metadata) = match body.split_once('+') {
            Some((rest, meta)) => {
                if !valid_identifiers(meta) {
                    return None;
                }
                (rest, Some(meta.to_string()))
            }
            None => (body, None),
        };

        let (core, pre_release) = match body.split_once('-') {
            Some((core, pre)) => {
                if !valid_identifiers(pre) {
                    return None;
                }
                (core, Some(pre.split('.').map(str::to_string).collect()))
            }
            None => (body, None),
        };

        let mut parts = core.split('.');
        let major = parse_numeric(parts.next()?)?;
        let minor = parse_numeric(parts.next()?)?;
        let patch = match parts.next() {
            Some(p) => parse_numeric(p)?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            pre_release,
            metadata,
        })
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// Equality including build metadata.
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other && self.metadata == other.metadata
    }
}

fn parse_numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Dot-separated, non-empty identifiers made of ASCII alphanumerics and hyphens.
fn valid_identifiers(section: &str) -> bool {
    !section.is_empty()
        && section.split('.').all(|id| {
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    let a_numeric = a.bytes().all(|c| c.is_ascii_digit());
    let b_numeric = b.bytes().all(|c| c.is_ascii_digit());
    match (a_numeric, b_numeric) {
        (true, true) => {
            // Length first so arbitrarily long numbers never overflow.
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn compare_pre_release(a: &Option<Vec<String>>, b: &Option<Vec<String>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = compare_identifiers(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_pre_release(&self.pre_release, &other.pre_release))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        // Numeric identifiers are hashed without leading zeros to agree with `Ord`.
        if let Some(ref pre) = self.pre_release {
            for id in pre {
                if id.bytes().all(|b| b.is_ascii_digit()) {
                    id.trim_start_matches('0').hash(state);
                } else {
                    id.hash(state);
                }
            }
        }
        self.pre_release.as_ref().map(Vec::len).hash(state);
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{}", pre.join("."))?;
        }
        if let Some(ref meta) = self.metadata {
            write!(f, "+{meta}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidVersion(s.to_string()))
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = InvalidVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn parses_plain_version() {
        let zero = v("0.0.0");
        assert_eq!((zero.major, zero.minor, zero.patch), (0, 0, 0));
        assert_eq!(zero.pre_release, None);
        assert_eq!(zero.metadata, None);
    }

    #[test]
    fn parses_v_prefix_and_missing_patch() {
        let prefixed = v("v2.7.3");
        assert_eq!((prefixed.major, prefixed.minor, prefixed.patch), (2, 7, 3));

        let no_patch = v("1.5");
        assert_eq!((no_patch.major, no_patch.minor, no_patch.patch), (1, 5, 0));
    }

    #[test]
    fn leading_zeros_are_decimal() {
        let pre = v("04.0.0-alpha.1");
        assert_eq!(pre.major, 4);
        assert_eq!(
            pre.pre_release,
            Some(vec!["alpha".to_string(), "1".to_string()])
        );
        assert_eq!(v("010.08.09").to_string(), "10.8.9");
    }

    #[test]
    fn metadata_only() {
        let meta = v("5.11.01+20130313144700");
        assert_eq!((meta.major, meta.minor, meta.patch), (5, 11, 1));
        assert_eq!(meta.pre_release, None);
        assert_eq!(meta.metadata.as_deref(), Some("20130313144700"));
    }

    #[test]
    fn pre_release_and_metadata_without_patch() {
        let full = v("17.104-alpha.beta.2+exp.sha.5114f85");
        assert_eq!((full.major, full.minor, full.patch), (17, 104, 0));
        assert_eq!(
            full.pre_release,
            Some(vec!["alpha".into(), "beta".into(), "2".into()])
        );
        assert_eq!(full.metadata.as_deref(), Some("exp.sha.5114f85"));
    }

    #[test]
    fn hyphen_after_plus_is_metadata() {
        let ver = v("1.0.0+sha.5114f85-alpha.2");
        assert_eq!(ver.pre_release, None);
        assert_eq!(ver.metadata.as_deref(), Some("sha.5114f85-alpha.2"));
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "1", "1.0.0-", "1.0.0+", "1.0.0-+", "ver1.0.0", "", "v", "1.", "1..0", "1.0.0.0",
            "a.b.c", "1.x", "-1.0.0", " 1.0.0", "1.0.0-al_pha", "1.0.0-alpha..1",
        ] {
            assert!(SemanticVersion::parse(bad).is_none(), "accepted {bad:?}");
        }
    }

    #[test]
    fn canonical_rendering() {
        for s in [
            "0.0.0",
            "2.7.3",
            "4.0.0-alpha.1",
            "5.11.1+20130313144700",
            "17.104.0-alpha.beta.2+exp.sha.5114f85",
        ] {
            assert_eq!(v(s).to_string(), s);
        }
        assert_eq!(v("1.5").to_string(), "1.5.0");
        assert_eq!(v("v2.7.3").to_string(), "2.7.3");
        assert_eq!(v("05.017.0049").to_string(), "5.17.49");
    }

    #[test]
    fn render_then_parse_is_stable() {
        for s in ["1.5", "v3.0.1-rc.1+build.7", "0.0.9+x-y", "07.1.0-0.3.7"] {
            let first = v(s);
            let again = v(&first.to_string());
            assert!(first.is_identical(&again), "{s}");
        }
    }

    #[test]
    fn precedence_chain() {
        let expected = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        let mut shuffled: Vec<SemanticVersion> = expected.iter().rev().map(|s| v(s)).collect();
        shuffled.sort();
        let rendered: Vec<String> = shuffled.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert!(v("1.2.10") > v("1.2.9"));
        assert!(v("1.10.0") > v("1.9.99"));
        assert!(v("2.0.0") > v("1.99.99"));
        assert!(v("1.0.0-2") < v("1.0.0-10"));
        assert!(v("1.0.0-99") < v("1.0.0-a"));
    }

    #[test]
    fn metadata_ignored_for_ordering() {
        let a = v("1.0.0+a");
        let b = v("1.0.0+b");
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert!(!a.is_identical(&b));
        assert!(a.is_identical(&v("1.0.0+a")));
    }

    #[test]
    fn hash_agrees_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("1.0.0+a"));
        assert!(set.contains(&v("1.0.0+b")));
        set.insert(v("1.0.0-01"));
        assert!(set.contains(&v("1.0.0-1")));
    }

    #[test]
    fn from_str_error() {
        let err = "nope".parse::<SemanticVersion>().unwrap_err();
        assert_eq!(err.to_string(), "invalid semantic version 'nope'");
    }
}
