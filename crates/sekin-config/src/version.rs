use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

/// A semantic version, parsed from a string that may carry a leading `v`
/// (the form every image tag and gateway response uses).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(semver::Version);

impl Version {
    pub fn parse(raw: &str) -> Result<Self, SupervisorError> {
        let trimmed = raw.trim().trim_start_matches('v');
        semver::Version::parse(trimmed)
            .map(Version)
            .map_err(|e| SupervisorError::VersionParse(format!("{raw}: {e}")))
    }
}

impl FromStr for Version {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = SupervisorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Result of comparing a currently-running version against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrdering {
    Higher,
    Lower,
    Same,
}

impl Version {
    /// `self` is the currently running version, `other` the candidate.
    pub fn compare(&self, other: &Version) -> VersionOrdering {
        match self.0.cmp(&other.0) {
            std::cmp::Ordering::Less => VersionOrdering::Lower,
            std::cmp::Ordering::Greater => VersionOrdering::Higher,
            std::cmp::Ordering::Equal => VersionOrdering::Same,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_v_prefixed_versions() {
        let v = Version::parse("v0.4.12").unwrap();
        assert_eq!(v.to_string(), "v0.4.12");
    }

    #[test]
    fn total_order_matches_semver() {
        let a = Version::parse("v0.4.1").unwrap();
        let b = Version::parse("v0.4.2").unwrap();
        assert_eq!(a.compare(&b), VersionOrdering::Lower);
        assert_eq!(b.compare(&a), VersionOrdering::Higher);
        assert_eq!(a.compare(&a), VersionOrdering::Same);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse("not-a-version").is_err());
    }
}
