//! Application version identifiers.
//!
//! Versions look like `1.0.3-02`: dot-separated release components followed by an
//! optional dash-separated build counter. Stored versions written by earlier wallet
//! releases were always compared as plain strings, which is what
//! [`VersionOrdering::Lexicographic`] reproduces. That ordering breaks as soon as a
//! component reaches two digits (`"1.0.9-01" > "1.0.12-02"`), so
//! [`VersionOrdering::Numeric`] is provided as well.
//!
//! [`AppVersion`] deliberately does not implement [`Ord`]: every comparison has to
//! name the ordering it uses.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Version assumed when nothing has been stored yet.
pub const BASELINE_VERSION: &str = "0.0.0";

const SEPARATORS: [char; 2] = ['.', '-'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,
}

/// A non-empty application version string, without surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppVersion(String);

impl AppVersion {
    pub fn new(version: impl Into<String>) -> Result<Self, VersionError> {
        let version = version.into();
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        if trimmed.len() == version.len() {
            return Ok(Self(version));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn baseline() -> Self {
        Self(BASELINE_VERSION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Release and build components, in order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATORS)
    }

    pub fn cmp_with(&self, other: &AppVersion, ordering: VersionOrdering) -> Ordering {
        ordering.compare(self.as_str(), other.as_str())
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AppVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AppVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AppVersion {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppVersion> for String {
    fn from(value: AppVersion) -> Self {
        value.0
    }
}

impl AsRef<str> for AppVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How two version strings are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrdering {
    /// Byte-wise string comparison. Compatible with versions stored by older releases.
    #[default]
    Lexicographic,
    /// Component-wise comparison. Purely numeric components compare as integers and sort
    /// before alphanumeric ones, which compare as strings (`2 < 10 < 1a < a`).
    Numeric,
}

impl VersionOrdering {
    pub fn compare(self, lhs: &str, rhs: &str) -> Ordering {
        match self {
            Self::Lexicographic => lhs.cmp(rhs),
            Self::Numeric => compare_numeric(lhs, rhs),
        }
    }

    /// `lower < version <= upper`
    pub fn in_range(self, version: &str, lower: &str, upper: &str) -> bool {
        self.compare(lower, version).is_lt() && self.compare(version, upper).is_le()
    }
}

impl fmt::Display for VersionOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexicographic => f.write_str("lexicographic"),
            Self::Numeric => f.write_str("numeric"),
        }
    }
}

fn compare_numeric(lhs: &str, rhs: &str) -> Ordering {
    let mut lhs_components = lhs.split(SEPARATORS);
    let mut rhs_components = rhs.split(SEPARATORS);
    loop {
        let ordering = match (lhs_components.next(), rhs_components.next()) {
            // Component-wise equal ("1.0" vs "1-0", "01" vs "1"): fall back to the raw
            // strings so that the order stays total and consistent with `Eq`.
            (None, None) => return lhs.cmp(rhs),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => compare_component(a, b),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
}

fn is_numeric(component: &str) -> bool {
    !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit())
}

fn compare_component(lhs: &str, rhs: &str) -> Ordering {
    match (is_numeric(lhs), is_numeric(rhs)) {
        (true, true) => {
            // Arbitrary length integers: fewer significant digits is smaller.
            let lhs = lhs.trim_start_matches('0');
            let rhs = rhs.trim_start_matches('0');
            lhs.len().cmp(&rhs.len()).then_with(|| lhs.cmp(rhs))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => lhs.cmp(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.1-11", "1.0.1-20", Ordering::Less)]
    #[case("1.0.3-01", "1.0.1-20", Ordering::Greater)]
    #[case("0.0.0", "1.0.1-11", Ordering::Less)]
    #[case("1.0.3-01", "1.0.3-01", Ordering::Equal)]
    #[case("1.0.9-01", "1.0.12-02", Ordering::Greater)]
    fn lexicographic_is_plain_string_order(#[case] lhs: &str, #[case] rhs: &str, #[case] expected: Ordering) {
        assert_eq!(VersionOrdering::Lexicographic.compare(lhs, rhs), expected);
    }

    #[rstest]
    #[case("1.0.9-01", "1.0.12-02", Ordering::Less)]
    #[case("1.0.1-11", "1.0.1-20", Ordering::Less)]
    #[case("1.0.1", "1.0.1-01", Ordering::Less)]
    #[case("2.0.0", "10.0.0", Ordering::Less)]
    #[case("1.0.0-beta", "1.0.0-alpha", Ordering::Greater)]
    #[case("1.0.3-01", "1.0.3-01", Ordering::Equal)]
    #[case("1.0.0-10", "1.0.0-1a", Ordering::Less)]
    #[case("1.0.0-1a", "1.0.0-2", Ordering::Greater)]
    #[case("1.0.0-99999999999999999999999", "1.0.0-100", Ordering::Greater)]
    fn numeric_compares_components(#[case] lhs: &str, #[case] rhs: &str, #[case] expected: Ordering) {
        assert_eq!(VersionOrdering::Numeric.compare(lhs, rhs), expected);
    }

    #[test]
    fn numeric_tie_break_keeps_distinct_strings_distinct() {
        assert_ne!(VersionOrdering::Numeric.compare("1.01", "1.1"), Ordering::Equal);
        assert_ne!(VersionOrdering::Numeric.compare("1.0", "1-0"), Ordering::Equal);
    }

    #[rstest]
    #[case("1.0.1-11", "0.0.0", "1.0.1-11", true)]
    #[case("1.0.1-11", "1.0.1-11", "1.0.3-01", false)]
    #[case("1.0.3-01", "1.0.1-11", "1.0.3-01", true)]
    #[case("1.0.3-02", "1.0.1-11", "1.0.3-01", false)]
    fn range_is_open_below_closed_above(
        #[case] version: &str,
        #[case] lower: &str,
        #[case] upper: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(VersionOrdering::Lexicographic.in_range(version, lower, upper), expected);
    }

    #[test]
    fn empty_versions_are_rejected() {
        assert_eq!(AppVersion::new(""), Err(VersionError::Empty));
        assert_eq!("  ".parse::<AppVersion>(), Err(VersionError::Empty));
        assert_eq!(AppVersion::baseline().as_str(), BASELINE_VERSION);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let version = AppVersion::new(" 1.0.3\n").unwrap();
        assert_eq!(version.as_str(), "1.0.3");
        assert!(VersionOrdering::Lexicographic.in_range("1.0.1-11", "0.0.0", version.as_str()));
        assert_eq!(AppVersion::new(" \t "), Err(VersionError::Empty));
    }

    #[test]
    fn numeric_and_alphanumeric_builds_do_not_cycle() {
        let (a, b, c) = ("1.0.0-2", "1.0.0-10", "1.0.0-1a");
        let numeric = VersionOrdering::Numeric;
        assert!(numeric.compare(a, b).is_lt());
        assert!(numeric.compare(b, c).is_lt());
        assert!(numeric.compare(a, c).is_lt());
    }

    #[test]
    fn components_split_on_dots_and_dashes() {
        let version = AppVersion::new("1.0.3-02").unwrap();
        assert_eq!(version.components().collect::<Vec<_>>(), vec!["1", "0", "3", "02"]);
    }

    #[test]
    fn serde_rejects_empty_version() {
        let version: AppVersion = serde_json::from_str("\"1.0.3-01\"").unwrap();
        assert_eq!(version.as_str(), "1.0.3-01");
        assert!(serde_json::from_str::<AppVersion>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"1.0.3-01\"");
    }

    fn version_strategy() -> impl Strategy<Value = String> {
        (0u32..3, 0u32..20, 0u32..20, 0u32..40)
            .prop_map(|(major, minor, patch, build)| format!("{major}.{minor}.{patch}-{build:02}"))
    }

    fn mixed_version_strategy() -> impl Strategy<Value = String> {
        let component = prop::sample::select(vec!["0", "1", "01", "2", "10", "1a", "2a", "a", "beta", "007"]);
        (prop::collection::vec(component, 1..4), prop::sample::select(vec![".", "-"]))
            .prop_map(|(components, sep)| components.join(sep))
    }

    proptest! {
        #[test]
        fn numeric_ordering_is_transitive(
            a in mixed_version_strategy(),
            b in mixed_version_strategy(),
            c in mixed_version_strategy(),
        ) {
            let numeric = VersionOrdering::Numeric;
            if numeric.compare(&a, &b).is_le() && numeric.compare(&b, &c).is_le() {
                prop_assert!(numeric.compare(&a, &c).is_le(), "{} <= {} <= {} but {} > {}", a, b, c, a, c);
            }
            if numeric.compare(&a, &b).is_lt() && numeric.compare(&b, &c).is_lt() {
                prop_assert!(numeric.compare(&a, &c).is_lt());
            }
        }

        #[test]
        fn numeric_ordering_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
            let ab = VersionOrdering::Numeric.compare(&a, &b);
            let ba = VersionOrdering::Numeric.compare(&b, &a);
            prop_assert_eq!(ab, ba.reverse());
            prop_assert_eq!(ab.is_eq(), a == b);
        }

        #[test]
        fn orderings_agree_on_fixed_width_components(
            a in (0u32..10, 0u32..10, 0u32..100),
            b in (0u32..10, 0u32..10, 0u32..100),
        ) {
            let a = format!("{}.{}-{:02}", a.0, a.1, a.2);
            let b = format!("{}.{}-{:02}", b.0, b.1, b.2);
            prop_assert_eq!(
                VersionOrdering::Lexicographic.compare(&a, &b),
                VersionOrdering::Numeric.compare(&a, &b)
            );
        }
    }
}
