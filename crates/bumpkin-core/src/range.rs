//! Declared dependency ranges.
//!
//! Two jobs live here:
//!
//! - [`classify`] extracts the operator prefix of a single-version range so a
//!   rewrite can keep it (`^1.2.3` stays a caret range after the bump).
//! - [`satisfies`] answers "does this version match this range" with npm
//!   semantics, built on top of the `semver` crate's Cargo-flavored
//!   [`VersionReq`].
//!
//! The two dialects differ in a few places that matter here: a bare `1.2.3`
//! is an exact pin for npm but a caret range for Cargo, npm separates
//! comparators with whitespace instead of commas, and npm has `||` unions and
//! `a - b` hyphen ranges.

use std::fmt;

use semver::{Version, VersionReq};
use serde::Serialize;
use thiserror::Error;

use crate::manifest::DependencyKind;

/// Errors from parsing a declared range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The range is valid npm syntax but not `<operator><version>`, so there
    /// is no single prefix to preserve.
    #[error("`{0}` is not a single-version range")]
    NotRewritable(String),

    /// The range could not be parsed at all.
    #[error("`{range}` is not a valid range: {message}")]
    Invalid {
        /// The declared range.
        range: String,
        /// Parser message.
        message: String,
    },
}

/// A [`RangeError`] located in a specific package and dependency section.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{package}: {kind} entry `{dependency}` has malformed range `{range}`")]
pub struct MalformedRange {
    /// Package declaring the range.
    pub package: String,
    /// Dependency the range applies to.
    pub dependency: String,
    /// Section the range was declared in.
    pub kind: DependencyKind,
    /// The declared range.
    pub range: String,
}

impl MalformedRange {
    pub(crate) fn new(package: &str, dependency: &str, kind: DependencyKind, range: &str) -> Self {
        Self {
            package: package.to_owned(),
            dependency: dependency.to_owned(),
            kind,
            range: range.to_owned(),
        }
    }
}

/// The operator in front of the version in a single-version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangePrefix {
    /// No operator: an exact pin (`1.2.3`).
    Exact,
    /// `^1.2.3`
    Caret,
    /// `~1.2.3`
    Tilde,
    /// `>=1.2.3`
    Gte,
    /// `>1.2.3`
    Gt,
    /// `<=1.2.3`
    Lte,
    /// `<1.2.3`
    Lt,
    /// `=1.2.3`
    Eq,
}

impl RangePrefix {
    /// Operators in match order: two-character operators before their
    /// one-character prefixes.
    const OPERATORS: &[(Self, &'static str)] = &[
        (Self::Gte, ">="),
        (Self::Lte, "<="),
        (Self::Caret, "^"),
        (Self::Tilde, "~"),
        (Self::Gt, ">"),
        (Self::Lt, "<"),
        (Self::Eq, "="),
    ];

    /// The operator text (empty for [`RangePrefix::Exact`]).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Gte => ">=",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Lt => "<",
            Self::Eq => "=",
        }
    }

    /// Build a range with this operator and `version`.
    pub fn apply(self, version: &Version) -> String {
        format!("{}{version}", self.as_str())
    }

    fn split(range: &str) -> (Self, &str) {
        Self::OPERATORS
            .iter()
            .find_map(|(prefix, op)| range.strip_prefix(op).map(|rest| (*prefix, rest)))
            .unwrap_or((Self::Exact, range))
    }
}

impl fmt::Display for RangePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Caret => write!(f, "caret"),
            Self::Tilde => write!(f, "tilde"),
            Self::Gte => write!(f, "gte"),
            Self::Gt => write!(f, "gt"),
            Self::Lte => write!(f, "lte"),
            Self::Lt => write!(f, "lt"),
            Self::Eq => write!(f, "eq"),
        }
    }
}

/// Determine the operator prefix of a declared range.
///
/// Only `<operator><full version>` ranges are rewritable. Wildcards,
/// partial versions, compound ranges, unions, tags, and protocol specifiers
/// (`workspace:`, `file:`, git URLs) fail with [`RangeError::NotRewritable`].
pub fn classify(range: &str) -> Result<RangePrefix, RangeError> {
    let (prefix, rest) = RangePrefix::split(range.trim());
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('v').unwrap_or(rest);
    Version::parse(rest).map_err(|_| RangeError::NotRewritable(range.to_owned()))?;
    Ok(prefix)
}

/// Check whether `version` satisfies the npm range `range`.
pub fn satisfies(range: &str, version: &Version) -> Result<bool, RangeError> {
    let alternatives = range
        .split("||")
        .map(|alt| to_version_req(alt.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RangeError::Invalid {
            range: range.to_owned(),
            message: e.to_string(),
        })?;

    Ok(alternatives.iter().any(|req| req.matches(version)))
}

/// Translate one npm comparator set (no `||`) into a [`VersionReq`].
fn to_version_req(set: &str) -> Result<VersionReq, semver::Error> {
    if let Some((low, high)) = set.split_once(" - ") {
        let comparators = [
            comparator(&format!(">={}", low.trim())),
            comparator(&format!("<={}", high.trim())),
        ];
        return join(comparators.into_iter().flatten());
    }

    join(merge_operators(set).iter().filter_map(|token| comparator(token)))
}

fn join(comparators: impl Iterator<Item = String>) -> Result<VersionReq, semver::Error> {
    let joined = comparators.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(&joined)
}

/// Split on whitespace, re-attaching operators written apart from their
/// version (`>= 1.2.3`).
fn merge_operators(set: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;

    for token in set.split_whitespace() {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending = Some(token);
            continue;
        }
        match pending.take() {
            Some(op) => tokens.push(format!("{op}{token}")),
            None => tokens.push(token.to_owned()),
        }
    }
    if let Some(op) = pending {
        tokens.push(op.to_owned());
    }
    tokens
}

/// Rewrite one npm comparator into Cargo syntax.
///
/// Returns `None` for a comparator that matches everything (`*`, `x`, `>=*`).
fn comparator(token: &str) -> Option<String> {
    let (prefix, rest) = RangePrefix::split(token);
    let rest = rest.strip_prefix('v').unwrap_or(rest);

    // Build metadata never affects matching.
    let core = rest.split_once('+').map_or(rest, |(core, _)| core);
    // Drop trailing wildcard components: `1.2.x` -> `1.2`.
    let parts: Vec<&str> = core
        .split('.')
        .take_while(|part| !matches!(*part, "x" | "X" | "*" | ""))
        .collect();
    if parts.is_empty() {
        return None;
    }
    let version = parts.join(".");

    let op = match prefix {
        RangePrefix::Exact => "=",
        other => other.as_str(),
    };
    Some(format!("{op}{version}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn classify_recognizes_every_operator() {
        assert_eq!(classify("1.2.3"), Ok(RangePrefix::Exact));
        assert_eq!(classify("^1.2.3"), Ok(RangePrefix::Caret));
        assert_eq!(classify("~1.2.3"), Ok(RangePrefix::Tilde));
        assert_eq!(classify(">=1.2.3"), Ok(RangePrefix::Gte));
        assert_eq!(classify(">1.2.3"), Ok(RangePrefix::Gt));
        assert_eq!(classify("<=1.2.3"), Ok(RangePrefix::Lte));
        assert_eq!(classify("<1.2.3"), Ok(RangePrefix::Lt));
        assert_eq!(classify("=1.2.3"), Ok(RangePrefix::Eq));
    }

    #[test]
    fn classify_tolerates_v_prefix_and_spacing() {
        assert_eq!(classify("v1.2.3"), Ok(RangePrefix::Exact));
        assert_eq!(classify(">= 1.2.3"), Ok(RangePrefix::Gte));
        assert_eq!(classify(" ^1.0.0-beta.1 "), Ok(RangePrefix::Caret));
    }

    #[test]
    fn classify_rejects_ranges_without_a_single_version() {
        for range in [
            "*",
            "latest",
            "1.x",
            "^1.2",
            ">=1.0.0 <2.0.0",
            "^1.0.0 || ^2.0.0",
            "workspace:^1.0.0",
            "file:../b",
            "",
        ] {
            assert_eq!(
                classify(range),
                Err(RangeError::NotRewritable(range.to_owned())),
                "{range}"
            );
        }
    }

    #[test]
    fn apply_preserves_prefix() {
        let next = v("2.0.0");
        assert_eq!(classify("^1.2.3").unwrap().apply(&next), "^2.0.0");
        assert_eq!(classify("1.2.3").unwrap().apply(&next), "2.0.0");
        assert_eq!(classify("~1.2.3").unwrap().apply(&next), "~2.0.0");
        assert_eq!(classify(">=1.2.3").unwrap().apply(&next), ">=2.0.0");
    }

    #[test]
    fn bare_version_is_an_exact_pin() {
        assert!(satisfies("1.2.3", &v("1.2.3")).unwrap());
        assert!(!satisfies("1.2.3", &v("1.2.4")).unwrap());
    }

    #[test]
    fn caret_and_tilde_follow_npm() {
        assert!(satisfies("^1.0.0", &v("1.9.0")).unwrap());
        assert!(!satisfies("^1.0.0", &v("2.0.0")).unwrap());
        assert!(satisfies("^0.2.3", &v("0.2.9")).unwrap());
        assert!(!satisfies("^0.2.3", &v("0.3.0")).unwrap());
        assert!(satisfies("~1.2.3", &v("1.2.9")).unwrap());
        assert!(!satisfies("~1.2.3", &v("1.3.0")).unwrap());
    }

    #[test]
    fn whitespace_separated_comparators_intersect() {
        assert!(satisfies(">=1.0.0 <2.0.0", &v("1.5.0")).unwrap());
        assert!(!satisfies(">=1.0.0 <2.0.0", &v("2.0.0")).unwrap());
        assert!(satisfies(">= 1.0.0 < 2.0.0", &v("1.0.0")).unwrap());
    }

    #[test]
    fn unions_match_any_alternative() {
        assert!(satisfies("^1.0.0 || ^2.0.0", &v("2.3.0")).unwrap());
        assert!(!satisfies("^1.0.0 || ^2.0.0", &v("3.0.0")).unwrap());
    }

    #[test]
    fn hyphen_ranges_are_inclusive() {
        assert!(satisfies("1.0.0 - 2.0.0", &v("2.0.0")).unwrap());
        assert!(!satisfies("1.0.0 - 2.0.0", &v("2.0.1")).unwrap());
    }

    #[test]
    fn wildcards_and_partials() {
        assert!(satisfies("*", &v("9.9.9")).unwrap());
        assert!(satisfies("", &v("0.0.1")).unwrap());
        assert!(satisfies("1.x", &v("1.4.0")).unwrap());
        assert!(!satisfies("1.x", &v("2.0.0")).unwrap());
        assert!(satisfies("1.2", &v("1.2.7")).unwrap());
        assert!(satisfies("~1.2.x", &v("1.2.7")).unwrap());
    }

    #[test]
    fn unparseable_ranges_are_errors() {
        assert!(matches!(
            satisfies("latest", &v("1.0.0")),
            Err(RangeError::Invalid { .. })
        ));
        assert!(matches!(
            satisfies("workspace:*", &v("1.0.0")),
            Err(RangeError::Invalid { .. })
        ));
    }

    #[test]
    fn malformed_range_display_names_package_and_dependency() {
        let err = MalformedRange::new("a", "b", DependencyKind::Dependencies, "latest");
        assert_eq!(
            err.to_string(),
            "a: dependencies entry `b` has malformed range `latest`"
        );
    }
}
