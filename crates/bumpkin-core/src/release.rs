//! Release sets — which packages this run releases, and at what version.
//!
//! The release set is computed elsewhere (from changesets, by hand, by CI)
//! and handed to the bump as plain data. Two ways in:
//!
//! - a plan file, TOML, YAML, or JSON:
//!
//!   ```toml
//!   [[releases]]
//!   name = "@acme/core"
//!   version = "2.0.0"
//!   type = "major"
//!   ```
//!
//! - `name@version` pairs, e.g. `@acme/core@2.0.0`.

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from building a release set.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// A `name@version` pair could not be split.
    #[error("invalid release `{0}` (expected NAME@VERSION)")]
    InvalidSpec(String),

    /// The target version is not valid semver.
    #[error("invalid version `{version}` for {name}: {source}")]
    InvalidVersion {
        /// Package name.
        name: String,
        /// The version as written.
        version: String,
        /// Parse error.
        source: semver::Error,
    },

    /// The same package was given two different versions.
    #[error("{name} is released at both {first} and {second}")]
    Conflict {
        /// Package name.
        name: String,
        /// First version seen.
        first: Version,
        /// Second version seen.
        second: Version,
    },

    /// The plan file could not be loaded.
    #[error("invalid release plan: {0}")]
    Plan(#[from] Box<figment::Error>),
}

/// Result alias for release-set operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Bump level recorded alongside a release. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Released without a version change of its own.
    None,
    /// Patch release (x.y.Z).
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// One package's entry in the release set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Target version.
    pub version: Version,
    /// Bump level, when the producer recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<BumpLevel>,
}

/// Package name → target version for the packages released in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReleaseSet {
    releases: BTreeMap<String, Release>,
}

impl ReleaseSet {
    /// An empty release set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release, rejecting a second, different version for the same name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: Version,
        level: Option<BumpLevel>,
    ) -> ReleaseResult<()> {
        let name = name.into();
        if let Some(existing) = self.releases.get(&name) {
            if existing.version != version {
                return Err(ReleaseError::Conflict {
                    name,
                    first: existing.version.clone(),
                    second: version,
                });
            }
            return Ok(());
        }
        self.releases.insert(name, Release { version, level });
        Ok(())
    }

    /// Builder-style insert without a bump level. Later entries win.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, version: Version) -> Self {
        self.releases.insert(
            name.into(),
            Release {
                version,
                level: None,
            },
        );
        self
    }

    /// Target version for `name`, if released.
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.releases.get(name).map(|r| &r.version)
    }

    /// Full entry for `name`, if released.
    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.get(name)
    }

    /// Whether `name` is released.
    pub fn contains(&self, name: &str) -> bool {
        self.releases.contains_key(name)
    }

    /// Iterate `(name, version)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Version)> {
        self.releases
            .iter()
            .map(|(name, release)| (name.as_str(), &release.version))
    }

    /// Number of released packages.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether nothing is released.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Keep only the releases for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.releases.retain(|name, _| keep(name));
    }

    /// Merge `other` into this set, with the same conflict rule as [`insert`](Self::insert).
    pub fn extend(&mut self, other: Self) -> ReleaseResult<()> {
        for (name, release) in other.releases {
            self.insert(name, release.version, release.level)?;
        }
        Ok(())
    }
}

/// Parse a `name@version` pair. Scoped names (`@scope/pkg@1.0.0`) are supported.
pub fn parse_spec(spec: &str) -> ReleaseResult<(String, Version)> {
    let (name, version) = spec
        .rsplit_once('@')
        .filter(|(name, version)| !name.is_empty() && !version.is_empty())
        .ok_or_else(|| ReleaseError::InvalidSpec(spec.to_owned()))?;
    let version = parse_version(name, version)?;
    Ok((name.to_owned(), version))
}

/// Build a release set from `name@version` pairs.
pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> ReleaseResult<ReleaseSet> {
    let mut set = ReleaseSet::new();
    for spec in specs {
        let (name, version) = parse_spec(spec.as_ref())?;
        set.insert(name, version, None)?;
    }
    Ok(set)
}

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default)]
    releases: Vec<PlanEntry>,
}

#[derive(Debug, Deserialize)]
struct PlanEntry {
    name: String,
    version: String,
    #[serde(rename = "type")]
    level: Option<BumpLevel>,
}

/// Load a release plan file, choosing the format from its extension.
#[instrument(fields(%path))]
pub fn load_plan(path: &Utf8Path) -> ReleaseResult<ReleaseSet> {
    let figment = match path.extension() {
        Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path.as_str())),
        Some("toml") => Figment::from(Toml::file_exact(path.as_str())),
        _ => Figment::from(Json::file_exact(path.as_str())),
    };
    let plan: PlanFile = figment.extract().map_err(Box::new)?;

    let mut set = ReleaseSet::new();
    for entry in plan.releases {
        let version = parse_version(&entry.name, &entry.version)?;
        set.insert(entry.name, version, entry.level)?;
    }
    debug!(releases = set.len(), "loaded release plan");
    Ok(set)
}

fn parse_version(name: &str, version: &str) -> ReleaseResult<Version> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    Version::parse(trimmed).map_err(|source| ReleaseError::InvalidVersion {
        name: name.to_owned(),
        version: version.to_owned(),
        source,
    })
}
