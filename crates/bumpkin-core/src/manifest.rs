//! Package manifests (`package.json`).
//!
//! A [`Manifest`] keeps the whole parsed document so fields this crate does
//! not know about survive a rewrite in their original order, and lifts the
//! parts the bump cares about (name, version, the four dependency sections)
//! into typed fields.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Manifest file name inside every package directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Errors from parsing or rendering a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Not valid JSON, or not a JSON object.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest has no string `name` field.
    #[error("missing or non-string `name` field")]
    MissingName,

    /// A typed field holds the wrong kind of value.
    #[error("`{field}` must be {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What the field should contain.
        expected: &'static str,
    },
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// The dependency sections a manifest can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// `dependencies`
    Dependencies,
    /// `devDependencies`
    DevDependencies,
    /// `peerDependencies`
    PeerDependencies,
    /// `optionalDependencies`
    OptionalDependencies,
}

impl DependencyKind {
    /// Every section, in the order they are conventionally written.
    pub const ALL: &[Self] = &[
        Self::Dependencies,
        Self::DevDependencies,
        Self::PeerDependencies,
        Self::OptionalDependencies,
    ];

    /// The JSON field holding this section.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "devDependencies",
            Self::PeerDependencies => "peerDependencies",
            Self::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Indentation style detected in a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Indented with this many spaces per level.
    Spaces(usize),
    /// Indented with one tab per level.
    Tab,
}

impl Default for Indent {
    fn default() -> Self {
        Self::Spaces(2)
    }
}

impl Indent {
    /// Detect the indentation of a JSON document from its first indented line.
    ///
    /// Falls back to two spaces for single-line documents.
    pub fn detect(content: &str) -> Self {
        content
            .lines()
            .skip(1)
            .find_map(|line| {
                if line.starts_with('\t') {
                    return Some(Self::Tab);
                }
                let width = line.len() - line.trim_start_matches(' ').len();
                (width > 0).then_some(Self::Spaces(width))
            })
            .unwrap_or_default()
    }

    fn unit(self) -> String {
        match self {
            Self::Spaces(width) => " ".repeat(width),
            Self::Tab => "\t".to_owned(),
        }
    }
}

/// A parsed `package.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    name: String,
    version: Option<String>,
    sections: BTreeMap<DependencyKind, IndexMap<String, String>>,
    document: Map<String, Value>,
    indent: Indent,
}

impl Manifest {
    /// Create a minimal manifest with a name and version.
    pub fn new(name: impl Into<String>, version: &Version) -> Self {
        let name = name.into();
        let mut document = Map::new();
        document.insert("name".into(), Value::String(name.clone()));
        document.insert("version".into(), Value::String(version.to_string()));
        Self {
            name,
            version: Some(version.to_string()),
            sections: BTreeMap::new(),
            document,
            indent: Indent::default(),
        }
    }

    /// Builder-style helper that declares a dependency.
    #[must_use]
    pub fn with_dependency(
        mut self,
        kind: DependencyKind,
        name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        self.sections
            .entry(kind)
            .or_default()
            .insert(name.into(), range.into());
        self
    }

    /// Parse manifest text, remembering its indentation style.
    pub fn parse(content: &str) -> ManifestResult<Self> {
        let document: Map<String, Value> = serde_json::from_str(content)?;
        let mut manifest = Self::from_document(document)?;
        manifest.indent = Indent::detect(content);
        Ok(manifest)
    }

    /// Lift the typed fields out of an already-parsed JSON object.
    pub fn from_document(document: Map<String, Value>) -> ManifestResult<Self> {
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingName)?
            .to_owned();

        let version = match document.get("version") {
            None => None,
            Some(Value::String(v)) => Some(v.clone()),
            Some(_) => {
                return Err(ManifestError::InvalidField {
                    field: "version",
                    expected: "a string",
                });
            }
        };

        let mut sections = BTreeMap::new();
        for kind in DependencyKind::ALL {
            let Some(value) = document.get(kind.field()) else {
                continue;
            };
            let invalid = ManifestError::InvalidField {
                field: kind.field(),
                expected: "an object of string ranges",
            };
            let Value::Object(entries) = value else {
                return Err(invalid);
            };
            let mut section = IndexMap::with_capacity(entries.len());
            for (dep, range) in entries {
                let Value::String(range) = range else {
                    return Err(invalid);
                };
                section.insert(dep.clone(), range.clone());
            }
            sections.insert(*kind, section);
        }

        Ok(Self {
            name,
            version,
            sections,
            document,
            indent: Indent::default(),
        })
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared version string, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Replace the package's own version.
    pub fn set_version(&mut self, version: &Version) {
        self.version = Some(version.to_string());
    }

    /// Indentation detected when the manifest was parsed.
    pub const fn indent(&self) -> Indent {
        self.indent
    }

    /// One dependency section, if the manifest declares it.
    pub fn section(&self, kind: DependencyKind) -> Option<&IndexMap<String, String>> {
        self.sections.get(&kind)
    }

    /// Every `(section, dependency, range)` entry, sections in [`DependencyKind::ALL`] order.
    pub fn dependencies(&self) -> impl Iterator<Item = (DependencyKind, &str, &str)> {
        self.sections.iter().flat_map(|(kind, section)| {
            section
                .iter()
                .map(move |(name, range)| (*kind, name.as_str(), range.as_str()))
        })
    }

    /// Every section that declares `dependency`, with its range.
    pub fn declarations<'a>(
        &'a self,
        dependency: &'a str,
    ) -> impl Iterator<Item = (DependencyKind, &'a str)> + 'a {
        self.sections.iter().filter_map(move |(kind, section)| {
            section
                .get(dependency)
                .map(|range| (*kind, range.as_str()))
        })
    }

    /// Overwrite the range of an existing declaration.
    ///
    /// Returns `false` (and changes nothing) if the section does not declare
    /// `dependency`.
    pub fn set_range(&mut self, kind: DependencyKind, dependency: &str, range: String) -> bool {
        match self
            .sections
            .get_mut(&kind)
            .and_then(|section| section.get_mut(dependency))
        {
            Some(slot) => {
                *slot = range;
                true
            }
            None => false,
        }
    }

    /// The full JSON document with typed fields written back in place.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = self.document.clone();
        if let Some(ref version) = self.version {
            document.insert("version".into(), Value::String(version.clone()));
        }
        for (kind, section) in &self.sections {
            let entries = section
                .iter()
                .map(|(name, range)| (name.clone(), Value::String(range.clone())))
                .collect();
            document.insert(kind.field().into(), Value::Object(entries));
        }
        document
    }

    /// Render as pretty JSON in the detected indentation, with a trailing newline.
    pub fn render(&self) -> ManifestResult<String> {
        let unit = self.indent.unit();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(unit.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        Value::Object(self.to_document()).serialize(&mut serializer)?;
        buf.push(b'\n');
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
