//! Workspace discovery — enumerate the packages of a monorepo.
//!
//! Reads the root `package.json` and resolves its `workspaces` globs
//! (either the array form or yarn's `{ "packages": [...] }` form). A root
//! manifest without `workspaces` is treated as a single-package workspace.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use bumpkin_core::workspace;
//!
//! let packages = workspace::discover(Utf8Path::new(".")).unwrap();
//! for pkg in &packages {
//!     println!("{} at {}", pkg.name, pkg.dir);
//! }
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::manifest::{MANIFEST_FILE, Manifest, ManifestError};

/// Directories never searched for workspace members.
const PRUNED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

/// Errors from workspace discovery.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// A manifest could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A manifest could not be parsed.
    #[error("invalid manifest {path}: {source}")]
    Manifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Parse error.
        source: ManifestError,
    },

    /// A `workspaces` entry is not a valid glob.
    #[error("invalid workspace pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Glob error.
        source: glob::PatternError,
    },

    /// Two workspace members share a name.
    #[error("duplicate package name `{name}` in {first} and {second}")]
    DuplicateName {
        /// Package name.
        name: String,
        /// Directory of the first package.
        first: Utf8PathBuf,
        /// Directory of the second package.
        second: Utf8PathBuf,
    },

    /// The directory walk failed.
    #[error("failed to walk workspace: {0}")]
    Walk(#[from] walkdir::Error),

    /// A member directory path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),
}

/// Result alias for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// A workspace package: its directory and parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Package name (identity within the workspace).
    pub name: String,
    /// Directory containing the manifest.
    pub dir: Utf8PathBuf,
    /// Parsed manifest.
    pub manifest: Manifest,
}

impl Package {
    /// Wrap an in-memory manifest.
    pub fn new(dir: impl Into<Utf8PathBuf>, manifest: Manifest) -> Self {
        Self {
            name: manifest.name().to_owned(),
            dir: dir.into(),
            manifest,
        }
    }

    /// Path of this package's manifest file.
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Current declared version.
    pub fn version(&self) -> Option<&str> {
        self.manifest.version()
    }
}

/// Enumerate every package in the workspace rooted at `root`, sorted by name.
#[instrument(fields(%root))]
pub fn discover(root: &Utf8Path) -> WorkspaceResult<Vec<Package>> {
    let root_path = root.join(MANIFEST_FILE);
    let content = read(&root_path)?;
    let document: Map<String, Value> =
        serde_json::from_str(&content).map_err(|e| WorkspaceError::Manifest {
            path: root_path.clone(),
            source: ManifestError::Json(e),
        })?;

    let Some(patterns) = workspace_patterns(&document) else {
        debug!("no workspaces field, treating root as the only package");
        return Ok(vec![load_package(root)?]);
    };

    let mut by_name: BTreeMap<String, Package> = BTreeMap::new();
    for dir in resolve_patterns(root, &patterns)? {
        if !dir.join(MANIFEST_FILE).is_file() {
            continue;
        }
        let package = load_package(&dir)?;
        if let Some(existing) = by_name.get(&package.name) {
            return Err(WorkspaceError::DuplicateName {
                name: package.name,
                first: existing.dir.clone(),
                second: dir,
            });
        }
        by_name.insert(package.name.clone(), package);
    }

    debug!(count = by_name.len(), "discovered workspace packages");
    Ok(by_name.into_values().collect())
}

/// Load the package whose manifest lives in `dir`.
pub fn load_package(dir: &Utf8Path) -> WorkspaceResult<Package> {
    let path = dir.join(MANIFEST_FILE);
    let content = read(&path)?;
    let manifest =
        Manifest::parse(&content).map_err(|source| WorkspaceError::Manifest { path, source })?;
    Ok(Package::new(dir, manifest))
}

fn read(path: &Utf8Path) -> WorkspaceResult<String> {
    std::fs::read_to_string(path).map_err(|source| WorkspaceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract the `workspaces` globs in either supported shape.
fn workspace_patterns(document: &Map<String, Value>) -> Option<Vec<String>> {
    let value = document.get("workspaces")?;
    let list = match value {
        Value::Array(list) => list,
        Value::Object(obj) => obj.get("packages")?.as_array()?,
        _ => return None,
    };
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
    )
}

/// Resolve glob patterns to member directories relative to `root`.
///
/// Patterns prefixed with `!` exclude. Heavy directories in
/// [`PRUNED_DIRS`] are never descended into. Output is sorted.
fn resolve_patterns(root: &Utf8Path, patterns: &[String]) -> WorkspaceResult<Vec<Utf8PathBuf>> {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for raw in patterns {
        let (pattern, negated) = match raw.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (raw.as_str(), false),
        };
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        let compiled = Pattern::new(pattern).map_err(|source| WorkspaceError::Pattern {
            pattern: raw.clone(),
            source,
        })?;
        if negated {
            exclude.push(compiled);
        } else {
            include.push(compiled);
        }
    }

    // `packages/*` must not match `packages/a/fixtures/b`.
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };
    let matches = |set: &[Pattern], path: &std::path::Path| {
        set.iter().any(|p| p.matches_path_with(path, options))
    };

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut matched = Vec::new();
    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || e.file_name()
                .to_str()
                .is_none_or(|name| !PRUNED_DIRS.contains(&name))
    }) {
        let entry = entry?;
        if !entry.file_type().is_dir() || entry.path() == root.as_std_path() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matches(&exclude, relative) {
            continue;
        }
        if matches(&include, relative) {
            let dir = Utf8PathBuf::from_path_buf(entry.path().to_path_buf())
                .map_err(WorkspaceError::NonUtf8Path)?;
            matched.push(dir);
        }
    }

    matched.sort();
    Ok(matched)
}
