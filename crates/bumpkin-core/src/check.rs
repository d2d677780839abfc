//! Consistency checking for packages left out of a release.
//!
//! A package that is not released keeps its manifest as-is. If it declares a
//! range for a released workspace package that the new version no longer
//! satisfies, the release would leave the workspace inconsistent; each such
//! declaration is a [`Violation`].

use std::fmt;

use semver::Version;
use serde::Serialize;
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::manifest::DependencyKind;
use crate::range::{self, MalformedRange};
use crate::release::ReleaseSet;
use crate::workspace::Package;

/// A non-released package whose declared range excludes a released version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The package declaring the range (not part of the release).
    pub package: String,
    /// The released dependency.
    pub dependency: String,
    /// Section the range is declared in.
    pub kind: DependencyKind,
    /// The range as currently declared.
    pub declared_range: String,
    /// The version the dependency is being released at.
    pub incoming_version: Version,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} declares {} `{}@{}`, which {} does not satisfy",
            self.package, self.kind, self.dependency, self.declared_range, self.incoming_version
        )
    }
}

/// Everything validation found wrong with a release set.
///
/// Both lists are collected in full so one run reports every pair that
/// needs fixing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Findings {
    /// Declared ranges that cannot be classified or evaluated.
    pub malformed: Vec<MalformedRange>,
    /// Declarations the release would break.
    pub violations: Vec<Violation>,
}

impl Findings {
    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.malformed.is_empty() && self.violations.is_empty()
    }

    /// Number of offending declarations.
    pub fn len(&self) -> usize {
        self.malformed.len() + self.violations.len()
    }

    /// Append everything `other` found.
    pub fn extend(&mut self, other: Self) {
        self.malformed.extend(other.malformed);
        self.violations.extend(other.violations);
    }
}

impl From<MalformedRange> for Findings {
    fn from(range: MalformedRange) -> Self {
        Self {
            malformed: vec![range],
            violations: Vec::new(),
        }
    }
}

impl fmt::Display for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections = Vec::new();
        if !self.malformed.is_empty() {
            sections.push(format!("malformed ranges:\n{}", bullet_list(&self.malformed)));
        }
        if !self.violations.is_empty() {
            sections.push(format!(
                "packages outside the release would no longer match:\n{}",
                bullet_list(&self.violations)
            ));
        }
        f.write_str(&sections.join("\n"))
    }
}

fn bullet_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find every declaration in `package` broken by `releases`.
///
/// Released packages are exempt: their ranges are rewritten, and a rewritten
/// range is satisfied by construction. Only internal dependencies are
/// checked. A declared range that cannot be parsed is recorded as malformed
/// and checking carries on with the next declaration.
pub fn check(package: &Package, releases: &ReleaseSet, graph: &DependencyGraph) -> Findings {
    let mut findings = Findings::default();
    if releases.contains(&package.name) {
        return findings;
    }

    for (dependency, version) in releases.iter() {
        if !graph.contains(dependency) {
            continue;
        }
        for (kind, declared) in package.manifest.declarations(dependency) {
            match range::satisfies(declared, version) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(
                        package = %package.name,
                        dependency,
                        %kind,
                        declared,
                        %version,
                        "declared range excludes released version"
                    );
                    findings.violations.push(Violation {
                        package: package.name.clone(),
                        dependency: dependency.to_owned(),
                        kind,
                        declared_range: declared.to_owned(),
                        incoming_version: version.clone(),
                    });
                }
                Err(_) => findings
                    .malformed
                    .push(MalformedRange::new(&package.name, dependency, kind, declared)),
            }
        }
    }
    findings
}
