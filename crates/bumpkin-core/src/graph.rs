//! Internal dependency graph of a workspace.
//!
//! Maps every workspace package to the workspace packages it depends on, in
//! any dependency section. Names a manifest references that are not part of
//! the workspace are kept apart as external dependencies; they are never
//! validated against semver.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::workspace::Package;

/// Package name → dependency names.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

/// Dependency graph restricted to workspace packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    internal: Adjacency,
    external: Adjacency,
}

impl DependencyGraph {
    /// Build the graph for a set of workspace packages.
    #[instrument(skip_all, fields(packages = packages.len()))]
    pub fn build(packages: &[Package]) -> Self {
        let names: BTreeSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        let mut graph = Self::default();

        for package in packages {
            let internal = graph.internal.entry(package.name.clone()).or_default();
            let mut external = BTreeSet::new();
            for (_, dependency, _) in package.manifest.dependencies() {
                if names.contains(dependency) {
                    internal.insert(dependency.to_owned());
                } else {
                    external.insert(dependency.to_owned());
                }
            }
            if !external.is_empty() {
                graph.external.insert(package.name.clone(), external);
            }
        }

        debug!(
            internal_edges = graph.internal.values().map(BTreeSet::len).sum::<usize>(),
            "built dependency graph"
        );
        graph
    }

    /// Whether `name` is a workspace package.
    pub fn contains(&self, name: &str) -> bool {
        self.internal.contains_key(name)
    }

    /// Internal dependencies of `name`.
    pub fn dependencies_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.internal.get(name)
    }

    /// External dependency names referenced by `name`.
    pub fn external_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.external.get(name)
    }

    /// Workspace packages that depend on `name`, sorted.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.internal
            .iter()
            .filter(|(_, deps)| deps.contains(name))
            .map(|(pkg, _)| pkg.as_str())
            .collect()
    }

    /// Iterate `(package, internal dependencies)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.internal.iter().map(|(name, deps)| (name.as_str(), deps))
    }

    /// Number of workspace packages.
    pub fn len(&self) -> usize {
        self.internal.len()
    }

    /// Whether the graph has no packages.
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DependencyKind, Manifest};
    use semver::Version;

    fn package(name: &str, deps: &[(DependencyKind, &str)]) -> Package {
        let manifest = deps.iter().fold(
            Manifest::new(name, &Version::new(1, 0, 0)),
            |m, (kind, dep)| m.with_dependency(*kind, *dep, "^1.0.0"),
        );
        Package::new(format!("packages/{name}"), manifest)
    }

    #[test]
    fn splits_internal_and_external() {
        let packages = vec![
            package(
                "a",
                &[
                    (DependencyKind::Dependencies, "b"),
                    (DependencyKind::DevDependencies, "jest"),
                ],
            ),
            package("b", &[(DependencyKind::PeerDependencies, "react")]),
        ];
        let graph = DependencyGraph::build(&packages);

        assert!(graph.contains("a"));
        assert!(graph.contains("b"));
        assert!(!graph.contains("jest"));
        assert_eq!(
            graph.dependencies_of("a").unwrap().iter().collect::<Vec<_>>(),
            ["b"]
        );
        assert!(graph.dependencies_of("b").unwrap().is_empty());
        assert_eq!(
            graph.external_of("a").unwrap().iter().collect::<Vec<_>>(),
            ["jest"]
        );
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn dependency_in_several_sections_is_one_edge() {
        let packages = vec![
            package(
                "a",
                &[
                    (DependencyKind::Dependencies, "b"),
                    (DependencyKind::PeerDependencies, "b"),
                ],
            ),
            package("b", &[]),
        ];
        let graph = DependencyGraph::build(&packages);
        assert_eq!(graph.dependencies_of("a").unwrap().len(), 1);
    }

    #[test]
    fn dependents_are_sorted() {
        let packages = vec![
            package("c", &[(DependencyKind::Dependencies, "b")]),
            package("a", &[(DependencyKind::Dependencies, "b")]),
            package("b", &[]),
        ];
        let graph = DependencyGraph::build(&packages);
        assert_eq!(graph.dependents_of("b"), ["a", "c"]);
        assert!(graph.dependents_of("a").is_empty());
    }
}
