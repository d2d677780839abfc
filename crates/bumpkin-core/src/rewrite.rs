//! Manifest rewriting for released packages.

use tracing::{debug, trace};

use crate::graph::DependencyGraph;
use crate::manifest::Manifest;
use crate::range::{self, MalformedRange};
use crate::release::ReleaseSet;
use crate::workspace::Package;

/// Compute the updated manifest for `package`.
///
/// Every internal released dependency the package declares gets a new range
/// made of the old range's operator and the new version; if the package is
/// itself released, its own version is replaced. The package is not
/// modified, so an error leaves nothing half-rewritten.
///
/// Applying the same release set to the result again changes nothing.
pub fn rewrite(
    package: &Package,
    releases: &ReleaseSet,
    graph: &DependencyGraph,
) -> Result<Manifest, MalformedRange> {
    let mut manifest = package.manifest.clone();

    for (dependency, version) in releases.iter() {
        if !graph.contains(dependency) {
            continue;
        }
        let declared: Vec<_> = manifest
            .declarations(dependency)
            .map(|(kind, range)| (kind, range.to_owned()))
            .collect();

        for (kind, old) in declared {
            let prefix = range::classify(&old)
                .map_err(|_| MalformedRange::new(&package.name, dependency, kind, &old))?;
            let new = prefix.apply(version);
            trace!(package = %package.name, dependency, %kind, %old, %new, "rewriting range");
            manifest.set_range(kind, dependency, new);
        }
    }

    if let Some(version) = releases.get(&package.name) {
        debug!(package = %package.name, %version, "setting package version");
        manifest.set_version(version);
    }

    Ok(manifest)
}

/// Every range in `package` that [`rewrite`] would fail to classify.
///
/// Lets a caller report all malformed ranges at once instead of stopping at
/// the first.
pub fn malformed_ranges(
    package: &Package,
    releases: &ReleaseSet,
    graph: &DependencyGraph,
) -> Vec<MalformedRange> {
    releases
        .iter()
        .filter(|(dependency, _)| graph.contains(dependency))
        .flat_map(|(dependency, _)| {
            package
                .manifest
                .declarations(dependency)
                .filter(|(_, declared)| range::classify(declared).is_err())
                .map(move |(kind, declared)| {
                    MalformedRange::new(&package.name, dependency, kind, declared)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DependencyKind;
    use semver::Version;

    fn setup(range: &str) -> (Vec<Package>, DependencyGraph) {
        let a = Manifest::new("a", &Version::new(1, 0, 0))
            .with_dependency(DependencyKind::Dependencies, "b", range)
            .with_dependency(DependencyKind::Dependencies, "lodash", "^4.0.0");
        let b = Manifest::new("b", &Version::new(1, 0, 0));
        let packages = vec![Package::new("packages/a", a), Package::new("packages/b", b)];
        let graph = DependencyGraph::build(&packages);
        (packages, graph)
    }

    fn range_of(manifest: &Manifest, kind: DependencyKind, dep: &str) -> String {
        manifest.section(kind).unwrap()[dep].clone()
    }

    #[test]
    fn rewrites_preserving_prefix() {
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));
        for (declared, expected) in [
            ("^1.2.3", "^2.0.0"),
            ("1.2.3", "2.0.0"),
            ("~1.2.3", "~2.0.0"),
            (">=1.0.0", ">=2.0.0"),
        ] {
            let (packages, graph) = setup(declared);
            let updated = rewrite(&packages[0], &releases, &graph).unwrap();
            assert_eq!(
                range_of(&updated, DependencyKind::Dependencies, "b"),
                expected,
                "{declared}"
            );
        }
    }

    #[test]
    fn sets_own_version_when_released() {
        let (packages, graph) = setup("^1.0.0");
        let releases = ReleaseSet::new()
            .with("a", Version::new(1, 1, 0))
            .with("b", Version::new(2, 0, 0));

        let updated = rewrite(&packages[0], &releases, &graph).unwrap();
        assert_eq!(updated.version(), Some("1.1.0"));
        assert_eq!(
            range_of(&updated, DependencyKind::Dependencies, "b"),
            "^2.0.0"
        );
    }

    #[test]
    fn leaves_external_and_unreleased_deps_alone() {
        let (packages, graph) = setup("^1.0.0");
        // lodash is not a workspace package, so releasing it is a no-op.
        let releases = ReleaseSet::new().with("lodash", Version::new(5, 0, 0));

        let updated = rewrite(&packages[0], &releases, &graph).unwrap();
        assert_eq!(updated, packages[0].manifest);
    }

    #[test]
    fn rewrites_every_section_declaring_the_dependency() {
        let a = Manifest::new("a", &Version::new(1, 0, 0))
            .with_dependency(DependencyKind::DevDependencies, "b", "1.0.0")
            .with_dependency(DependencyKind::PeerDependencies, "b", "^1.0.0");
        let packages = vec![
            Package::new("a", a),
            Package::new("b", Manifest::new("b", &Version::new(1, 0, 0))),
        ];
        let graph = DependencyGraph::build(&packages);
        let releases = ReleaseSet::new().with("b", Version::new(1, 1, 0));

        let updated = rewrite(&packages[0], &releases, &graph).unwrap();
        assert_eq!(
            range_of(&updated, DependencyKind::DevDependencies, "b"),
            "1.1.0"
        );
        assert_eq!(
            range_of(&updated, DependencyKind::PeerDependencies, "b"),
            "^1.1.0"
        );
    }

    #[test]
    fn rewrite_is_idempotent() {
        let (packages, graph) = setup("~1.0.0");
        let releases = ReleaseSet::new()
            .with("a", Version::new(1, 0, 1))
            .with("b", Version::new(1, 0, 5));

        let once = rewrite(&packages[0], &releases, &graph).unwrap();
        let again = rewrite(
            &Package::new(packages[0].dir.clone(), once.clone()),
            &releases,
            &graph,
        )
        .unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn malformed_range_names_package_and_dependency() {
        let (packages, graph) = setup("workspace:*");
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));

        let err = rewrite(&packages[0], &releases, &graph).unwrap_err();
        assert_eq!(err.package, "a");
        assert_eq!(err.dependency, "b");
        assert_eq!(err.range, "workspace:*");
    }

    #[test]
    fn malformed_ranges_lists_every_offender() {
        let a = Manifest::new("a", &Version::new(1, 0, 0))
            .with_dependency(DependencyKind::Dependencies, "b", "*")
            .with_dependency(DependencyKind::DevDependencies, "b", "^1.0.0")
            .with_dependency(DependencyKind::Dependencies, "c", ">=1.0.0 <2.0.0");
        let packages = vec![
            Package::new("a", a),
            Package::new("b", Manifest::new("b", &Version::new(1, 0, 0))),
            Package::new("c", Manifest::new("c", &Version::new(1, 0, 0))),
        ];
        let graph = DependencyGraph::build(&packages);
        let releases = ReleaseSet::new()
            .with("b", Version::new(2, 0, 0))
            .with("c", Version::new(2, 0, 0));

        let found = malformed_ranges(&packages[0], &releases, &graph);
        let pairs: Vec<_> = found
            .iter()
            .map(|m| (m.dependency.as_str(), m.range.as_str()))
            .collect();
        assert_eq!(pairs, [("b", "*"), ("c", ">=1.0.0 <2.0.0")]);
    }

    #[test]
    fn input_is_untouched() {
        let (packages, graph) = setup("^1.0.0");
        let before = packages[0].clone();
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));
        let _ = rewrite(&packages[0], &releases, &graph).unwrap();
        assert_eq!(packages[0], before);
    }
}
