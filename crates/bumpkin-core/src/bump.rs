//! Release bump planning and execution.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Two-phase workflow
//!
//! 1. **Plan** ([`plan`]): check every workspace package against the release
//!    set and compute the rewritten manifests in memory. Any violation or
//!    malformed range aborts here, before a single file is touched.
//! 2. **Execute** ([`BumpPlan::execute`]): persist the rewritten manifests,
//!    then optionally stage and commit them.
//!
//! Splitting the phases lets the CLI show the plan (or stop at `--dry-run`)
//! and ask for confirmation in between.

use std::fmt;

use camino::Utf8PathBuf;
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::check::{self, Findings};
use crate::config::Config;
use crate::git::{GitError, Vcs};
use crate::graph::DependencyGraph;
use crate::manifest::{DependencyKind, Manifest};
use crate::persist::{ManifestStore, PersistError};
use crate::release::{BumpLevel, ReleaseError, ReleaseSet};
use crate::rewrite;
use crate::workspace::{Package, WorkspaceError};

/// Changelog file staged alongside a released package's manifest.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

// ──────────────────────────────────────────────
// Errors and warnings
// ──────────────────────────────────────────────

/// Errors from bump operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// Validation found malformed ranges, broken declarations, or both.
    /// Every offending pair is listed; nothing was written.
    #[error("cannot bump, {0}")]
    Rejected(Findings),

    /// Workspace discovery failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// A manifest could not be written.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Staging or committing failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The release set could not be built.
    #[error(transparent)]
    Release(#[from] ReleaseError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

/// Something worth telling the operator that does not stop the bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum BumpWarning {
    /// A released name is not a workspace package; it is ignored.
    ExternalDependency {
        /// The released name.
        name: String,
    },
    /// The release set was empty.
    NoPendingReleases,
    /// A `linked` group in config names a package the workspace lacks.
    UnknownLinkedPackage {
        /// The unknown name.
        name: String,
    },
}

impl fmt::Display for BumpWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalDependency { name } => {
                write!(f, "{name} is not a workspace package, skipping it")
            }
            Self::NoPendingReleases => write!(f, "no pending releases, nothing to bump"),
            Self::UnknownLinkedPackage { name } => {
                write!(f, "linked package {name} is not in the workspace")
            }
        }
    }
}

/// Where a bump run is. Recorded on log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpStage {
    /// Checking every package against the release set.
    Validating,
    /// Validation found problems; nothing was written.
    Aborted,
    /// Writing rewritten manifests.
    Rewriting,
    /// Every manifest is on disk.
    Persisted,
}

impl fmt::Display for BumpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Aborted => write!(f, "aborted"),
            Self::Rewriting => write!(f, "rewriting"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

// ──────────────────────────────────────────────
// Plan types
// ──────────────────────────────────────────────

/// A declared range that the bump rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeChange {
    /// The released dependency.
    pub dependency: String,
    /// Section the range lives in.
    pub kind: DependencyKind,
    /// Range before the bump.
    pub from: String,
    /// Range after the bump.
    pub to: String,
}

/// One released package and its rewritten manifest.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedUpdate {
    /// Package name.
    pub package: String,
    /// Package directory.
    pub dir: Utf8PathBuf,
    /// Manifest file that will be written.
    pub path: Utf8PathBuf,
    /// Version before the bump, as written in the manifest.
    pub previous_version: Option<String>,
    /// Version after the bump.
    pub new_version: Version,
    /// Bump level, when the release set recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<BumpLevel>,
    /// Dependency ranges that change.
    pub changed_ranges: Vec<RangeChange>,
    #[serde(skip)]
    manifest: Manifest,
}

impl PlannedUpdate {
    /// The manifest as it will be written.
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

/// A validated bump, ready to execute.
#[derive(Debug, Clone, Serialize)]
pub struct BumpPlan {
    /// Internal releases this plan applies.
    pub releases: ReleaseSet,
    /// One entry per released package, in name order.
    pub updates: Vec<PlannedUpdate>,
    /// Non-fatal findings.
    pub warnings: Vec<BumpWarning>,
}

/// Knobs for [`BumpPlan::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpOptions {
    /// Stage and commit the written files.
    pub commit: bool,
    /// Stage each released package's existing changelog with the commit.
    pub update_changelog: bool,
    /// Append `[skip ci]` to the commit message.
    pub skip_ci: bool,
}

impl Default for BumpOptions {
    fn default() -> Self {
        Self {
            commit: false,
            update_changelog: true,
            skip_ci: false,
        }
    }
}

impl From<&Config> for BumpOptions {
    fn from(config: &Config) -> Self {
        Self {
            commit: config.commit,
            update_changelog: config.update_changelog,
            skip_ci: config.skip_ci,
        }
    }
}

/// What [`BumpPlan::execute`] did.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
    /// Manifests written, in name order.
    pub written: Vec<Utf8PathBuf>,
    /// Files handed to the VCS, empty unless committed.
    pub staged: Vec<Utf8PathBuf>,
    /// Whether a commit was created.
    pub committed: bool,
    /// Warnings carried over from planning.
    pub warnings: Vec<BumpWarning>,
}

// ──────────────────────────────────────────────
// Plan
// ──────────────────────────────────────────────

/// Validate `releases` against the whole workspace and compute the rewrites.
///
/// Released names that are not workspace packages are dropped with a
/// [`BumpWarning::ExternalDependency`]. Every package is checked; all
/// malformed ranges and all violations are collected before failing, so one
/// run reports everything that needs fixing.
#[instrument(skip_all, fields(releases = releases.len(), packages = packages.len()))]
pub fn plan(
    releases: &ReleaseSet,
    packages: &[Package],
    graph: &DependencyGraph,
) -> BumpResult<BumpPlan> {
    debug!(stage = %BumpStage::Validating, "validating release set");
    let mut warnings = Vec::new();

    if releases.is_empty() {
        warn!("no pending releases");
        warnings.push(BumpWarning::NoPendingReleases);
        return Ok(BumpPlan {
            releases: ReleaseSet::new(),
            updates: Vec::new(),
            warnings,
        });
    }

    let mut internal = releases.clone();
    internal.retain(|name| {
        if graph.contains(name) {
            return true;
        }
        warn!(name, "released name is not a workspace package");
        warnings.push(BumpWarning::ExternalDependency {
            name: name.to_owned(),
        });
        false
    });

    let mut ordered: Vec<&Package> = packages.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut findings = Findings::default();
    for package in &ordered {
        if internal.contains(&package.name) {
            findings
                .malformed
                .extend(rewrite::malformed_ranges(package, &internal, graph));
        } else {
            findings.extend(check::check(package, &internal, graph));
        }
    }

    if !findings.is_empty() {
        info!(
            stage = %BumpStage::Aborted,
            problems = findings.len(),
            malformed = findings.malformed.len(),
            violations = findings.violations.len(),
            "release set rejected"
        );
        return Err(BumpError::Rejected(findings));
    }

    let mut updates = Vec::new();
    for package in ordered {
        let Some(version) = internal.get(&package.name) else {
            continue;
        };
        let manifest = rewrite::rewrite(package, &internal, graph)
            .map_err(|range| BumpError::Rejected(range.into()))?;
        updates.push(PlannedUpdate {
            package: package.name.clone(),
            dir: package.dir.clone(),
            path: package.manifest_path(),
            previous_version: package.version().map(str::to_owned),
            new_version: version.clone(),
            level: internal.release(&package.name).and_then(|release| release.level),
            changed_ranges: changed_ranges(&package.manifest, &manifest),
            manifest,
        });
    }

    info!(updates = updates.len(), "bump planned");
    Ok(BumpPlan {
        releases: internal,
        updates,
        warnings,
    })
}

fn changed_ranges(before: &Manifest, after: &Manifest) -> Vec<RangeChange> {
    before
        .dependencies()
        .filter_map(|(kind, dependency, from)| {
            let to = after.section(kind)?.get(dependency)?;
            (to != from).then(|| RangeChange {
                dependency: dependency.to_owned(),
                kind,
                from: from.to_owned(),
                to: to.clone(),
            })
        })
        .collect()
}

// ──────────────────────────────────────────────
// Execute
// ──────────────────────────────────────────────

impl BumpPlan {
    /// Whether executing would write nothing.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Write every rewritten manifest, then stage and commit if asked.
    ///
    /// A write failure stops at that manifest; earlier writes stay on disk.
    #[instrument(skip_all, fields(updates = self.updates.len(), commit = options.commit))]
    pub fn execute(
        &self,
        store: &mut impl ManifestStore,
        vcs: &impl Vcs,
        options: &BumpOptions,
    ) -> BumpResult<BumpOutcome> {
        let mut written = Vec::with_capacity(self.updates.len());
        for update in &self.updates {
            debug!(
                stage = %BumpStage::Rewriting,
                package = %update.package,
                version = %update.new_version,
                "writing manifest"
            );
            store.write(&update.path, &update.manifest)?;
            written.push(update.path.clone());
        }
        info!(stage = %BumpStage::Persisted, files = written.len(), "manifests written");

        let mut staged = Vec::new();
        let committed = options.commit && !written.is_empty();
        if committed {
            staged.extend(written.iter().cloned());
            if options.update_changelog {
                staged.extend(
                    self.updates
                        .iter()
                        .map(|update| update.dir.join(CHANGELOG_FILE))
                        .filter(|path| path.is_file()),
                );
            }
            vcs.add(&staged)?;
            vcs.commit(&commit_message(&self.releases, options.skip_ci))?;
            info!(files = staged.len(), "release committed");
        }

        Ok(BumpOutcome {
            written,
            staged,
            committed,
            warnings: self.warnings.clone(),
        })
    }
}

/// Plan and execute in one call.
pub fn bump(
    releases: &ReleaseSet,
    packages: &[Package],
    graph: &DependencyGraph,
    options: &BumpOptions,
    store: &mut impl ManifestStore,
    vcs: &impl Vcs,
) -> BumpResult<BumpOutcome> {
    plan(releases, packages, graph)?.execute(store, vcs, options)
}

/// The release commit message.
pub fn commit_message(releases: &ReleaseSet, skip_ci: bool) -> String {
    let mut message = format!(
        "RELEASING: Releasing {} package(s)\n\nReleases:\n",
        releases.len()
    );
    for (name, version) in releases.iter() {
        message.push_str(&format!("  {name}@{version}\n"));
    }
    if skip_ci {
        message.push_str("\n[skip ci]\n");
    }
    message
}

/// Warn about `linked` config groups naming packages the workspace lacks.
pub fn linked_warnings(linked: &[Vec<String>], graph: &DependencyGraph) -> Vec<BumpWarning> {
    linked
        .iter()
        .flatten()
        .filter(|name| !graph.contains(name))
        .map(|name| BumpWarning::UnknownLinkedPackage { name: name.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitResult;
    use crate::persist::FsManifestStore;
    use camino::Utf8Path;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingStore {
        writes: Vec<(Utf8PathBuf, Manifest)>,
    }

    impl ManifestStore for RecordingStore {
        fn write(&mut self, path: &Utf8Path, manifest: &Manifest) -> Result<(), PersistError> {
            self.writes.push((path.to_path_buf(), manifest.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingVcs {
        added: RefCell<Vec<Utf8PathBuf>>,
        messages: RefCell<Vec<String>>,
    }

    impl Vcs for RecordingVcs {
        fn add(&self, paths: &[Utf8PathBuf]) -> GitResult<()> {
            self.added.borrow_mut().extend_from_slice(paths);
            Ok(())
        }

        fn commit(&self, message: &str) -> GitResult<()> {
            self.messages.borrow_mut().push(message.to_owned());
            Ok(())
        }
    }

    fn workspace(range: &str) -> (Vec<Package>, DependencyGraph) {
        let a = Manifest::new("a", &Version::new(1, 0, 0)).with_dependency(
            DependencyKind::Dependencies,
            "b",
            range,
        );
        let b = Manifest::new("b", &Version::new(1, 0, 0));
        let packages = vec![Package::new("packages/a", a), Package::new("packages/b", b)];
        let graph = DependencyGraph::build(&packages);
        (packages, graph)
    }

    #[test]
    fn breaking_release_aborts_with_one_violation() {
        let (packages, graph) = workspace("^1.0.0");
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));

        let err = plan(&releases, &packages, &graph).unwrap_err();
        let findings = match err {
            BumpError::Rejected(findings) => findings,
            other => panic!("expected a rejection, got {other}"),
        };
        assert!(findings.malformed.is_empty());
        let violations = findings.violations;
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].package, "a");
        assert_eq!(violations[0].dependency, "b");
        assert_eq!(violations[0].declared_range, "^1.0.0");
        assert_eq!(violations[0].incoming_version, Version::new(2, 0, 0));
    }

    #[test]
    fn releasing_dependent_too_rewrites_its_range() {
        let (packages, graph) = workspace("^1.0.0");
        let releases = ReleaseSet::new()
            .with("a", Version::new(1, 1, 0))
            .with("b", Version::new(2, 0, 0));

        let plan = plan(&releases, &packages, &graph).unwrap();
        assert!(plan.warnings.is_empty());
        assert_eq!(plan.updates.len(), 2);

        let a = &plan.updates[0];
        assert_eq!(a.package, "a");
        assert_eq!(a.manifest().version(), Some("1.1.0"));
        assert_eq!(
            a.manifest().section(DependencyKind::Dependencies).unwrap()["b"],
            "^2.0.0"
        );
        assert_eq!(
            a.changed_ranges,
            vec![RangeChange {
                dependency: "b".into(),
                kind: DependencyKind::Dependencies,
                from: "^1.0.0".into(),
                to: "^2.0.0".into(),
            }]
        );
        assert_eq!(plan.updates[1].manifest().version(), Some("2.0.0"));
    }

    #[test]
    fn unknown_release_name_only_warns() {
        let (packages, graph) = workspace("^1.0.0");
        let releases = ReleaseSet::new().with("lodash", Version::new(5, 0, 0));

        let plan = plan(&releases, &packages, &graph).unwrap();
        assert!(plan.is_empty());
        assert!(plan.releases.is_empty());
        assert_eq!(
            plan.warnings,
            vec![BumpWarning::ExternalDependency {
                name: "lodash".into()
            }]
        );
    }

    #[test]
    fn empty_release_set_warns() {
        let (packages, graph) = workspace("^1.0.0");
        let plan = plan(&ReleaseSet::new(), &packages, &graph).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.warnings, vec![BumpWarning::NoPendingReleases]);
    }

    fn rejection(err: BumpError) -> Findings {
        match err {
            BumpError::Rejected(findings) => findings,
            other => panic!("expected a rejection, got {other}"),
        }
    }

    fn depends_on(name: &str, deps: &[(&str, &str)]) -> Package {
        let manifest = deps.iter().fold(
            Manifest::new(name, &Version::new(1, 0, 0)),
            |m, (dep, range)| m.with_dependency(DependencyKind::Dependencies, *dep, *range),
        );
        Package::new(name, manifest)
    }

    #[test]
    fn violations_in_every_package_are_reported() {
        let packages = vec![
            depends_on("a", &[("c", "^1.0.0")]),
            depends_on("b", &[("c", "~1.0.0")]),
            depends_on("c", &[]),
            depends_on("d", &[("c", "1.0.0")]),
        ];
        let graph = DependencyGraph::build(&packages);
        let releases = ReleaseSet::new().with("c", Version::new(2, 0, 0));

        let err = plan(&releases, &packages, &graph).unwrap_err();
        let message = err.to_string();
        let findings = rejection(err);

        let offenders: Vec<_> = findings
            .violations
            .iter()
            .map(|v| (v.package.as_str(), v.declared_range.as_str()))
            .collect();
        assert_eq!(offenders, [("a", "^1.0.0"), ("b", "~1.0.0"), ("d", "1.0.0")]);
        for line in [
            "a declares dependencies `c@^1.0.0`",
            "b declares dependencies `c@~1.0.0`",
            "d declares dependencies `c@1.0.0`",
        ] {
            assert!(message.contains(line), "missing {line:?} in {message}");
        }
    }

    #[test]
    fn malformed_ranges_and_violations_are_reported_together() {
        let packages = vec![
            depends_on("b", &[]),
            depends_on("c", &[]),
            depends_on("d", &[("b", "latest"), ("c", "next")]),
            depends_on("e", &[("b", "^1.0.0")]),
        ];
        let graph = DependencyGraph::build(&packages);
        let releases = ReleaseSet::new()
            .with("b", Version::new(2, 0, 0))
            .with("c", Version::new(2, 0, 0));

        let err = plan(&releases, &packages, &graph).unwrap_err();
        let message = err.to_string();
        let findings = rejection(err);

        let malformed: Vec<_> = findings
            .malformed
            .iter()
            .map(|m| (m.package.as_str(), m.dependency.as_str(), m.range.as_str()))
            .collect();
        assert_eq!(malformed, [("d", "b", "latest"), ("d", "c", "next")]);
        assert_eq!(findings.violations.len(), 1);
        assert_eq!(findings.violations[0].package, "e");
        assert_eq!(findings.violations[0].dependency, "b");

        assert!(message.contains("d: dependencies entry `b` has malformed range `latest`"));
        assert!(message.contains("d: dependencies entry `c` has malformed range `next`"));
        assert!(message.contains("e declares dependencies `b@^1.0.0`, which 2.0.0 does not satisfy"));
    }

    #[test]
    fn released_package_with_unrewritable_range_is_rejected() {
        let packages = vec![
            depends_on("a", &[("b", "workspace:*"), ("c", "^1.0.0")]),
            depends_on("b", &[]),
            depends_on("c", &[]),
            depends_on("d", &[("c", "^1.0.0")]),
        ];
        let graph = DependencyGraph::build(&packages);
        let releases = ReleaseSet::new()
            .with("a", Version::new(1, 0, 1))
            .with("b", Version::new(2, 0, 0))
            .with("c", Version::new(2, 0, 0));

        let findings = rejection(plan(&releases, &packages, &graph).unwrap_err());
        assert_eq!(findings.malformed.len(), 1);
        assert_eq!(findings.malformed[0].package, "a");
        assert_eq!(findings.malformed[0].range, "workspace:*");
        assert_eq!(findings.violations.len(), 1);
        assert_eq!(findings.violations[0].package, "d");
    }

    #[test]
    fn recorded_bump_level_is_carried_into_the_plan() {
        let (packages, graph) = workspace("^1.0.0");
        let mut releases = ReleaseSet::new();
        releases
            .insert("b", Version::new(1, 1, 0), Some(BumpLevel::Minor))
            .unwrap();

        let plan = plan(&releases, &packages, &graph).unwrap();
        assert_eq!(plan.updates[0].level, Some(BumpLevel::Minor));
    }

    #[test]
    fn violations_write_nothing() {
        let (packages, graph) = workspace("~1.0.0");
        let releases = ReleaseSet::new().with("b", Version::new(1, 1, 0));
        let mut store = RecordingStore::default();
        let vcs = RecordingVcs::default();
        let options = BumpOptions {
            commit: true,
            ..BumpOptions::default()
        };

        let result = bump(&releases, &packages, &graph, &options, &mut store, &vcs);
        assert!(matches!(result, Err(BumpError::Rejected(_))));
        assert!(store.writes.is_empty());
        assert!(vcs.messages.borrow().is_empty());
    }

    #[test]
    fn violations_leave_files_on_disk_untouched() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let (mut packages, graph) = workspace("^1.0.0");
        let mut originals = Vec::new();
        for package in &mut packages {
            package.dir = root.join(&package.dir);
            std::fs::create_dir_all(&package.dir).unwrap();
            let content = package.manifest.render().unwrap();
            std::fs::write(package.manifest_path(), &content).unwrap();
            originals.push((package.manifest_path(), content));
        }
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));

        let result = bump(
            &releases,
            &packages,
            &graph,
            &BumpOptions::default(),
            &mut FsManifestStore,
            &RecordingVcs::default(),
        );
        assert!(result.is_err());
        for (path, content) in originals {
            assert_eq!(std::fs::read_to_string(path).unwrap(), content);
        }
    }

    #[test]
    fn execute_writes_only_released_packages() {
        let (packages, graph) = workspace("^1.0.0");
        let releases = ReleaseSet::new().with("b", Version::new(1, 2, 0));
        let mut store = RecordingStore::default();

        let outcome = bump(
            &releases,
            &packages,
            &graph,
            &BumpOptions::default(),
            &mut store,
            &RecordingVcs::default(),
        )
        .unwrap();

        assert_eq!(outcome.written, vec![Utf8PathBuf::from("packages/b/package.json")]);
        assert!(!outcome.committed);
        assert_eq!(store.writes.len(), 1);
        assert_eq!(store.writes[0].1.version(), Some("1.2.0"));
    }

    #[test]
    fn commit_stages_manifests_and_existing_changelogs() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let (mut packages, graph) = workspace("^1.0.0");
        for package in &mut packages {
            package.dir = root.join(&package.dir);
            std::fs::create_dir_all(&package.dir).unwrap();
        }
        std::fs::write(packages[1].dir.join(CHANGELOG_FILE), "# b\n").unwrap();

        let releases = ReleaseSet::new()
            .with("a", Version::new(1, 1, 0))
            .with("b", Version::new(2, 0, 0));
        let vcs = RecordingVcs::default();
        let options = BumpOptions {
            commit: true,
            update_changelog: true,
            skip_ci: true,
        };

        let outcome = bump(
            &releases,
            &packages,
            &graph,
            &options,
            &mut RecordingStore::default(),
            &vcs,
        )
        .unwrap();

        assert!(outcome.committed);
        assert_eq!(
            *vcs.added.borrow(),
            vec![
                packages[0].manifest_path(),
                packages[1].manifest_path(),
                packages[1].dir.join(CHANGELOG_FILE),
            ]
        );
        let messages = vcs.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].ends_with("[skip ci]\n"));
    }

    #[test]
    fn commit_message_lists_releases() {
        let releases = ReleaseSet::new()
            .with("b", Version::new(2, 0, 0))
            .with("a", Version::new(1, 1, 0));

        assert_eq!(
            commit_message(&releases, false),
            "RELEASING: Releasing 2 package(s)\n\nReleases:\n  a@1.1.0\n  b@2.0.0\n"
        );
        assert_eq!(
            commit_message(&releases, true),
            "RELEASING: Releasing 2 package(s)\n\nReleases:\n  a@1.1.0\n  b@2.0.0\n\n[skip ci]\n"
        );
    }

    #[test]
    fn unknown_linked_names_warn() {
        let (_, graph) = workspace("^1.0.0");
        let linked = vec![vec!["a".to_owned(), "ghost".to_owned()]];
        assert_eq!(
            linked_warnings(&linked, &graph),
            vec![BumpWarning::UnknownLinkedPackage {
                name: "ghost".into()
            }]
        );
    }

    #[test]
    fn error_display_lists_every_violation() {
        let (packages, graph) = workspace("^1.0.0");
        let releases = ReleaseSet::new().with("b", Version::new(2, 0, 0));
        let err = plan(&releases, &packages, &graph).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot bump, packages outside the release would no longer match:\n  \
             - a declares dependencies `b@^1.0.0`, which 2.0.0 does not satisfy"
        );
    }
}
