//! Command implementations

pub mod bump;

pub mod check;

pub mod graph;

pub mod info;

use std::path::PathBuf;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use tracing::{debug, warn};

use bumpkin_core::Config;
use bumpkin_core::bump::{self as core_bump, BumpWarning};
use bumpkin_core::graph::DependencyGraph;
use bumpkin_core::release::{self, ReleaseSet};
use bumpkin_core::workspace::{self, Package};

/// Where the release set comes from. Shared by `bump` and `check`.
#[derive(Args, Debug, Default)]
pub struct ReleaseArgs {
    /// Releases as NAME@VERSION (e.g. @acme/core@2.0.0)
    #[arg(value_name = "RELEASES")]
    pub releases: Vec<String>,

    /// Release plan file (JSON, TOML, or YAML)
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,
}

impl ReleaseArgs {
    /// Merge the plan file (if any) and the positional pairs into one set.
    pub fn resolve(&self, cwd: &Utf8Path) -> anyhow::Result<ReleaseSet> {
        let mut set = ReleaseSet::new();
        if let Some(ref plan) = self.plan {
            let plan = Utf8PathBuf::try_from(plan.clone()).map_err(|e| {
                anyhow::anyhow!(
                    "plan path is not valid UTF-8: {}",
                    e.into_path_buf().display()
                )
            })?;
            let path = cwd.join(plan);
            set = release::load_plan(&path)
                .with_context(|| format!("failed to load release plan {path}"))?;
        }
        let pairs = release::from_specs(&self.releases).context("invalid release")?;
        set.extend(pairs).context("conflicting releases")?;
        debug!(releases = set.len(), "resolved release set");
        Ok(set)
    }
}

/// Packages and their dependency graph, discovered from the workspace root.
pub struct Workspace {
    /// Workspace root (the command's working directory).
    pub root: Utf8PathBuf,
    /// Member packages, sorted by name.
    pub packages: Vec<Package>,
    /// Internal dependency graph of `packages`.
    pub graph: DependencyGraph,
}

impl Workspace {
    /// Discover the workspace rooted at `cwd`.
    pub fn load(cwd: &Utf8Path) -> anyhow::Result<Self> {
        let packages = workspace::discover(cwd)
            .with_context(|| format!("failed to discover workspace at {cwd}"))?;
        let graph = DependencyGraph::build(&packages);
        debug!(packages = packages.len(), "workspace loaded");
        Ok(Self {
            root: cwd.to_path_buf(),
            packages,
            graph,
        })
    }

    /// Warnings about config that refers to packages not in this workspace.
    pub fn config_warnings(&self, config: &Config) -> Vec<BumpWarning> {
        let warnings = core_bump::linked_warnings(&config.linked, &self.graph);
        for warning in &warnings {
            warn!("{warning}");
        }
        warnings
    }
}
