//! Check command — validate a release set without touching any file.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use std::collections::BTreeMap;

use bumpkin_core::bump::{self, BumpError, BumpWarning};
use bumpkin_core::check::Violation;
use bumpkin_core::config::Config;
use bumpkin_core::graph::DependencyGraph;
use bumpkin_core::range::MalformedRange;
use bumpkin_core::release::ReleaseSet;

use super::{ReleaseArgs, Workspace};

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub releases: ReleaseArgs,
}

#[derive(Serialize, Default)]
struct CheckReport {
    ok: bool,
    releases: usize,
    violations: Vec<Violation>,
    malformed: Vec<MalformedRange>,
    /// Released dependency → dependents that would also need releasing.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    release_also: BTreeMap<String, Vec<String>>,
    warnings: Vec<BumpWarning>,
}

/// Run the bump validation and report every problem found.
#[instrument(name = "cmd_check", skip_all, fields(json_output))]
pub fn cmd_check(
    args: CheckArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing check command");

    let workspace = Workspace::load(cwd)?;
    let releases = args.releases.resolve(cwd)?;
    let mut report = CheckReport {
        releases: releases.len(),
        warnings: workspace.config_warnings(config),
        ..CheckReport::default()
    };

    match bump::plan(&releases, &workspace.packages, &workspace.graph) {
        Ok(plan) => {
            report.ok = true;
            report.warnings.extend(plan.warnings);
        }
        Err(BumpError::Rejected(findings)) => {
            report.release_also =
                unreleased_dependents(&findings.violations, &releases, &workspace.graph);
            report.violations = findings.violations;
            report.malformed = findings.malformed;
        }
        Err(e) => return Err(e).context("check failed"),
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!("release set is not consistent"))
    }
}

/// For each dependency with violations, every workspace dependent left out
/// of the release. Releasing them too lets their ranges be rewritten.
fn unreleased_dependents(
    violations: &[Violation],
    releases: &ReleaseSet,
    graph: &DependencyGraph,
) -> BTreeMap<String, Vec<String>> {
    let mut hints = BTreeMap::new();
    for violation in violations {
        hints.entry(violation.dependency.clone()).or_insert_with(|| {
            graph
                .dependents_of(&violation.dependency)
                .into_iter()
                .filter(|name| !releases.contains(name))
                .map(str::to_owned)
                .collect()
        });
    }
    hints
}

fn print_report(report: &CheckReport) {
    println!("{}", "Release Check".bold().underline());
    println!();

    for range in &report.malformed {
        println!("  {} {range}", "✗".red());
    }
    for violation in &report.violations {
        println!("  {} {violation}", "✗".red());
    }

    if report.ok {
        println!(
            "  {} {} release(s) consistent with the workspace",
            "✓".green(),
            report.releases
        );
    } else {
        let problems = report.malformed.len() + report.violations.len();
        if !report.release_also.is_empty() {
            println!();
        }
        for (dependency, dependents) in &report.release_also {
            println!(
                "  {} releasing {dependency} also needs: {}",
                "hint:".cyan(),
                dependents.join(", ")
            );
        }
        println!();
        println!(
            "  {}: fix the ranges above or add the dependents to the release",
            format!("{problems} problem(s)").red().bold(),
        );
    }
}
