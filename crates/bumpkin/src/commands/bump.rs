//! Bump command — thin CLI layer over `bumpkin_core::bump`.

use anyhow::{Context, bail};
use clap::Args;
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use bumpkin_core::bump::{self, BumpOptions, BumpOutcome, BumpPlan};
use bumpkin_core::config::Config;
use bumpkin_core::git::GitCli;
use bumpkin_core::persist::FsManifestStore;

use super::{ReleaseArgs, Workspace};

/// Arguments for the `bump` subcommand.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    #[command(flatten)]
    pub releases: ReleaseArgs,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Stage and commit the changed files
    #[arg(long, conflicts_with = "no_commit")]
    pub commit: bool,

    /// Do not commit, even if configured to
    #[arg(long)]
    pub no_commit: bool,

    /// Add `[skip ci]` to the release commit
    #[arg(long)]
    pub skip_ci: bool,
}

impl BumpArgs {
    fn options(&self, config: &Config) -> BumpOptions {
        let mut options = BumpOptions::from(config);
        if self.commit {
            options.commit = true;
        }
        if self.no_commit {
            options.commit = false;
        }
        options.skip_ci |= self.skip_ci;
        options
    }
}

#[derive(Serialize)]
struct DryRun<'a> {
    dry_run: bool,
    #[serde(flatten)]
    plan: &'a BumpPlan,
}

/// Execute the bump command.
#[instrument(name = "cmd_bump", skip_all, fields(json_output))]
pub fn cmd_bump(
    args: BumpArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing bump command");

    let workspace = Workspace::load(cwd)?;
    let releases = args.releases.resolve(cwd)?;
    let options = args.options(config);
    let mut plan = bump::plan(&releases, &workspace.packages, &workspace.graph)
        .context("bump rejected")?;
    plan.warnings.extend(workspace.config_warnings(config));

    if global_json {
        if args.dry_run {
            let report = DryRun {
                dry_run: true,
                plan: &plan,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
    } else {
        print_plan(&plan, &workspace.root);
        if args.dry_run {
            println!();
            println!("{}", "Dry run, no changes made.".yellow());
            return Ok(());
        }
    }

    if plan.is_empty() {
        if global_json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        return Ok(());
    }

    let vcs = GitCli::new(workspace.root.clone());
    if options.commit && !vcs.is_inside_repo().context("failed to query git")? {
        bail!("--commit requires a git repository at {}", workspace.root);
    }

    let ask = !args.yes && !global_json && config.confirm.unwrap_or(true);
    if ask && !confirm(&plan)? {
        println!("{}", "Aborted, nothing written.".yellow());
        return Ok(());
    }

    let outcome = plan
        .execute(&mut FsManifestStore, &vcs, &options)
        .context("bump failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, &workspace.root);
    }

    Ok(())
}

fn confirm(plan: &BumpPlan) -> anyhow::Result<bool> {
    Confirm::new(&format!("Write {} manifest(s)?", plan.updates.len()))
        .with_default(true)
        .prompt()
        .context("confirmation cancelled")
}

fn print_plan(plan: &BumpPlan, root: &camino::Utf8Path) {
    if plan.is_empty() {
        println!("{}", "Nothing to bump.".yellow());
        return;
    }

    println!("{}", "Release plan".bold().underline());
    for update in &plan.updates {
        let level = update
            .level
            .map(|level| format!(" ({level})"))
            .unwrap_or_default();
        println!(
            "  {} {} → {}{}",
            update.package.bold(),
            update.previous_version.as_deref().unwrap_or("none").dimmed(),
            update.new_version.to_string().green().bold(),
            level.dimmed()
        );
        for change in &update.changed_ranges {
            println!(
                "      {} {} {} → {}",
                change.kind.to_string().dimmed(),
                change.dependency,
                change.from.dimmed(),
                change.to.cyan()
            );
        }
        let path = update.path.strip_prefix(root).unwrap_or(update.path.as_path());
        println!("      {} {}", "file".dimmed(), path);
    }
}

fn print_outcome(outcome: &BumpOutcome, root: &camino::Utf8Path) {
    println!();
    for path in &outcome.written {
        let path = path.strip_prefix(root).unwrap_or(path.as_path());
        println!("  {} {}", "✓".green(), path.cyan());
    }
    if outcome.committed {
        println!(
            "  {} Committed {} file(s)",
            "✓".green(),
            outcome.staged.len()
        );
    }
}
