//! Info command — show package, config, and discovered workspace information.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use bumpkin_core::config::{self, Config};
use bumpkin_core::workspace;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    commit: bool,
    update_changelog: bool,
    skip_ci: bool,
    linked: Vec<Vec<String>>,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            commit: config.commit,
            update_changelog: config.update_changelog,
            skip_ci: config.skip_ci,
            linked: config.linked.clone(),
        }
    }
}

#[derive(Serialize)]
struct MemberInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    dir: String,
}

#[derive(Serialize)]
struct WorkspaceInfo {
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    packages: Vec<MemberInfo>,
}

impl WorkspaceInfo {
    fn discover(cwd: &camino::Utf8Path) -> Self {
        let (packages, error) = match workspace::discover(cwd) {
            Ok(packages) => (packages, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        let packages = packages
            .into_iter()
            .map(|package| MemberInfo {
                version: package.version().map(str::to_owned),
                dir: package
                    .dir
                    .strip_prefix(cwd)
                    .unwrap_or(package.dir.as_path())
                    .to_string(),
                name: package.name,
            })
            .collect();
        Self {
            root: cwd.to_string(),
            error,
            packages,
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    workspace: WorkspaceInfo,
}

/// Print package information.
///
/// A missing or broken workspace is reported, not treated as a failure.
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
        workspace: WorkspaceInfo::discover(cwd),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", info.package.name.bold(), info.package.version.green());
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), info.package.license);
    }
    if !info.package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), info.package.repository.cyan());
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    if let Some(ref path) = info.config.config_file {
        println!("{}: {}", "Config file".dimmed(), path.cyan());
    } else {
        println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
    }
    println!("{}: {}", "Log level".dimmed(), info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    println!("{}: {}", "Commit".dimmed(), info.config.commit);
    println!("{}: {}", "Stage changelogs".dimmed(), info.config.update_changelog);
    println!("{}: {}", "Skip CI".dimmed(), info.config.skip_ci);
    for group in &info.config.linked {
        println!("{}: {}", "Linked".dimmed(), group.join(", "));
    }

    println!();
    println!("{}", "Workspace".bold().underline());
    println!("{}: {}", "Root".dimmed(), info.workspace.root);
    if let Some(ref error) = info.workspace.error {
        println!("  {} {}", "○".yellow(), error.yellow());
    }
    for member in &info.workspace.packages {
        println!(
            "  {} {} {}",
            member.name.bold(),
            member.version.as_deref().unwrap_or("-").green(),
            member.dir.dimmed()
        );
    }

    Ok(())
}
