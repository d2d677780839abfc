//! bumpkin CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bumpkin::{Cli, Commands, commands};
use bumpkin_core::config::ConfigLoader;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let cwd = resolve_cwd(cli.chdir.as_deref())?;

    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        loader = loader.with_file(cwd.join(utf8(config_path, "config path")?));
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::new(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
        cli.quiet,
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging/tracing")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        %cwd,
        "CLI initialized"
    );

    let result = match cli.command {
        Commands::Bump(args) => commands::bump::cmd_bump(args, cli.json, &config, &cwd),
        Commands::Check(args) => commands::check::cmd_check(args, cli.json, &config, &cwd),
        Commands::Graph(args) => commands::graph::cmd_graph(args, cli.json, &cwd),
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &cwd),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}

/// The directory every command works in: `-C DIR` (relative to the process
/// directory) or the process directory itself. The process never changes
/// directory; the path is passed down explicitly.
fn resolve_cwd(chdir: Option<&std::path::Path>) -> anyhow::Result<Utf8PathBuf> {
    let current = std::env::current_dir().context("failed to determine current directory")?;
    let current = utf8(&current, "current directory")?;
    let Some(dir) = chdir else {
        return Ok(current);
    };
    let dir = current.join(utf8(dir, "-C directory")?);
    if !dir.is_dir() {
        anyhow::bail!("failed to change directory to {dir}: not a directory");
    }
    Ok(dir)
}

fn utf8(path: &std::path::Path, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path.to_path_buf())
        .map_err(|e| anyhow::anyhow!("{what} is not valid UTF-8: {}", e.into_path_buf().display()))
}
