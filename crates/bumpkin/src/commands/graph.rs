//! Graph command — show which workspace packages depend on which.

use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::Workspace;

/// Arguments for the `graph` subcommand.
#[derive(Args, Debug, Default)]
pub struct GraphArgs {
    /// Also list dependencies outside the workspace
    #[arg(long)]
    pub external: bool,
}

/// Print the internal dependency graph.
#[instrument(name = "cmd_graph", skip_all, fields(json_output))]
pub fn cmd_graph(
    args: GraphArgs,
    global_json: bool,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing graph command");

    let workspace = Workspace::load(cwd)?;
    let graph = &workspace.graph;

    if global_json {
        println!("{}", serde_json::to_string_pretty(graph)?);
        return Ok(());
    }

    for (name, dependencies) in graph.iter() {
        println!("{}", name.bold());
        if dependencies.is_empty() {
            println!("  {}", "no internal dependencies".dimmed());
        }
        for dependency in dependencies {
            println!("  {} {}", "→".dimmed(), dependency.cyan());
        }
        if args.external
            && let Some(external) = graph.external_of(name)
        {
            for dependency in external {
                println!("  {} {}", "·".dimmed(), dependency.dimmed());
            }
        }
    }

    Ok(())
}
