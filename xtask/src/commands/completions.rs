use std::path::PathBuf;

use clap::Args;
use clap_complete::{Shell, generate_to};

use crate::BIN_NAME;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Output directory (default: dist/share/completions)
    #[arg(long = "out-dir", default_value = "dist/share/completions")]
    pub out_dir: PathBuf,

    /// Generate only for specific shell (default: all)
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,
}

pub fn cmd_completions(args: CompletionsArgs) -> Result<(), String> {
    let out_dir = super::prepare_out_dir(&args.out_dir)?;
    let mut cmd = bumpkin::command();

    let shells = args.shell.map_or_else(
        || vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell],
        |shell| vec![shell],
    );

    for shell in shells {
        let path = generate_to(shell, &mut cmd, BIN_NAME, &out_dir)
            .map_err(|e| format!("generate {shell} completions: {e}"))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
