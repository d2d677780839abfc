//! Git staging and commits for release bumps.
//!
//! Shells out to `git` for all operations, so the user's hooks, signing, and
//! identity configuration apply. Every command runs in an explicit working
//! directory; nothing here changes the process's current directory.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Version-control operations the bump needs after files are written.
pub trait Vcs {
    /// Stage `paths` for the next commit.
    fn add(&self, paths: &[Utf8PathBuf]) -> GitResult<()>;

    /// Commit whatever is staged with `message`.
    fn commit(&self, message: &str) -> GitResult<()>;
}

/// [`Vcs`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: Utf8PathBuf,
}

impl GitCli {
    /// Run git commands from `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Check whether `root` is inside a git work tree.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn is_inside_repo(&self) -> GitResult<bool> {
        match git(&self.root, &["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => Ok(output.trim() == "true"),
            Err(GitError::Command { .. } | GitError::NotARepo) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Vcs for GitCli {
    #[instrument(skip(self, paths), fields(root = %self.root, count = paths.len()))]
    fn add(&self, paths: &[Utf8PathBuf]) -> GitResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(|path| path.as_str()));
        git(&self.root, &args)?;
        debug!("staged files");
        Ok(())
    }

    #[instrument(skip(self, message), fields(root = %self.root))]
    fn commit(&self, message: &str) -> GitResult<()> {
        git(&self.root, &["commit", "-m", message])?;
        debug!("created commit");
        Ok(())
    }
}

/// Run a git command in `cwd` and return its stdout.
fn git(cwd: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd.as_std_path())
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}
