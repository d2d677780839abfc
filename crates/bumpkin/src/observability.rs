//! Observability setup: structured logging.
//!
//! Two layers share one registry:
//!
//! - a JSONL file layer for everything the filter lets through;
//! - a compact stderr layer that shows warnings to the operator.
//!
//! Nothing here writes to stdout, which carries command output (and `--json`
//! reports).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::{Level, Metadata};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{EnvFilter, FilterFn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "BUMPKIN_LOG_PATH";
const ENV_LOG_DIR: &str = "BUMPKIN_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// The service name used for the log file name.
    pub service: String,
    /// Directory for JSONL log files. Falls back to platform defaults if unset.
    pub log_dir: Option<PathBuf>,
    /// Hide warnings on stderr.
    pub quiet: bool,
}

impl ObservabilityConfig {
    /// Config for this binary with an optional log directory from config.
    pub fn new(log_dir: Option<PathBuf>, quiet: bool) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
            quiet,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

/// Guard that must be held for the lifetime of the application so buffered
/// log lines are flushed on exit.
pub struct ObservabilityGuard {
    _log_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// When no log file can be opened, JSON lines go to stderr instead and the
/// operator layer is skipped so warnings are not printed twice.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (writer, guard, to_file) = match build_log_writer(&cfg.service, cfg.log_dir.as_deref()) {
        Ok((writer, guard)) => (writer, guard, true),
        Err(err) => {
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, false)
        }
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer)
        .with_filter(env_filter);

    let operator_layer = (to_file && !cfg.quiet).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(FilterFn::new(is_operator_warning))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(operator_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard { _log_guard: guard })
}

fn is_operator_warning(meta: &Metadata<'_>) -> bool {
    meta.is_event() && *meta.level() == Level::WARN
}

/// Build an `EnvFilter` based on CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => {}
        1 => return EnvFilter::new("debug"),
        _ => return EnvFilter::new("trace"),
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

// ============================================================================
// Log Target Resolution
// ============================================================================

fn build_log_writer(
    service: &str,
    config_log_dir: Option<&Path>,
) -> Result<(NonBlocking, WorkerGuard)> {
    let target = resolve_log_target(
        service,
        std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
        std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        config_log_dir.map(Path::to_path_buf),
    )?;

    let appender = tracing_appender::rolling::daily(&target.dir, &target.file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Precedence: `BUMPKIN_LOG_PATH` > `BUMPKIN_LOG_DIR` > config `log_dir` >
/// the user data directory.
fn resolve_log_target(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<LogTarget> {
    if let Some(path) = path_override {
        return log_target_from_path(&path);
    }

    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    let dir = dir_override
        .or(config_dir)
        .or_else(|| {
            directories::ProjectDirs::from("", "", service)
                .map(|dirs| dirs.data_local_dir().join("logs"))
        })
        .ok_or_else(|| anyhow!("no log directory could be determined"))?;

    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: &Path) -> Result<LogTarget> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?
        .to_string();
    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow!("failed to create log directory {}: {e}", dir.display()))?;

    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow!("failed to open log file {}: {e}", path.display()))?;

    Ok(())
}
