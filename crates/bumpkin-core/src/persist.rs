//! Writing rewritten manifests back to disk.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::manifest::{Manifest, ManifestError};

/// Errors from persisting a manifest.
#[derive(Error, Debug)]
pub enum PersistError {
    /// The manifest could not be serialized.
    #[error("failed to render {path}: {source}")]
    Render {
        /// Target path.
        path: Utf8PathBuf,
        /// Serialization error.
        source: ManifestError,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Destination for rewritten manifests.
pub trait ManifestStore {
    /// Persist `manifest` at `path`, keeping its original indentation style.
    fn write(&mut self, path: &Utf8Path, manifest: &Manifest) -> Result<(), PersistError>;
}

/// [`ManifestStore`] that writes to the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestStore;

impl ManifestStore for FsManifestStore {
    fn write(&mut self, path: &Utf8Path, manifest: &Manifest) -> Result<(), PersistError> {
        let content = manifest.render().map_err(|source| PersistError::Render {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(%path, indent = ?manifest.indent(), "wrote manifest");
        Ok(())
    }
}
