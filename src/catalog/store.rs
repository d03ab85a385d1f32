//! Catalog file persistence.
//!
//! The catalog is read in full once and written back in full. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! catalog, so a crash mid-write never leaves a truncated file behind.

use super::CatalogRecord;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading or writing the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write catalog {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a save is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    /// Periodic save after `processed` records.
    Checkpoint { processed: usize },
    /// Save after the last record.
    Final,
}

/// Storage for the full catalog.
pub trait CatalogStore {
    /// Location of the catalog, used in logs and reports.
    fn location(&self) -> &Path;

    fn load(&self) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Persist the whole catalog, replacing what was stored before.
    fn save(&self, records: &[CatalogRecord], phase: SavePhase) -> Result<(), CatalogError>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for &T {
    fn location(&self) -> &Path {
        (**self).location()
    }

    fn load(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        (**self).load()
    }

    fn save(&self, records: &[CatalogRecord], phase: SavePhase) -> Result<(), CatalogError> {
        (**self).save(records, phase)
    }
}

/// Catalog stored as a pretty-printed JSON array.
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        // The temp file is created 0600; keep the catalog's own mode
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CatalogStore for JsonCatalogStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        if !self.path.exists() {
            return Err(CatalogError::NotFound(self.path.clone()));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, records: &[CatalogRecord], phase: SavePhase) -> Result<(), CatalogError> {
        let write_error = |source| CatalogError::Write {
            path: self.path.clone(),
            source,
        };

        let mut bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| write_error(std::io::Error::other(e)))?;
        bytes.push(b'\n');

        self.write_atomically(&bytes).map_err(write_error)?;
        debug!(
            "Wrote {} records to {:?} ({:?})",
            records.len(),
            self.path,
            phase
        );
        Ok(())
    }
}
