use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use scrape_logging::scrape_debug;
use thiserror::Error;

use crate::filename::sanitize_filename;
use crate::ExportArtifact;

/// Failure to materialize an export on the local filesystem.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{}: not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("{}: cannot use as output directory: {source}", path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Creates `dir` (and parents) unless it already exists as a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::OutputDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(PersistError::OutputDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Writes whole files into one directory. Content lands in a hidden `.part`
/// file first and is renamed over the destination, so an existing export is
/// replaced in one step and never left half-written.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path written. `filename` is sanitized first.
    pub fn write_bytes(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let path = self.dir.join(sanitize_filename(filename));
        let write_err = |source| PersistError::Write {
            path: path.clone(),
            source,
        };

        let mut part = tempfile::Builder::new()
            .prefix(".export-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        part.write_all(content).map_err(write_err)?;
        part.as_file().sync_all().map_err(write_err)?;
        part.persist(&path).map_err(|err| write_err(err.error))?;

        scrape_debug!("wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}

/// Saves an export artifact under `dir` as its suggested filename.
pub fn save_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf, PersistError> {
    AtomicFileWriter::new(dir).write_bytes(&artifact.filename, &artifact.bytes)
}
