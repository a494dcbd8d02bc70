use std::{
    io,
    path::{Path, PathBuf},
};

use common::util::random::generate_30_alphanumeric;
use tokio::fs;
use tracing::{debug, warn};

/// Hands out uniquely named scratch paths under one directory.
#[derive(Debug, Clone)]
pub struct TempFileProvider {
    directory: PathBuf,
}

impl TempFileProvider {
    /// Anything left from a previous run belonged to no live request and is removed.
    pub async fn build(directory: PathBuf) -> io::Result<TempFileProvider> {
        if fs::try_exists(&directory).await? {
            fs::remove_dir_all(&directory).await?;
        }
        fs::create_dir_all(&directory).await?;
        Ok(TempFileProvider { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn get_path(&self, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", generate_30_alphanumeric(), extension))
    }

    /// Nothing is created on disk yet; the guard only owns the name.
    pub fn scoped(&self, extension: &str) -> ScopedTempFile {
        ScopedTempFile::new(self.get_path(extension))
    }
}

/// Deletes its file when dropped, whichever way the owning request ends.
#[derive(Debug)]
pub struct ScopedTempFile {
    path: PathBuf,
}

impl ScopedTempFile {
    pub fn new(path: PathBuf) -> ScopedTempFile {
        ScopedTempFile { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedTempFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp file {}", self.path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Error occured, while deleting temp file {}: {}", self.path.display(), err),
        }
    }
}
