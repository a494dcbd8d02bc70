use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::ClientError;

/// A file the user picked, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl CandidateFile {
    pub async fn from_path(path: &Path) -> Result<CandidateFile, ClientError> {
        let metadata = fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(CandidateFile {
            name,
            size: metadata.len(),
            path: path.to_path_buf(),
        })
    }
}
