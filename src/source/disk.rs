use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::FileSource;
use crate::ReadError;

/// File content read lazily from the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSource {
    path: PathBuf,
}

impl DiskSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl FileSource for DiskSource {
    async fn read(&self) -> Result<Bytes, ReadError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %self.path.display(), "disk source: reading file");

        tokio::fs::read(&self.path)
            .await
            .map(Bytes::from)
            .map_err(|err| {
                ReadError::new(format!("failed to read `{}`: {err}", self.path.display()))
            })
    }
}
