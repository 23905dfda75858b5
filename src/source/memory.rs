use bytes::Bytes;

use super::FileSource;
use crate::ReadError;

/// File content already held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySource {
    body: Bytes,
}

impl MemorySource {
    /// Wraps in-memory file content.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the content length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns `true` when the content is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[async_trait::async_trait]
impl FileSource for MemorySource {
    async fn read(&self) -> Result<Bytes, ReadError> {
        Ok(self.body.clone())
    }
}
