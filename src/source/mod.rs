//! File source abstractions and built-in implementations.

use std::fmt;

use bytes::Bytes;

use crate::ReadError;

/// Disk-backed file source.
pub mod disk;
/// In-memory file source.
pub mod memory;
pub use disk::DiskSource;
pub use memory::MemorySource;

/// Opaque handle to the content of a picked file.
#[async_trait::async_trait]
pub trait FileSource: fmt::Debug + Send + Sync + 'static {
    /// Reads the full file content.
    async fn read(&self) -> Result<Bytes, ReadError>;
}
