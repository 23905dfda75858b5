use std::{fmt, path::Path, sync::Arc};

use base64::Engine;
use bytes::Bytes;

use crate::{
    source::{DiskSource, FileSource, MemorySource},
    ReadError,
};

/// A file picked by the user, pending validation.
#[derive(Clone)]
pub struct FileCandidate {
    /// File name as reported by the environment.
    pub name: String,
    /// Size in bytes as reported by the environment.
    pub size: u64,
    /// MIME type when known, otherwise the file extension.
    pub mime_or_extension: String,
    raw: Arc<dyn FileSource>,
}

impl fmt::Debug for FileCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCandidate")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_or_extension", &self.mime_or_extension)
            .finish_non_exhaustive()
    }
}

impl FileCandidate {
    /// Creates a candidate from explicit metadata and a content source.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_or_extension: impl Into<String>,
        raw: impl FileSource,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime_or_extension: mime_or_extension.into(),
            raw: Arc::new(raw),
        }
    }

    /// Creates an in-memory candidate; the size is taken from `body`.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_or_extension: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        let source = MemorySource::new(body);
        Self::new(name, source.len() as u64, mime_or_extension, source)
    }

    /// Creates a candidate for a file on disk, reading its metadata.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            ReadError::new(format!("failed to inspect `{}`: {err}", path.display()))
        })?;

        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or_default()
            .to_owned();
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or_default()
            .to_owned();

        Ok(Self::new(
            name,
            metadata.len(),
            extension,
            DiskSource::new(path),
        ))
    }

    /// Reads the full file content from its source.
    pub async fn read(&self) -> Result<Bytes, ReadError> {
        self.raw.read().await
    }

    /// Reads the file and renders it as a base64 `data:` URL.
    pub async fn read_data_url(&self) -> Result<String, ReadError> {
        let body = self.read().await?;
        Ok(format!(
            "data:{};base64,{}",
            self.content_type().essence_str(),
            base64::engine::general_purpose::STANDARD.encode(&body)
        ))
    }

    /// Returns the content type used when transmitting or embedding this file.
    ///
    /// A full MIME value wins; a bare extension (or the name's extension) is
    /// mapped to a known video type, defaulting to `application/octet-stream`.
    pub fn content_type(&self) -> mime::Mime {
        if self.mime_or_extension.contains('/') {
            if let Ok(parsed) = self.mime_or_extension.parse::<mime::Mime>() {
                return parsed;
            }
        }

        let extension = if self.mime_or_extension.is_empty() {
            self.name.rsplit_once('.').map_or("", |(_, ext)| ext)
        } else {
            self.mime_or_extension.trim_start_matches('.')
        };

        mime_for_extension(extension)
    }
}

fn mime_for_extension(extension: &str) -> mime::Mime {
    let essence = match extension.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        _ => return mime::APPLICATION_OCTET_STREAM,
    };

    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

