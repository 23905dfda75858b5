use bytes::{BufMut, Bytes, BytesMut};
use futures::future::try_join_all;

use super::boundary::{generate_boundary, validate_boundary};
use crate::{error::EncodeError, file::FileCandidate};

/// Content of one multipart part.
#[derive(Debug, Clone)]
pub enum PartContent {
    /// A file, read when the body is encoded.
    File(FileCandidate),
    /// A plain text value.
    Text(String),
}

/// One named part of a multipart payload.
#[derive(Debug, Clone)]
pub struct BodyPart {
    /// Form field name.
    pub name: String,
    /// Part content.
    pub content: PartContent,
}

impl BodyPart {
    /// Returns the file behind this part, if any.
    pub fn file(&self) -> Option<&FileCandidate> {
        match &self.content {
            PartContent::File(file) => Some(file),
            PartContent::Text(_) => None,
        }
    }

    /// Returns the text value of this part, if any.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            PartContent::File(_) => None,
            PartContent::Text(value) => Some(value),
        }
    }
}

/// Ordered `multipart/form-data` payload.
///
/// Parts reference their files lazily; nothing is read until [`MultipartBody::encode`].
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<BodyPart>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// Creates an empty payload with a random boundary.
    pub fn new() -> Self {
        Self {
            boundary: generate_boundary(),
            parts: Vec::new(),
        }
    }

    /// Creates an empty payload with an explicit boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Result<Self, EncodeError> {
        let boundary = boundary.into();
        validate_boundary(&boundary)?;
        Ok(Self {
            boundary,
            parts: Vec::new(),
        })
    }

    /// Appends a file part.
    pub fn append_file(&mut self, name: impl Into<String>, file: FileCandidate) {
        self.parts.push(BodyPart {
            name: name.into(),
            content: PartContent::File(file),
        });
    }

    /// Appends a text part.
    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(BodyPart {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
    }

    /// Returns the boundary.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Returns the parts in insertion order.
    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    /// Returns the names of all parts in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    /// Returns the `Content-Type` header value for this payload.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Reads every file part and serializes the full payload.
    pub async fn encode(&self) -> Result<Bytes, EncodeError> {
        let files = try_join_all(
            self.parts
                .iter()
                .filter_map(BodyPart::file)
                .map(FileCandidate::read),
        )
        .await?;
        let mut files = files.into_iter();

        let mut out = BytesMut::new();
        for part in &self.parts {
            out.put_slice(b"--");
            out.put_slice(self.boundary.as_bytes());
            out.put_slice(b"\r\n");

            match &part.content {
                PartContent::File(file) => {
                    let disposition = format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        escape_quoted(&part.name),
                        escape_quoted(&file.name)
                    );
                    out.put_slice(disposition.as_bytes());
                    let content_type = format!("Content-Type: {}\r\n\r\n", file.content_type());
                    out.put_slice(content_type.as_bytes());
                    if let Some(body) = files.next() {
                        out.put_slice(&body);
                    }
                }
                PartContent::Text(value) => {
                    let disposition = format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        escape_quoted(&part.name)
                    );
                    out.put_slice(disposition.as_bytes());
                    out.put_slice(value.as_bytes());
                }
            }
            out.put_slice(b"\r\n");
        }

        out.put_slice(b"--");
        out.put_slice(self.boundary.as_bytes());
        out.put_slice(b"--\r\n");

        Ok(out.freeze())
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
