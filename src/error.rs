use thiserror::Error;

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `max_file_count` was configured as zero.
    #[error("max_file_count must be greater than 0")]
    InvalidMaxFileCount,
    /// `max_file_size` was configured as zero.
    #[error("max_file_size must be greater than 0")]
    InvalidMaxFileSize,
    /// The request timeout was configured as zero.
    #[error("timeout must be greater than 0")]
    InvalidTimeout,
    /// No accepted file extension was configured.
    #[error("at least one accepted extension is required")]
    EmptyExtensionList,
    /// An accepted extension entry is empty or contains a dot.
    #[error("invalid accepted extension `{extension}`")]
    InvalidExtension {
        /// The offending extension entry.
        extension: String,
    },
    /// The field name template was set to an empty string.
    #[error("field name template cannot be empty")]
    EmptyFieldName,
    /// An extra parameter has an empty key.
    #[error("extra parameter keys cannot be empty")]
    EmptyParamKey,
    /// The server URL does not parse as an HTTP URI.
    #[error("invalid server url `{url}`")]
    InvalidServerUrl {
        /// The configured URL.
        url: String,
    },
    /// Neither a server URL, the base64 fallback, nor a custom upload is configured.
    #[error("no upload target: configure a server url, the base64 fallback or a custom upload")]
    NoUploadTarget,
    /// A required collaborator was not provided to the builder.
    #[error("missing required collaborator `{name}`")]
    MissingCollaborator {
        /// Name of the missing collaborator.
        name: &'static str,
    },
}

/// Reasons a candidate file (or a whole batch) is refused before upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The file name does not end in an accepted extension.
    #[error("unsupported video format")]
    UnsupportedFormat,
    /// The file is larger than the configured limit.
    #[error("file exceeds max size of {max_size} bytes")]
    FileTooLarge {
        /// Configured maximum size in bytes.
        max_size: u64,
    },
    /// More files were accepted than a single upload allows.
    #[error("{count} files selected, at most {max_count} allowed per upload")]
    TooManyFiles {
        /// Number of accepted files in the batch.
        count: usize,
        /// Configured maximum.
        max_count: usize,
    },
}

/// Transport-stage failures, terminal for one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("upload timed out")]
    Timeout,
    /// The server answered with a non-2xx status, or could not be reached.
    #[error("upload failed with status {}", display_status(.status))]
    ServerError {
        /// HTTP status, absent when no response was received.
        status: Option<http::StatusCode>,
    },
    /// The response body is not a structured upload result.
    #[error("unexpected upload response: {raw_body}")]
    ProtocolError {
        /// Raw response text.
        raw_body: String,
    },
}

/// Failures reported inside a well-formed upload result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    /// `errno` was not the success code.
    #[error("upload result reported errno={code}")]
    NonZeroErrno {
        /// The reported code.
        code: String,
    },
}

/// Failures detected after a reference was inserted into the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertionError {
    /// The inserted reference could not be loaded.
    #[error("video reference `{reference}` could not be loaded: {reason}")]
    BrokenReference {
        /// The inserted reference.
        reference: String,
        /// Probe-specific failure context.
        reason: String,
    },
}

/// File source read failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Generic read failure with message context.
    #[error("{message}")]
    Message {
        /// Read failure message.
        message: String,
    },
}

impl ReadError {
    /// Creates a read error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Multipart payload encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A custom boundary is not valid for `multipart/form-data`.
    #[error("invalid multipart boundary: {reason}")]
    InvalidBoundary {
        /// Why the boundary was refused.
        reason: &'static str,
    },
    /// A file part could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Umbrella error covering every failure the pipeline can report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Validation error.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Upload result error.
    #[error(transparent)]
    Result(#[from] ResultError),
    /// Insertion error.
    #[error(transparent)]
    Insertion(#[from] InsertionError),
    /// File read error.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Payload encoding error.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// A hook or the transport declined to send the request.
    #[error("upload aborted: {reason}")]
    Aborted {
        /// Reason given by the hook or transport.
        reason: String,
    },
}

fn display_status(status: &Option<http::StatusCode>) -> String {
    match status {
        Some(status) => status.as_u16().to_string(),
        None => "<no response>".to_owned(),
    }
}
