#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Video upload pipeline for rich-text editors.
//!
//! Picked files are validated, sent to a remote endpoint as
//! `multipart/form-data` (or embedded inline as `data:` URLs), and the
//! resulting reference is inserted into the host document. Host
//! applications observe or override each stage through optional hooks.

/// Alert channel and message catalogue.
pub mod alert;
/// Fluent builder API.
pub mod builder;
/// Upload pipeline configuration.
pub mod config;
/// Upload lifecycle controller.
pub mod controller;
/// Error types exposed by this crate.
pub mod error;
/// Candidate file model.
pub mod file;
/// Optional lifecycle hooks.
pub mod hooks;
/// Document insertion.
pub mod insert;
/// Upload request construction and multipart encoding.
pub mod request;
/// Structured upload results.
pub mod result;
/// File source traits and implementations.
pub mod source;
/// Transport collaborator contract.
pub mod transport;
/// Candidate file validation.
pub mod validation;

pub use alert::{AlertChannel, AlertMessages};
pub use builder::UploaderBuilder;
pub use config::UploadConfig;
pub use controller::{UploadId, UploadOutcome, UploadReport, UploadState, Uploader};
pub use error::{
    ConfigError, EncodeError, InsertionError, ReadError, ResultError, TransportError, UploadError,
    ValidationError,
};
pub use file::FileCandidate;
pub use hooks::{CustomUpload, UploadHooks};
pub use insert::{video_markup, InsertSink, InsertedCallback, Inserter, InsertionReport, ReferenceProbe};
pub use request::{build_request, MultipartBody, UploadRequest};
pub use result::{Errno, ProtocolFailure, UploadResult};
pub use source::{DiskSource, FileSource, MemorySource};
pub use transport::{
    NoopTransport, ProgressCallback, ProgressEvent, ProgressIndicator, Transport, TransportReply,
};
pub use validation::{validate, Rejection, ValidationResult, ValidationRules};

impl Uploader<NoopTransport> {
    /// Creates a fluent builder with default configuration.
    pub fn builder() -> UploaderBuilder {
        UploaderBuilder::default()
    }
}
