//! Network transport collaborator contract.

use bytes::Bytes;
use http::StatusCode;

use crate::{controller::UploadId, request::UploadRequest};

/// Upload progress reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes sent so far.
    pub loaded: u64,
    /// Total bytes to send, when known.
    pub total: Option<u64>,
}

impl ProgressEvent {
    /// Creates a progress event.
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// Fraction sent in `[0, 1]`, or `None` when the length is not computable.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// External progress display, one bar per upload id.
pub trait ProgressIndicator: Send + Sync + 'static {
    /// Shows `fraction` (in `[0, 1]`) for the given upload.
    fn show(&self, upload: UploadId, fraction: f64);
}

impl<F> ProgressIndicator for F
where
    F: Fn(UploadId, f64) + Send + Sync + 'static,
{
    fn show(&self, upload: UploadId, fraction: f64) {
        self(upload, fraction)
    }
}

/// Callback a transport invokes for each progress event.
pub type ProgressCallback<'a> = &'a (dyn Fn(ProgressEvent) + Send + Sync);

/// Terminal reply of one transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportReply {
    /// The transport refused to send the request; the reason is alerted.
    Declined(String),
    /// A response was received.
    Response {
        /// HTTP status code.
        status: StatusCode,
        /// Raw response body.
        body: Bytes,
    },
    /// No response was received (DNS, connection reset, …).
    ConnectionFailed(String),
    /// The transport gave up after the request timeout.
    TimedOut,
}

/// Performs the network call for one upload request.
///
/// Implementations honour `request.timeout`, `request.headers` and
/// `request.with_credentials`, may call `progress` any number of times, and
/// return exactly one reply.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// POSTs the request payload to `request.url`.
    async fn post(&self, request: &UploadRequest, progress: ProgressCallback<'_>) -> TransportReply;
}

/// Placeholder transport used when only the inline fallback is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

#[async_trait::async_trait]
impl Transport for NoopTransport {
    async fn post(&self, _request: &UploadRequest, _progress: ProgressCallback<'_>) -> TransportReply {
        TransportReply::Declined("no transport configured; choose a concrete transport".to_owned())
    }
}
