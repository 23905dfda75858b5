//! Upload lifecycle controller.

use std::{fmt, ops::ControlFlow, sync::Arc};

use futures::{stream::FuturesUnordered, StreamExt};
use http::StatusCode;
use uuid::Uuid;

use crate::{
    alert::{self, AlertChannel, AlertMessages},
    config::UploadConfig,
    error::{ConfigError, TransportError, UploadError, ValidationError},
    file::FileCandidate,
    insert::{InsertSink, Inserter, InsertionReport, ReferenceProbe},
    request::{build_request, UploadRequest},
    result::{Errno, ProtocolFailure, UploadResult},
    transport::{NoopTransport, ProgressEvent, ProgressIndicator, Transport, TransportReply},
    validation::{validate, ValidationResult},
};

/// Identifier of one `upload` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadId(Uuid);

impl UploadId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle state of one upload call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadState {
    /// Nothing happened yet.
    Idle,
    /// Candidate files are being validated.
    Validating,
    /// The batch was refused before any request was built.
    Rejected,
    /// The upload request is being assembled.
    Building,
    /// Files are being read for inline embedding.
    Embedding,
    /// The request is in flight.
    Sending,
    /// The server accepted the upload.
    Succeeded,
    /// The server answered with an error status or was unreachable.
    ServerErrored,
    /// The server answer could not be used.
    ProtocolFailed,
    /// The request timed out.
    TimedOut,
    /// A hook, override or the transport took over or cancelled the upload.
    Aborted,
    /// Every readable file was embedded inline.
    Embedded,
}

impl UploadState {
    /// Returns `true` when no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected
                | Self::Succeeded
                | Self::ServerErrored
                | Self::ProtocolFailed
                | Self::TimedOut
                | Self::Aborted
                | Self::Embedded
        )
    }

    /// Returns `true` when `next` directly follows `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        use UploadState::*;

        matches!(
            (self, next),
            (Idle, Validating | Aborted)
                | (Validating, Rejected | Building | Embedding)
                | (Building, Sending | Aborted)
                | (Embedding, Embedded)
                | (Sending, Succeeded | ServerErrored | ProtocolFailed | TimedOut | Aborted)
        )
    }
}

/// Terminal value of one upload attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server returned a result; insertion was left to the hooks.
    Success(UploadResult),
    /// Non-2xx response, or no response at all.
    ServerError(Option<StatusCode>),
    /// Unparseable body or failing `errno`.
    ProtocolFail(ProtocolFailure),
    /// The request timed out.
    Timeout,
    /// A custom override took over (`reason` is `None`), or the `before`
    /// hook cancelled the request.
    AbortedByHook {
        /// Reason returned by the `before` hook.
        reason: Option<String>,
    },
    /// The transport refused to send the request.
    Declined {
        /// Reason returned by the transport.
        reason: String,
    },
    /// Inline fallback finished.
    Embedded {
        /// Files inserted as `data:` URLs.
        inserted: usize,
        /// Files that could not be read.
        failed: usize,
    },
}

impl UploadOutcome {
    /// Maps a failed outcome to the error taxonomy.
    pub fn error(&self) -> Option<UploadError> {
        match self {
            Self::Success(_) | Self::Embedded { .. } | Self::AbortedByHook { reason: None } => None,
            Self::ServerError(status) => Some(TransportError::ServerError { status: *status }.into()),
            Self::ProtocolFail(ProtocolFailure::Unparseable(raw_body)) => Some(
                TransportError::ProtocolError {
                    raw_body: raw_body.clone(),
                }
                .into(),
            ),
            Self::ProtocolFail(ProtocolFailure::Errno(result)) => result.check().err().map(Into::into),
            Self::Timeout => Some(TransportError::Timeout.into()),
            Self::AbortedByHook {
                reason: Some(reason),
            }
            | Self::Declined { reason } => Some(UploadError::Aborted {
                reason: reason.clone(),
            }),
        }
    }
}

/// Everything observed during one `upload` call.
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Identifier of the call, also passed to the progress indicator.
    pub id: UploadId,
    /// Final state.
    pub state: UploadState,
    /// Every state entered, starting with [`UploadState::Idle`].
    pub history: Vec<UploadState>,
    /// Validation result, when validation ran.
    pub validation: Option<ValidationResult>,
    /// Terminal outcome, when an attempt was made.
    pub outcome: Option<UploadOutcome>,
    /// Insertions performed during the call, with their pre-load checks.
    pub insertions: Vec<InsertionReport>,
}

impl UploadReport {
    /// Returns the failure behind this report, if any.
    pub fn error(&self) -> Option<UploadError> {
        if let Some(rejection) = self
            .validation
            .as_ref()
            .and_then(|validation| validation.batch_rejection.clone())
        {
            return Some(rejection.into());
        }

        self.outcome.as_ref().and_then(UploadOutcome::error)
    }
}

struct Lifecycle {
    id: UploadId,
    history: Vec<UploadState>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            id: UploadId::new(),
            history: vec![UploadState::Idle],
        }
    }

    fn state(&self) -> UploadState {
        self.history.last().copied().unwrap_or(UploadState::Idle)
    }

    fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "invalid upload transition {:?} -> {next:?}",
            self.state()
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            upload_id = %self.id,
            from = ?self.state(),
            to = ?next,
            "upload: state transition"
        );

        self.history.push(next);
    }

    fn finish(
        self,
        validation: Option<ValidationResult>,
        outcome: Option<UploadOutcome>,
        insertions: Vec<InsertionReport>,
    ) -> UploadReport {
        UploadReport {
            id: self.id,
            state: self.state(),
            history: self.history,
            validation,
            outcome,
            insertions,
        }
    }
}

/// Video upload pipeline: validation, request building, transport and insertion.
pub struct Uploader<T = NoopTransport> {
    config: UploadConfig,
    transport: T,
    alerts: Arc<dyn AlertChannel>,
    sink: Arc<dyn InsertSink>,
    probe: Option<Arc<dyn ReferenceProbe>>,
    progress: Option<Arc<dyn ProgressIndicator>>,
    messages: Arc<AlertMessages>,
}

impl<T: fmt::Debug> fmt::Debug for Uploader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("probe", &self.probe.as_ref().map(|_| "<probe>"))
            .field("progress", &self.progress.as_ref().map(|_| "<progress>"))
            .finish_non_exhaustive()
    }
}

impl<T> Uploader<T> {
    pub(crate) fn from_parts(
        config: UploadConfig,
        transport: T,
        alerts: Arc<dyn AlertChannel>,
        sink: Arc<dyn InsertSink>,
        probe: Option<Arc<dyn ReferenceProbe>>,
        progress: Option<Arc<dyn ProgressIndicator>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let messages = Arc::new(config.messages.clone());
        Ok(Self {
            config,
            transport,
            alerts,
            sink,
            probe,
            progress,
            messages,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Returns the configured transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Creates an inserter wired to this uploader's document collaborators.
    pub fn inserter(&self) -> Inserter {
        Inserter::new(
            self.sink.clone(),
            self.probe.clone(),
            self.config.on_inserted.clone(),
            self.alerts.clone(),
            self.messages.clone(),
        )
    }

    fn alert(&self, message: &str, debug: Option<&str>) {
        alert::emit(self.alerts.as_ref(), message, debug);
    }
}

impl<T> Uploader<T>
where
    T: Transport,
{
    /// Runs the pipeline for the picked files.
    ///
    /// Never fails: every failure is alerted, passed to its hook and recorded
    /// in the returned report. Must run inside a Tokio runtime with the time
    /// driver enabled.
    pub async fn upload(&self, files: Vec<FileCandidate>) -> UploadReport {
        let mut lifecycle = Lifecycle::new();
        if files.is_empty() {
            return lifecycle.finish(None, None, Vec::new());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(upload_id = %lifecycle.id, files = files.len(), "upload: started");

        let inserter = self.inserter();

        if let Some(custom) = &self.config.custom_upload {
            #[cfg(feature = "tracing")]
            tracing::debug!(upload_id = %lifecycle.id, "upload: handed to custom upload");

            custom.call(files, inserter.clone()).await;
            lifecycle.advance(UploadState::Aborted);
            let insertions = inserter.settle().await;
            return lifecycle.finish(
                None,
                Some(UploadOutcome::AbortedByHook { reason: None }),
                insertions,
            );
        }

        lifecycle.advance(UploadState::Validating);
        let validation = validate(&files, &self.config.rules());
        self.alert_rejections(&validation);

        if validation.is_rejected() || validation.accepted.is_empty() {
            lifecycle.advance(UploadState::Rejected);
            return lifecycle.finish(Some(validation), None, Vec::new());
        }

        let outcome = match build_request(&validation.accepted, &self.config) {
            Some(request) => {
                lifecycle.advance(UploadState::Building);
                self.send(request, &validation.accepted, &inserter, &mut lifecycle)
                    .await
            }
            None if self.config.base64_fallback => {
                lifecycle.advance(UploadState::Embedding);
                let outcome = self.embed(&validation.accepted, &inserter).await;
                lifecycle.advance(UploadState::Embedded);
                outcome
            }
            None => {
                lifecycle.advance(UploadState::Rejected);
                return lifecycle.finish(Some(validation), None, Vec::new());
            }
        };

        let insertions = inserter.settle().await;
        lifecycle.finish(Some(validation), Some(outcome), insertions)
    }

    fn alert_rejections(&self, validation: &ValidationResult) {
        let messages = &self.messages;

        let unsupported: Vec<&str> = validation
            .rejections
            .iter()
            .filter(|rejection| rejection.reason == ValidationError::UnsupportedFormat)
            .map(|rejection| rejection.file.name.as_str())
            .collect();
        if !unsupported.is_empty() {
            let extensions = self.config.accepted_extensions.join("/");
            let message = alert::fill(&messages.unsupported_format, "extensions", &extensions);
            let debug = format!("{message}: {}", unsupported.join(", "));
            self.alert(&message, Some(&debug));
        }

        let too_large = validation.rejections.iter().find_map(|rejection| match rejection.reason {
            ValidationError::FileTooLarge { max_size } => Some(max_size),
            _ => None,
        });
        if let Some(max_size) = too_large {
            let message = alert::fill(&messages.file_too_large, "max_size", &max_size.to_string());
            self.alert(&message, None);
        }

        if let Some(ValidationError::TooManyFiles { max_count, .. }) = &validation.batch_rejection {
            let message = alert::fill(&messages.too_many_files, "max", &max_count.to_string());
            self.alert(&message, None);
        }
    }

    async fn embed(&self, files: &[FileCandidate], inserter: &Inserter) -> UploadOutcome {
        let mut reads: FuturesUnordered<_> = files
            .iter()
            .map(|file| async move { (file, file.read_data_url().await) })
            .collect();

        let (mut inserted, mut failed) = (0, 0);
        while let Some((file, read)) = reads.next().await {
            match read {
                Ok(data_url) => {
                    inserter.insert(&data_url);
                    inserted += 1;
                }
                Err(err) => {
                    failed += 1;
                    let debug = format!("{}, file \"{}\": {err}", self.messages.read_failed, file.name);
                    self.alert(&self.messages.read_failed, Some(&debug));
                }
            }
        }

        UploadOutcome::Embedded { inserted, failed }
    }

    async fn send(
        &self,
        mut request: UploadRequest,
        files: &[FileCandidate],
        inserter: &Inserter,
        lifecycle: &mut Lifecycle,
    ) -> UploadOutcome {
        let hooks = &self.config.hooks;

        if let Some(before) = &hooks.before {
            if let ControlFlow::Break(reason) = before(&mut request, files) {
                self.alert(&reason, None);
                lifecycle.advance(UploadState::Aborted);
                return UploadOutcome::AbortedByHook {
                    reason: Some(reason),
                };
            }
        }

        lifecycle.advance(UploadState::Sending);

        let id = lifecycle.id;
        let indicator = self.progress.as_deref();
        let on_progress = move |event: ProgressEvent| {
            if let (Some(indicator), Some(fraction)) = (indicator, event.fraction()) {
                indicator.show(id, fraction);
            }
        };

        let reply = tokio::time::timeout(request.timeout, self.transport.post(&request, &on_progress))
            .await
            .unwrap_or(TransportReply::TimedOut);

        self.classify(reply, &request, inserter, lifecycle)
    }

    fn classify(
        &self,
        reply: TransportReply,
        request: &UploadRequest,
        inserter: &Inserter,
        lifecycle: &mut Lifecycle,
    ) -> UploadOutcome {
        let hooks = &self.config.hooks;
        let messages = &self.messages;

        #[cfg(feature = "tracing")]
        tracing::debug!(upload_id = %lifecycle.id, reply = ?reply_kind(&reply), "upload: transport replied");

        let (status, body) = match reply {
            TransportReply::Declined(reason) => {
                self.alert(&reason, None);
                lifecycle.advance(UploadState::Aborted);
                return UploadOutcome::Declined { reason };
            }
            TransportReply::TimedOut => {
                self.alert(&messages.upload_timeout, None);
                if let Some(hook) = &hooks.timeout {
                    hook(request);
                }
                lifecycle.advance(UploadState::TimedOut);
                return UploadOutcome::Timeout;
            }
            TransportReply::ConnectionFailed(message) => {
                let debug = format!("{}, connection failed: {message}", messages.upload_error);
                return self.server_error(None, &debug, request, lifecycle);
            }
            TransportReply::Response { status, body } => (status, body),
        };

        if !status.is_success() {
            let debug = format!(
                "{}, server returned status: {}",
                messages.upload_error,
                status.as_u16()
            );
            return self.server_error(Some(status), &debug, request, lifecycle);
        }

        let Some(result) = UploadResult::parse(&body) else {
            let raw = String::from_utf8_lossy(&body).into_owned();
            let debug = format!("{} returned an invalid result, result: {raw}", messages.upload_failed);
            return self.protocol_failure(ProtocolFailure::Unparseable(raw), &debug, request, lifecycle);
        };

        if let Some(custom_insert) = &hooks.custom_insert {
            custom_insert(inserter, &result);
            lifecycle.advance(UploadState::Succeeded);
            return UploadOutcome::Success(result);
        }

        if let Errno::Failure(code) = &result.errno {
            let debug = format!("{} returned an invalid result, errno={code}", messages.upload_failed);
            return self.protocol_failure(ProtocolFailure::Errno(result), &debug, request, lifecycle);
        }

        if let Some(success) = &hooks.success {
            success(request, inserter, &result);
        }
        lifecycle.advance(UploadState::Succeeded);
        UploadOutcome::Success(result)
    }

    fn server_error(
        &self,
        status: Option<StatusCode>,
        debug: &str,
        request: &UploadRequest,
        lifecycle: &mut Lifecycle,
    ) -> UploadOutcome {
        self.alert(&self.messages.upload_error, Some(debug));
        if let Some(hook) = &self.config.hooks.error {
            hook(request, status);
        }
        lifecycle.advance(UploadState::ServerErrored);
        UploadOutcome::ServerError(status)
    }

    fn protocol_failure(
        &self,
        failure: ProtocolFailure,
        debug: &str,
        request: &UploadRequest,
        lifecycle: &mut Lifecycle,
    ) -> UploadOutcome {
        self.alert(&self.messages.upload_failed, Some(debug));
        if let Some(hook) = &self.config.hooks.fail {
            hook(request, &failure);
        }
        lifecycle.advance(UploadState::ProtocolFailed);
        UploadOutcome::ProtocolFail(failure)
    }
}

#[cfg(feature = "tracing")]
fn reply_kind(reply: &TransportReply) -> String {
    match reply {
        TransportReply::Declined(_) => "declined".to_owned(),
        TransportReply::Response { status, .. } => status.as_u16().to_string(),
        TransportReply::ConnectionFailed(_) => "connection_failed".to_owned(),
        TransportReply::TimedOut => "timed_out".to_owned(),
    }
}
