#![allow(dead_code, missing_docs)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use bytes::Bytes;
use http::StatusCode;
use vidup::{
    FileCandidate, InsertionError, ProgressCallback, ProgressEvent, ReferenceProbe, Transport,
    TransportReply, UploadId, UploadRequest, Uploader, UploaderBuilder,
};

/// Shared, cloneable list of observed values.
#[derive(Debug)]
pub struct Recorder<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone> Recorder<T> {
    pub fn push(&self, value: T) {
        self.0.lock().expect("recorder lock").push(value);
    }

    pub fn all(&self) -> Vec<T> {
        self.0.lock().expect("recorder lock").clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().expect("recorder lock").len()
    }
}

pub type Alerts = Recorder<(String, Option<String>)>;

/// Everything the fakes observed while an uploader ran.
#[derive(Clone, Default)]
pub struct Observed {
    pub alerts: Alerts,
    pub inserted: Recorder<String>,
    pub progress: Recorder<(UploadId, f64)>,
}

impl Observed {
    pub fn alert_messages(&self) -> Vec<String> {
        self.alerts.all().into_iter().map(|(message, _)| message).collect()
    }
}

/// Wires recording alert, sink and progress fakes into a builder.
pub fn recording_builder() -> (UploaderBuilder, Observed) {
    let observed = Observed::default();
    let alerts = observed.alerts.clone();
    let inserted = observed.inserted.clone();
    let progress = observed.progress.clone();

    let builder = Uploader::builder()
        .alerts(move |message: &str, debug: Option<&str>| {
            alerts.push((message.to_owned(), debug.map(ToOwned::to_owned)))
        })
        .insert_sink(move |reference: &str| inserted.push(reference.to_owned()))
        .progress(move |id: UploadId, fraction: f64| progress.push((id, fraction)));

    (builder, observed)
}

/// Transport replaying a fixed reply and recording every request.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    reply: TransportReply,
    progress: Vec<ProgressEvent>,
    delay: Option<Duration>,
    pub calls: Recorder<UploadRequest>,
}

impl ScriptedTransport {
    pub fn new(reply: TransportReply) -> Self {
        Self {
            reply,
            progress: Vec::new(),
            delay: None,
            calls: Recorder::default(),
        }
    }

    pub fn json(body: &'static str) -> Self {
        Self::new(TransportReply::Response {
            status: StatusCode::OK,
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    pub fn with_progress(mut self, events: impl IntoIterator<Item = ProgressEvent>) -> Self {
        self.progress = events.into_iter().collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: &UploadRequest, progress: ProgressCallback<'_>) -> TransportReply {
        self.calls.push(request.clone());
        for event in &self.progress {
            progress(*event);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Probe failing for a fixed set of references.
#[derive(Debug, Clone, Default)]
pub struct ListProbe {
    pub broken: Vec<String>,
    pub probed: Recorder<String>,
}

#[async_trait::async_trait]
impl ReferenceProbe for ListProbe {
    async fn probe(&self, reference: &str) -> Result<(), InsertionError> {
        self.probed.push(reference.to_owned());
        if self.broken.iter().any(|broken| broken == reference) {
            return Err(InsertionError::BrokenReference {
                reference: reference.to_owned(),
                reason: "404".to_owned(),
            });
        }
        Ok(())
    }
}

pub fn video(name: &str, size: usize) -> FileCandidate {
    FileCandidate::from_bytes(name, "video/mp4", vec![b'v'; size])
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("vidup-test-{}-{name}", uuid::Uuid::new_v4().simple()))
}
