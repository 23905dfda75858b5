//! Insertion of final video references into the host document.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::join_all;
use tokio::{runtime::Handle, task::JoinHandle};

use crate::{
    alert::{self, AlertChannel, AlertMessages},
    error::InsertionError,
};

/// Host document receiving inserted video references.
pub trait InsertSink: Send + Sync + 'static {
    /// Inserts a video element for `reference` at the current position.
    fn insert(&self, reference: &str);
}

impl<F> InsertSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn insert(&self, reference: &str) {
        self(reference)
    }
}

/// Best-effort pre-load used to detect broken references after insertion.
#[async_trait::async_trait]
pub trait ReferenceProbe: Send + Sync + 'static {
    /// Loads `reference`, failing with [`InsertionError::BrokenReference`].
    async fn probe(&self, reference: &str) -> Result<(), InsertionError>;
}

/// Renders the element inserted for a video reference.
pub fn video_markup(reference: &str) -> String {
    format!(
        r#"<video src="{}" controls style="max-width:100%;"></video>"#,
        escape_attribute(reference)
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Callback run with every reference right after it is inserted.
#[derive(Clone)]
pub struct InsertedCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl fmt::Debug for InsertedCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InsertedCallback(<fn>)")
    }
}

impl InsertedCallback {
    /// Wraps a post-insert callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }
}

/// Outcome of one insertion, settled after its pre-load check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionReport {
    /// The inserted reference.
    pub reference: String,
    /// Pre-load result; `Ok` when no probe is configured.
    pub check: Result<(), InsertionError>,
}

/// Insertion callback handed to hooks and overrides.
///
/// Cloning is cheap; clones share one list of pending pre-load checks.
#[derive(Clone)]
pub struct Inserter {
    sink: Arc<dyn InsertSink>,
    probe: Option<Arc<dyn ReferenceProbe>>,
    on_inserted: Option<InsertedCallback>,
    alerts: Arc<dyn AlertChannel>,
    messages: Arc<AlertMessages>,
    pending: Arc<Mutex<Vec<PendingCheck>>>,
}

enum PendingCheck {
    /// Pre-load running on the runtime; it alerts on its own.
    Running {
        reference: String,
        handle: JoinHandle<Result<(), InsertionError>>,
    },
    /// Inserted outside a runtime; probed by the next `settle`.
    Deferred(String),
    /// Nothing to probe.
    Done(InsertionReport),
}

impl fmt::Debug for Inserter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inserter")
            .field("probe", &self.probe.as_ref().map(|_| "<probe>"))
            .field("on_inserted", &self.on_inserted.as_ref().map(|_| "<fn>"))
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

impl Inserter {
    pub(crate) fn new(
        sink: Arc<dyn InsertSink>,
        probe: Option<Arc<dyn ReferenceProbe>>,
        on_inserted: Option<InsertedCallback>,
        alerts: Arc<dyn AlertChannel>,
        messages: Arc<AlertMessages>,
    ) -> Self {
        Self {
            sink,
            probe,
            on_inserted,
            alerts,
            messages,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Inserts `reference` into the document and runs the post-insert callback.
    ///
    /// When a probe is configured, its pre-load starts right away on the
    /// current Tokio runtime and alerts on a broken reference whether or not
    /// [`Inserter::settle`] is ever awaited. Outside a runtime the check
    /// waits for the next `settle`.
    pub fn insert(&self, reference: &str) {
        #[cfg(feature = "tracing")]
        tracing::debug!(reference_len = reference.len(), "inserter: inserting video reference");

        self.sink.insert(reference);
        if let Some(callback) = &self.on_inserted {
            (callback.0)(reference);
        }

        let reference = reference.to_owned();
        let check = match (&self.probe, Handle::try_current()) {
            (None, _) => PendingCheck::Done(InsertionReport {
                reference,
                check: Ok(()),
            }),
            (Some(probe), Ok(runtime)) => PendingCheck::Running {
                handle: runtime.spawn(check_reference(
                    probe.clone(),
                    self.alerts.clone(),
                    self.messages.clone(),
                    reference.clone(),
                )),
                reference,
            },
            (Some(_), Err(_)) => PendingCheck::Deferred(reference),
        };

        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(check);
    }

    /// Number of insertions not yet collected by [`Inserter::settle`].
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Waits for every pending pre-load check and returns their reports.
    ///
    /// Results keep insertion order. Each broken reference is alerted once.
    pub async fn settle(&self) -> Vec<InsertionReport> {
        let pending = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));

        join_all(pending.into_iter().map(|check| self.resolve(check))).await
    }

    async fn resolve(&self, check: PendingCheck) -> InsertionReport {
        match check {
            PendingCheck::Done(report) => report,
            PendingCheck::Running { reference, handle } => {
                let check = match handle.await {
                    Ok(check) => check,
                    Err(err) => {
                        let err = InsertionError::BrokenReference {
                            reference: reference.clone(),
                            reason: format!("pre-load task failed: {err}"),
                        };
                        alert_broken(self.alerts.as_ref(), &self.messages, &reference, &err);
                        Err(err)
                    }
                };
                InsertionReport { reference, check }
            }
            PendingCheck::Deferred(reference) => {
                let check = match &self.probe {
                    Some(probe) => {
                        check_reference(
                            probe.clone(),
                            self.alerts.clone(),
                            self.messages.clone(),
                            reference.clone(),
                        )
                        .await
                    }
                    None => Ok(()),
                };
                InsertionReport { reference, check }
            }
        }
    }
}

async fn check_reference(
    probe: Arc<dyn ReferenceProbe>,
    alerts: Arc<dyn AlertChannel>,
    messages: Arc<AlertMessages>,
    reference: String,
) -> Result<(), InsertionError> {
    let check = probe.probe(&reference).await;
    if let Err(err) = &check {
        alert_broken(alerts.as_ref(), &messages, &reference, err);
    }
    check
}

fn alert_broken(
    alerts: &dyn AlertChannel,
    messages: &AlertMessages,
    reference: &str,
    err: &InsertionError,
) {
    #[cfg(feature = "tracing")]
    tracing::warn!(error = %err, "inserter: inserted reference failed to load");

    let debug = format!(
        "{}, video link \"{reference}\", failed to load video: {err}",
        messages.insert_failed
    );
    alert::emit(alerts, &messages.insert_failed, Some(&debug));
}
