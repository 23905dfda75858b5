//! Optional host callbacks observing or overriding pipeline stages.
//!
//! Every hook is optional and dispatched only when present; absence is
//! never an error.

use std::{fmt, future::Future, ops::ControlFlow, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use http::StatusCode;

use crate::{
    file::FileCandidate, insert::Inserter, request::UploadRequest, result::ProtocolFailure,
    result::UploadResult,
};

type BeforeFn = dyn Fn(&mut UploadRequest, &[FileCandidate]) -> ControlFlow<String> + Send + Sync;
type TimeoutFn = dyn Fn(&UploadRequest) + Send + Sync;
type ErrorFn = dyn Fn(&UploadRequest, Option<StatusCode>) + Send + Sync;
type FailFn = dyn Fn(&UploadRequest, &ProtocolFailure) + Send + Sync;
type SuccessFn = dyn Fn(&UploadRequest, &Inserter, &UploadResult) + Send + Sync;
type CustomInsertFn = dyn Fn(&Inserter, &UploadResult) + Send + Sync;
type CustomUploadFn = dyn Fn(Vec<FileCandidate>, Inserter) -> BoxFuture<'static, ()> + Send + Sync;

/// Set of optional upload lifecycle hooks.
#[derive(Clone, Default)]
pub struct UploadHooks {
    pub(crate) before: Option<Arc<BeforeFn>>,
    pub(crate) timeout: Option<Arc<TimeoutFn>>,
    pub(crate) error: Option<Arc<ErrorFn>>,
    pub(crate) fail: Option<Arc<FailFn>>,
    pub(crate) success: Option<Arc<SuccessFn>>,
    pub(crate) custom_insert: Option<Arc<CustomInsertFn>>,
}

impl fmt::Debug for UploadHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |set: bool| if set { Some("<fn>") } else { None };
        f.debug_struct("UploadHooks")
            .field("before", &present(self.before.is_some()))
            .field("timeout", &present(self.timeout.is_some()))
            .field("error", &present(self.error.is_some()))
            .field("fail", &present(self.fail.is_some()))
            .field("success", &present(self.success.is_some()))
            .field("custom_insert", &present(self.custom_insert.is_some()))
            .finish()
    }
}

impl UploadHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before the request is sent. May mutate the request, or return
    /// `ControlFlow::Break(reason)` to cancel it; the reason is alerted.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut UploadRequest, &[FileCandidate]) -> ControlFlow<String> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Runs after a timeout alert.
    pub fn timeout<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UploadRequest) + Send + Sync + 'static,
    {
        self.timeout = Some(Arc::new(hook));
        self
    }

    /// Runs after a non-2xx response or connection failure.
    pub fn error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UploadRequest, Option<StatusCode>) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }

    /// Runs when the response is unparseable or reports a failing `errno`.
    pub fn fail<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UploadRequest, &ProtocolFailure) + Send + Sync + 'static,
    {
        self.fail = Some(Arc::new(hook));
        self
    }

    /// Runs on a successful result. The hook inserts the reference itself.
    pub fn success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UploadRequest, &Inserter, &UploadResult) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(hook));
        self
    }

    /// Takes over insertion for every parsed result, replacing both the
    /// `errno` check and the success hook.
    pub fn custom_insert<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Inserter, &UploadResult) + Send + Sync + 'static,
    {
        self.custom_insert = Some(Arc::new(hook));
        self
    }
}

/// Host-provided replacement for the whole upload pipeline.
#[derive(Clone)]
pub struct CustomUpload(Arc<CustomUploadFn>);

impl fmt::Debug for CustomUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomUpload(<fn>)")
    }
}

impl CustomUpload {
    /// Wraps an async override receiving the picked files and an inserter.
    pub fn new<F, Fut>(upload: F) -> Self
    where
        F: Fn(Vec<FileCandidate>, Inserter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move |files, inserter| upload(files, inserter).boxed()))
    }

    pub(crate) fn call(&self, files: Vec<FileCandidate>, inserter: Inserter) -> BoxFuture<'static, ()> {
        (self.0)(files, inserter)
    }
}
