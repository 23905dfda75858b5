use std::{sync::Arc, time::Duration};

use http::{HeaderName, HeaderValue};

use crate::{
    alert::{AlertChannel, AlertMessages},
    config::UploadConfig,
    controller::Uploader,
    error::ConfigError,
    hooks::{CustomUpload, UploadHooks},
    insert::{InsertSink, InsertedCallback, ReferenceProbe},
    transport::{NoopTransport, ProgressIndicator, Transport},
};

/// Builder for configuring an [`Uploader`].
pub struct UploaderBuilder<T = NoopTransport> {
    config: UploadConfig,
    transport: T,
    alerts: Option<Arc<dyn AlertChannel>>,
    sink: Option<Arc<dyn InsertSink>>,
    probe: Option<Arc<dyn ReferenceProbe>>,
    progress: Option<Arc<dyn ProgressIndicator>>,
}

impl Default for UploaderBuilder<NoopTransport> {
    fn default() -> Self {
        Self {
            config: UploadConfig::default(),
            transport: NoopTransport,
            alerts: None,
            sink: None,
            probe: None,
            progress: None,
        }
    }
}

impl UploaderBuilder<NoopTransport> {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> UploaderBuilder<T> {
    /// Returns the current builder configuration snapshot.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Replaces the full builder configuration.
    pub fn with_config(mut self, config: UploadConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the network transport.
    pub fn transport<U>(self, transport: U) -> UploaderBuilder<U>
    where
        U: Transport,
    {
        UploaderBuilder {
            config: self.config,
            transport,
            alerts: self.alerts,
            sink: self.sink,
            probe: self.probe,
            progress: self.progress,
        }
    }

    /// Sets the channel user-visible alerts are sent to.
    pub fn alerts(mut self, alerts: impl AlertChannel) -> Self {
        self.alerts = Some(Arc::new(alerts));
        self
    }

    /// Sets the document references are inserted into.
    pub fn insert_sink(mut self, sink: impl InsertSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Sets the probe used to detect broken references after insertion.
    pub fn probe(mut self, probe: impl ReferenceProbe) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Sets the progress indicator.
    pub fn progress(mut self, progress: impl ProgressIndicator) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Sets the upload endpoint.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = Some(url.into());
        self
    }

    /// Sets the maximum number of files per upload.
    pub fn max_file_count(mut self, max: usize) -> Self {
        self.config.max_file_count = max;
        self
    }

    /// Sets the maximum size in bytes of a single file.
    pub fn max_file_size(mut self, max: u64) -> Self {
        self.config.max_file_size = Some(max);
        self
    }

    /// Replaces the accepted file extensions.
    pub fn accepted_extensions<I, E>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.config.accepted_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the multipart field name used instead of the file name.
    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.config.field_name = Some(name.into());
        self
    }

    /// Appends an extra upload parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.extra_params.push((key.into(), value.into()));
        self
    }

    /// Also sends extra parameters in the URL query string.
    pub fn params_in_url(mut self, enabled: bool) -> Self {
        self.config.params_in_url = enabled;
        self
    }

    /// Adds a request header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.append(name, value);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sends credentials with cross-origin requests.
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.config.with_credentials = enabled;
        self
    }

    /// Embeds files as `data:` URLs when no server URL is configured.
    pub fn base64_fallback(mut self, enabled: bool) -> Self {
        self.config.base64_fallback = enabled;
        self
    }

    /// Replaces the whole pipeline with a custom upload.
    pub fn custom_upload(mut self, upload: CustomUpload) -> Self {
        self.config.custom_upload = Some(upload);
        self
    }

    /// Sets the lifecycle hooks.
    pub fn hooks(mut self, hooks: UploadHooks) -> Self {
        self.config.hooks = hooks;
        self
    }

    /// Sets the callback run after every insertion.
    pub fn on_inserted<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_inserted = Some(InsertedCallback::new(callback));
        self
    }

    /// Sets the alert texts.
    pub fn messages(mut self, messages: AlertMessages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Validates builder configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// Finalizes and returns a validated uploader.
    pub fn build(self) -> Result<Uploader<T>, ConfigError> {
        let alerts = self
            .alerts
            .ok_or(ConfigError::MissingCollaborator { name: "alerts" })?;
        let sink = self
            .sink
            .ok_or(ConfigError::MissingCollaborator { name: "insert_sink" })?;

        Uploader::from_parts(
            self.config,
            self.transport,
            alerts,
            sink,
            self.probe,
            self.progress,
        )
    }
}
