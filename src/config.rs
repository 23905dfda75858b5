use std::time::Duration;

use http::HeaderMap;

use crate::{
    alert::AlertMessages,
    error::ConfigError,
    hooks::{CustomUpload, UploadHooks},
    insert::InsertedCallback,
    validation::ValidationRules,
};

/// Default maximum number of files per upload.
pub const DEFAULT_MAX_FILE_COUNT: usize = 100;
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default accepted file extension.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Upload pipeline configuration, read-only during an upload.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Upload endpoint; `None` selects the inline fallback (when enabled).
    pub server_url: Option<String>,
    /// Maximum number of accepted files per upload.
    pub max_file_count: usize,
    /// Maximum size in bytes of a single file.
    pub max_file_size: Option<u64>,
    /// Accepted file extensions, without the leading dot.
    pub accepted_extensions: Vec<String>,
    /// Multipart field name used instead of the file name.
    pub field_name: Option<String>,
    /// Extra key/value parameters sent with the upload, in order.
    pub extra_params: Vec<(String, String)>,
    /// Also append `extra_params` to the URL query string.
    pub params_in_url: bool,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
    /// Send credentials with cross-origin requests.
    pub with_credentials: bool,
    /// Embed files as `data:` URLs when no server URL is configured.
    pub base64_fallback: bool,
    /// Replaces the whole pipeline when set.
    pub custom_upload: Option<CustomUpload>,
    /// Lifecycle hooks.
    pub hooks: UploadHooks,
    /// Runs after every insertion.
    pub on_inserted: Option<InsertedCallback>,
    /// Alert texts.
    pub messages: AlertMessages,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            max_file_size: None,
            accepted_extensions: vec![DEFAULT_EXTENSION.to_owned()],
            field_name: None,
            extra_params: Vec::new(),
            params_in_url: false,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            with_credentials: false,
            base64_fallback: false,
            custom_upload: None,
            hooks: UploadHooks::default(),
            on_inserted: None,
            messages: AlertMessages::default(),
        }
    }
}

impl UploadConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_count == 0 {
            return Err(ConfigError::InvalidMaxFileCount);
        }

        if self.max_file_size == Some(0) {
            return Err(ConfigError::InvalidMaxFileSize);
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        if self.accepted_extensions.is_empty() {
            return Err(ConfigError::EmptyExtensionList);
        }

        if let Some(extension) = self
            .accepted_extensions
            .iter()
            .find(|ext| ext.trim().is_empty() || ext.contains('.'))
        {
            return Err(ConfigError::InvalidExtension {
                extension: extension.clone(),
            });
        }

        if matches!(self.field_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::EmptyFieldName);
        }

        if self.extra_params.iter().any(|(key, _)| key.is_empty()) {
            return Err(ConfigError::EmptyParamKey);
        }

        if let Some(url) = &self.server_url {
            let without_fragment = url.split('#').next().unwrap_or_default();
            if url.trim().is_empty() || without_fragment.parse::<http::Uri>().is_err() {
                return Err(ConfigError::InvalidServerUrl { url: url.clone() });
            }
        }

        if self.server_url.is_none() && !self.base64_fallback && self.custom_upload.is_none() {
            return Err(ConfigError::NoUploadTarget);
        }

        Ok(())
    }

    /// Returns the validation rules derived from this configuration.
    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            max_count: self.max_file_count,
            max_size: self.max_file_size,
            extensions: self.accepted_extensions.clone(),
        }
    }
}
