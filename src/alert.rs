//! User-facing alert channel and message catalogue.

/// Sink for user-visible messages.
///
/// `message` is meant for the end user. `debug`, when present, carries
/// diagnostic context for logs and must not be shown to the user.
pub trait AlertChannel: Send + Sync + 'static {
    /// Surfaces one alert.
    fn alert(&self, message: &str, debug: Option<&str>);
}

impl<F> AlertChannel for F
where
    F: Fn(&str, Option<&str>) + Send + Sync + 'static,
{
    fn alert(&self, message: &str, debug: Option<&str>) {
        self(message, debug)
    }
}

/// Localizable alert texts.
///
/// Placeholders in braces are substituted before the text is alerted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessages {
    /// Batch refused; `{max}` is the configured limit.
    pub too_many_files: String,
    /// Some files refused; `{extensions}` lists the accepted ones.
    pub unsupported_format: String,
    /// Some files refused; `{max_size}` is the limit in bytes.
    pub file_too_large: String,
    /// The upload timed out.
    pub upload_timeout: String,
    /// The server returned an error status.
    pub upload_error: String,
    /// The server returned an unusable result.
    pub upload_failed: String,
    /// A file could not be read for inline embedding.
    pub read_failed: String,
    /// An inserted video could not be loaded.
    pub insert_failed: String,
}

impl Default for AlertMessages {
    fn default() -> Self {
        Self {
            too_many_files: "At most {max} videos can be uploaded at once".to_owned(),
            unsupported_format: "Only {extensions} videos can be uploaded".to_owned(),
            file_too_large: "Videos larger than {max_size} bytes cannot be uploaded".to_owned(),
            upload_timeout: "Video upload timed out".to_owned(),
            upload_error: "Video upload error".to_owned(),
            upload_failed: "Video upload failed".to_owned(),
            read_failed: "Failed to read video".to_owned(),
            insert_failed: "Failed to insert video".to_owned(),
        }
    }
}

pub(crate) fn fill(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{key}}}"), value)
}

/// Forwards to the channel and logs the debug context.
pub(crate) fn emit(channel: &dyn AlertChannel, message: &str, debug: Option<&str>) {
    #[cfg(feature = "tracing")]
    match debug {
        Some(debug) => tracing::error!(alert = message, "{debug}"),
        None => tracing::debug!(alert = message, "alert raised"),
    }

    channel.alert(message, debug);
}
