//! Upload request construction.

use std::time::Duration;

use http::HeaderMap;
use uuid::Uuid;

use crate::{config::UploadConfig, file::FileCandidate};

/// Multipart boundary helpers.
pub mod boundary;
/// Multipart payload model and encoder.
pub mod multipart;
/// Query-string helpers.
pub mod url;

pub use boundary::{generate_boundary, validate_boundary};
pub use multipart::{BodyPart, MultipartBody, PartContent};
pub use url::append_query_params;

const RANDOM_SUFFIX_LEN: usize = 10;

/// Fully assembled upload request, handed to the transport.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target URL, including query parameters and fragment.
    pub url: String,
    /// Multipart payload.
    pub payload: MultipartBody,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
    /// Whether cross-origin requests carry credentials.
    pub with_credentials: bool,
}

/// Builds the upload request for the accepted files.
///
/// Returns `None` when no server URL is configured.
pub fn build_request(accepted: &[FileCandidate], config: &UploadConfig) -> Option<UploadRequest> {
    let server_url = config.server_url.as_deref()?;

    let mut payload = MultipartBody::new();
    for (name, file) in field_names(accepted, config.field_name.as_deref())
        .into_iter()
        .zip(accepted)
    {
        payload.append_file(name, file.clone());
    }
    for (key, value) in &config.extra_params {
        payload.append_text(key.as_str(), value.as_str());
    }

    let url = if config.params_in_url {
        append_query_params(
            server_url,
            config
                .extra_params
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    } else {
        server_url.to_owned()
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        url = url.as_str(),
        files = accepted.len(),
        params = config.extra_params.len(),
        "request builder: built upload request"
    );

    Some(UploadRequest {
        url,
        payload,
        headers: config.headers.clone(),
        timeout: config.timeout,
        with_credentials: config.with_credentials,
    })
}

/// Derives one multipart field name per file.
///
/// Several files get a 1-based index; a single file gets a random suffix.
pub fn field_names(files: &[FileCandidate], template: Option<&str>) -> Vec<String> {
    let single = files.len() == 1;
    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let base = template.unwrap_or(file.name.as_str());
            if single {
                format!("{base}{}", random_suffix())
            } else {
                format!("{base}{}", index + 1)
            }
        })
        .collect()
}

fn random_suffix() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(RANDOM_SUFFIX_LEN);
    suffix
}
