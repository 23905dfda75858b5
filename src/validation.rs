//! Candidate file validation.

use crate::{config::DEFAULT_EXTENSION, error::ValidationError, file::FileCandidate};

/// Rules a batch of candidate files is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Maximum number of accepted files per batch.
    pub max_count: usize,
    /// Maximum size in bytes of a single file.
    pub max_size: Option<u64>,
    /// Accepted extensions, matched case-insensitively against the file name.
    pub extensions: Vec<String>,
}

impl ValidationRules {
    /// Creates rules accepting up to `max_count` `.mp4` files of any size.
    pub fn new(max_count: usize) -> Self {
        Self {
            max_count,
            max_size: None,
            extensions: vec![DEFAULT_EXTENSION.to_owned()],
        }
    }

    /// Returns `true` when `name` ends in an accepted extension.
    pub fn is_extension_allowed(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };

        self.extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// A file refused by validation.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// The refused file.
    pub file: FileCandidate,
    /// Why it was refused.
    pub reason: ValidationError,
}

/// Partition of a candidate batch.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Accepted files, in input order.
    pub accepted: Vec<FileCandidate>,
    /// Refused files, in input order.
    pub rejections: Vec<Rejection>,
    /// Number of nameless or empty entries dropped as environment artifacts.
    pub dropped: usize,
    /// Set when the batch as a whole must not be uploaded.
    pub batch_rejection: Option<ValidationError>,
}

impl ValidationResult {
    /// Returns `true` when the batch must not be uploaded.
    pub fn is_rejected(&self) -> bool {
        self.batch_rejection.is_some()
    }

    /// Total number of files this result accounts for.
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejections.len() + self.dropped
    }
}

/// Splits `files` into accepted files and rejections.
pub fn validate(files: &[FileCandidate], rules: &ValidationRules) -> ValidationResult {
    let mut result = ValidationResult::default();

    for file in files {
        if file.name.is_empty() || file.size == 0 {
            result.dropped += 1;
            continue;
        }

        let reason = if !rules.is_extension_allowed(&file.name) {
            Some(ValidationError::UnsupportedFormat)
        } else {
            rules
                .max_size
                .filter(|max_size| file.size > *max_size)
                .map(|max_size| ValidationError::FileTooLarge { max_size })
        };

        match reason {
            Some(reason) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    file_name = file.name.as_str(),
                    size = file.size,
                    reason = %reason,
                    "validator: file rejected"
                );
                result.rejections.push(Rejection {
                    file: file.clone(),
                    reason,
                });
            }
            None => result.accepted.push(file.clone()),
        }
    }

    if result.accepted.len() > rules.max_count {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            count = result.accepted.len(),
            max_count = rules.max_count,
            "validator: batch exceeds max file count"
        );
        result.batch_rejection = Some(ValidationError::TooManyFiles {
            count: result.accepted.len(),
            max_count: rules.max_count,
        });
    }

    result
}
