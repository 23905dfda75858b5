//! Structured upload results returned by the server.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ResultError;

/// Normalized `errno` of an upload result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Errno {
    /// The server reported success.
    Success,
    /// The server reported a failure code.
    Failure(String),
}

impl Errno {
    /// Normalizes a raw JSON `errno`.
    ///
    /// Servers answer with either `0` or `"0"`; both count as success, as does
    /// `false`. A single-element array wrapping a success code (`[0]`, `["0"]`)
    /// also counts, matching a loose comparison against `"0"`. Anything else,
    /// including a missing value, is a failure.
    pub fn from_value(value: &Value) -> Self {
        let success = match value {
            Value::Bool(flag) => !flag,
            other => is_zero_code(other),
        };

        if success {
            return Self::Success;
        }

        match value {
            Value::String(text) => Self::Failure(text.clone()),
            Value::Null => Self::Failure("undefined".to_owned()),
            other => Self::Failure(other.to_string()),
        }
    }

    /// Returns `true` for [`Errno::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

// Arrays compare through their joined text, so only `[x]` with `x` reading as
// "0" matches; `[false]` joins to "false" and fails.
fn is_zero_code(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text == "0",
        Value::Array(items) => matches!(items.as_slice(), [item] if is_zero_code(item)),
        _ => false,
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("0"),
            Self::Failure(code) => f.write_str(code),
        }
    }
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default)]
    errno: Value,
    #[serde(default)]
    data: Value,
}

/// Parsed `{errno, data}` upload result.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    /// Normalized result code.
    pub errno: Errno,
    /// Server payload, typically carrying the uploaded video URL(s).
    pub data: Value,
}

impl From<RawResult> for UploadResult {
    fn from(raw: RawResult) -> Self {
        Self {
            errno: Errno::from_value(&raw.errno),
            data: raw.data,
        }
    }
}

impl UploadResult {
    /// Parses a response body; `None` when it is not a JSON object.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        if !value.is_object() {
            return None;
        }

        serde_json::from_value::<RawResult>(value).ok().map(Self::from)
    }

    /// Returns the failing code as a [`ResultError`].
    pub fn check(&self) -> Result<(), ResultError> {
        match &self.errno {
            Errno::Success => Ok(()),
            Errno::Failure(code) => Err(ResultError::NonZeroErrno { code: code.clone() }),
        }
    }
}

/// Why a response that reached the client was not a usable result.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolFailure {
    /// The body could not be parsed; carries the raw text.
    Unparseable(String),
    /// The body parsed but `errno` was not the success code.
    Errno(UploadResult),
}
