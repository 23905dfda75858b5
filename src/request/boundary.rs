use uuid::Uuid;

use crate::error::EncodeError;

const MAX_BOUNDARY_LEN: usize = 70;
const BOUNDARY_PREFIX: &str = "vidup-";

/// Generates a fresh random multipart boundary.
pub fn generate_boundary() -> String {
    format!("{BOUNDARY_PREFIX}{}", Uuid::new_v4().simple())
}

/// Checks that `boundary` is usable in a `multipart/form-data` content type.
pub fn validate_boundary(boundary: &str) -> Result<(), EncodeError> {
    if boundary.is_empty() {
        return Err(EncodeError::InvalidBoundary {
            reason: "boundary cannot be empty",
        });
    }

    if boundary.len() > MAX_BOUNDARY_LEN {
        return Err(EncodeError::InvalidBoundary {
            reason: "boundary cannot exceed 70 characters",
        });
    }

    if boundary.ends_with(' ') {
        return Err(EncodeError::InvalidBoundary {
            reason: "boundary cannot end with whitespace",
        });
    }

    if !boundary.chars().all(is_boundary_char) {
        return Err(EncodeError::InvalidBoundary {
            reason: "boundary contains invalid characters",
        });
    }

    Ok(())
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' ')
}
