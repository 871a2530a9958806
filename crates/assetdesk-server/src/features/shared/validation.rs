//! Shared validation utilities
//!
//! # Examples
//!
//! ```rust,ignore
//! use assetdesk_server::features::shared::validation::{validate_title, validate_url};
//!
//! validate_title("Q3 pricing deck", 300)?;
//! validate_url("https://drive.example.com/file/1", "source_locator", 1000)?;
//! ```

use thiserror::Error;

/// Errors for free-text fields
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

/// Errors for URL fields
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("{field} must be an absolute http:// or https:// URL")]
    InvalidFormat { field: &'static str },
}

/// Validate an asset title
///
/// # Rules
/// - Must not be empty after trimming
/// - At most `max_length` characters (counted as chars, not bytes)
pub fn validate_title(title: &str, max_length: usize) -> Result<(), TextValidationError> {
    validate_required_text(title, "title")?;
    validate_max_length(title, "title", max_length)
}

pub fn validate_required_text(value: &str, field: &'static str) -> Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Required { field });
    }
    Ok(())
}

pub fn validate_max_length(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), TextValidationError> {
    if value.chars().count() > max_length {
        return Err(TextValidationError::TooLong { field, max_length });
    }
    Ok(())
}

/// Validate an absolute http(s) URL
///
/// Parsed with the `url` crate; a host is required.
pub fn validate_url(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), UrlValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UrlValidationError::Required { field });
    }
    if value.chars().count() > max_length {
        return Err(UrlValidationError::TooLong { field, max_length });
    }

    match url::Url::parse(value) {
        Ok(parsed)
            if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() =>
        {
            Ok(())
        },
        _ => Err(UrlValidationError::InvalidFormat { field }),
    }
}
