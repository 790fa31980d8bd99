//! Binding error types.
//!
//! Every [`ExtractionError`] records the [`BindStage`] that produced it, so the
//! protocol layer can tell a malformed query string from a malformed body or a
//! validation failure without parsing messages.

use batt_core::FieldErrors;
use http::StatusCode;
use std::fmt;

/// The binding stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindStage {
    /// Query string parsing.
    Query,
    /// Route parameter parsing.
    Params,
    /// Body parsing, including size and content-type checks.
    Body,
    /// Validation of the fully bound value.
    Validation,
}

impl fmt::Display for BindStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Params => write!(f, "params"),
            Self::Body => write!(f, "body"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Error that occurs while binding a request.
///
/// # Example
///
/// ```rust
/// use batt_extract::{BindStage, ExtractionError};
/// use http::StatusCode;
///
/// let err = ExtractionError::deserialization_failed(BindStage::Query, "invalid digit");
/// assert_eq!(err.stage(), BindStage::Query);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert!(err.to_string().contains("query"));
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    stage: BindStage,
    kind: ExtractionErrorKind,
    message: String,
    field_errors: Option<FieldErrors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Source could not be decoded into the request type
    DeserializationFailed,
    /// Body is too large
    PayloadTooLarge,
    /// Content-Type is missing or unsupported
    UnsupportedMediaType,
    /// Bound value failed validation
    ValidationFailed,
}

impl ExtractionError {
    /// Creates an error for a source that failed to decode.
    #[must_use]
    pub fn deserialization_failed(stage: BindStage, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            stage,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to parse {stage}: {error}"),
            field_errors: None,
        }
    }

    /// Creates an error for a body over the configured limit.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            stage: BindStage::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field_errors: None,
        }
    }

    /// Creates an error for a body whose content type has no decoder.
    #[must_use]
    pub fn unsupported_media_type(actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            stage: BindStage::Body,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!(
                "unsupported content type: expected 'application/json' or \
                 'application/x-www-form-urlencoded', got '{actual}'"
            ),
            field_errors: None,
        }
    }

    /// Creates an error for a bound value that failed validation.
    #[must_use]
    pub fn validation_failed(errors: FieldErrors) -> Self {
        Self {
            stage: BindStage::Validation,
            kind: ExtractionErrorKind::ValidationFailed,
            message: format!("validation failed: {errors}"),
            field_errors: Some(errors),
        }
    }

    /// Returns the stage that produced this error.
    #[must_use]
    pub const fn stage(&self) -> BindStage {
        self.stage
    }

    /// Returns true if the value was parsed but rejected by validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind == ExtractionErrorKind::ValidationFailed
    }

    /// Returns the per-field validation errors, if this is a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match (self.kind, self.stage) {
            (ExtractionErrorKind::DeserializationFailed, BindStage::Query) => "INVALID_QUERY",
            (ExtractionErrorKind::DeserializationFailed, BindStage::Params) => "INVALID_PARAMS",
            (ExtractionErrorKind::DeserializationFailed, _) => "INVALID_BODY",
            (ExtractionErrorKind::PayloadTooLarge, _) => "PAYLOAD_TOO_LARGE",
            (ExtractionErrorKind::UnsupportedMediaType, _) => "UNSUPPORTED_MEDIA_TYPE",
            (ExtractionErrorKind::ValidationFailed, _) => "VALIDATION_FAILED",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.field_errors
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
