//! Error types for business logic.
//!
//! [`AppError`] is the recommended error type for business logic. The handler
//! adapter never rewrites a business error; it boxes it as-is and the protocol
//! layer maps [`AppError`] categories to status codes. Any other error type
//! is accepted too and is treated as an internal error by the default mapping.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input).
    Validation,
    /// Authentication errors (invalid/missing credentials).
    Authentication,
    /// Authorization errors (permission denied).
    Authorization,
    /// Resource not found.
    NotFound,
    /// Conflict (e.g., concurrent modification).
    Conflict,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard business-logic error.
///
/// # Example
///
/// ```
/// use batt_core::{AppError, ErrorCategory};
///
/// fn find_user(id: u64) -> Result<String, AppError> {
///     if id == 0 {
///         return Err(AppError::not_found("user 0 does not exist"));
///     }
///     Ok(format!("user-{id}"))
/// }
///
/// let err = find_user(0).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// assert_eq!(err.status_code(), http::StatusCode::NOT_FOUND);
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Input was rejected by business rules.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Conflict error (e.g., duplicate key).
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl AppError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the message meant for clients.
    ///
    /// Internal errors hide their details behind a fixed message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal { .. } => "Internal Server Error".to_string(),
            Self::Validation { message, .. }
            | Self::Authentication { message }
            | Self::Authorization { message }
            | Self::NotFound { message }
            | Self::Conflict { message } => message.clone(),
        }
    }
}

/// Field-specific validation errors.
///
/// Keys are field names as the client sent them (the binding tag), values the
/// list of rule violations for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("field validation errors: {}", self.summary())]
pub struct FieldErrors {
    /// Map of field name to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Builder-style variant of [`FieldErrors::add`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Returns true if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Converts to `Err(self)` when any error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::authentication("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::authorization("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = AppError::internal_with_source("db down", std::io::Error::other("refused"));
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.to_string().contains("db down"));
    }

    #[test]
    fn test_field_errors() {
        let errors = FieldErrors::new()
            .with("name", "is required")
            .with("name", "too short")
            .with("age", "must be positive");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields["name"].len(), 2);
        assert!(errors.to_string().contains("age: must be positive"));
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
