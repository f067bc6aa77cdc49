//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] to a status code; the CLI prints the message. Every variant of
//! the search failure taxonomy has its own stable code so callers can tell a
//! malformed request apart from an unavailable provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required request parameter (`category`, `lat`, `lon`) is absent.
    MissingParameter,
    /// A raw `key=value` category token is malformed.
    InvalidCategoryFormat,
    /// A dictionary category token has no rule in the catalogue.
    UnknownCategory,
    /// A coordinate is not a finite number inside WGS84 bounds.
    InvalidCoordinate,
    /// The geospatial provider failed or could not be reached.
    ProviderUnavailable,
    /// The geospatial provider exceeded its query time budget.
    ProviderTimeout,
    /// An unexpected failure inside the service.
    InternalError,
}

impl ErrorCode {
    /// Whether a caller may reasonably retry the same request later.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ProviderUnavailable | Self::ProviderTimeout)
    }

    /// Whether the failure was detected before any provider round-trip.
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(
            self,
            Self::MissingParameter
                | Self::InvalidCategoryFormat
                | Self::UnknownCategory
                | Self::InvalidCoordinate
        )
    }

    const fn fallback_message(self) -> &'static str {
        match self {
            Self::MissingParameter => "missing required parameter",
            Self::InvalidCategoryFormat => "invalid category format",
            Self::UnknownCategory => "unknown category",
            Self::InvalidCoordinate => "invalid coordinate",
            Self::ProviderUnavailable => "place provider unavailable",
            Self::ProviderTimeout => "place provider timed out",
            Self::InternalError => "internal error",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed.
/// - `trace_id`, when present, is non-empty.
///
/// # Examples
/// ```
/// use nearby::domain::{Error, ErrorCode};
///
/// let err = Error::unknown_category("no rule for 'volcano'");
/// assert_eq!(err.code(), ErrorCode::UnknownCategory);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Validation failures raised when deserialising an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was blank.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Create an error, capturing the ambient [`TraceId`] when one is in scope.
    ///
    /// Blank messages are replaced with a generic message for the code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier, if one was captured.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured details for adapters.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a trace identifier, replacing any ambient one.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        if !trace_id.trim().is_empty() {
            self.trace_id = Some(trace_id);
        }
        self
    }

    /// Convenience constructor for [`ErrorCode::MissingParameter`].
    pub fn missing_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingParameter, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCategoryFormat`].
    pub fn invalid_category_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCategoryFormat, message)
    }

    /// Convenience constructor for [`ErrorCode::UnknownCategory`].
    pub fn unknown_category(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownCategory, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCoordinate`].
    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCoordinate, message)
    }

    /// Convenience constructor for [`ErrorCode::ProviderUnavailable`].
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::ProviderTimeout`].
    pub fn provider_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderTimeout, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            trace_id: value.trace_id,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            trace_id,
            details,
        } = value;
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        if trace_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        // Deserialised payloads carry their own trace; never adopt the ambient one.
        Ok(Self {
            code,
            message,
            trace_id,
            details,
        })
    }
}
