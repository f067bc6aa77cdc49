//! Status mapping for search errors.
//!
//! Validation failures become `400`, provider outages `503`, provider
//! timeouts `504`, and anything unexpected a redacted `500`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingParameter
        | ErrorCode::InvalidCategoryFormat
        | ErrorCode::UnknownCategory
        | ErrorCode::InvalidCoordinate => StatusCode::BAD_REQUEST,
        ErrorCode::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body sent to the client. Internal failures lose their message.
fn client_body(error: &Error) -> Error {
    match error.code() {
        ErrorCode::InternalError => {
            error!(
                message = %error.message(),
                trace_id = ?error.trace_id(),
                "internal error"
            );
            let redacted = Error::internal("Internal server error");
            match error.trace_id() {
                Some(id) => redacted.with_trace_id(id.to_owned()),
                None => redacted,
            }
        }
        ErrorCode::ProviderUnavailable | ErrorCode::ProviderTimeout => {
            warn!(
                code = ?error.code(),
                details = ?error.details(),
                trace_id = ?error.trace_id(),
                "place provider failed"
            );
            error.clone()
        }
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(client_body(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
