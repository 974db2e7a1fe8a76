use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse};
use registrar::ErrorBody;
use tracing::warn;

/// A coordinator outcome rendered as `{"error": ...}`.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error {
    #[from]
    source: registrar::Error,
}

impl Error {
    fn invalid_request(message: &str) -> Self {
        registrar::Error::InvalidRequest(message.to_string()).into()
    }
}

impl error::ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::from(&self.source))
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.source.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// An unreadable body is reported like a body without identifiers.
pub(crate) fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = req.path(), error = %err, "rejected request body");
    Error::invalid_request("User ID and Course ID are required").into()
}

pub(crate) fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = req.path(), error = %err, "rejected query string");
    Error::invalid_request("User ID is required").into()
}
