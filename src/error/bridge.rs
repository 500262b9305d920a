// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use actix_web::{error, HttpResponse, HttpResponseBuilder};
use actix_web::http::{header, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::log;
use crate::error::error_kind::ErrorKind;

// =================================================================================================

#[derive(Serialize, Deserialize, Clone)]
struct BridgeErrorResponse {
    code: String,
    message: String,
    details: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    errors: Vec<BridgeErrorResponse>
}

// =================================================================================================

/// Uniform error type returned by every registry, topic and trigger operation.
/// The command surface maps the kind to an externally visible status code.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BridgeError {
    /// The kind of error
    pub kind: ErrorKind,

    /// General description of the error
    pub message: String,

    /// The original error we might want to log
    pub error: String,
}

impl fmt::Debug for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BridgeError {{ kind: ErrorKind::{:#?}, message: {:?}, error: {:?} }}",
            self.kind, self.message, self.error
        )
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.kind, self.message, self.error)
    }
}

impl From<ErrorKind> for BridgeError {
    fn from(kind: ErrorKind) -> BridgeError {
        BridgeError::new(kind)
    }
}

/// Converts from serde_json::Error to module error
impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> BridgeError {
        BridgeError::new(ErrorKind::JSONError)
            .with_context("failed to serialize/deserialize object")
            .with_error(e.to_string())
    }
}

impl BridgeError {

    pub fn log(&self) {
        log::error!("{}", self)
    }

    /// Creates a new [`BridgeError`](struct.BridgeError.html)
    pub fn new(kind: ErrorKind) -> BridgeError {
        BridgeError { kind, message: Default::default(), error: Default::default() }
    }

    /// Adds additional context to the error. The additional context will be appended to
    /// the end of the error's display string
    pub fn with_context<S>(mut self, context: S) -> BridgeError
        where
            S: AsRef<str>
    {
        self.message = context.as_ref().to_string();
        self
    }

    /// Add the original error as string to the BridgeError
    pub fn with_error<S>(mut self, error: S) -> BridgeError where S: AsRef<str> {
        self.error = error.as_ref().to_string();
        self
    }
}

impl error::ResponseError for BridgeError {

    /// Returns the status code
    fn status_code(&self) -> StatusCode {
        match self.kind {

            // Invalid requests
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,

            // Not found requests
            ErrorKind::NotFound => StatusCode::NOT_FOUND,

            // Broker and downstream collaborators failed us
            ErrorKind::BrokerError => StatusCode::BAD_GATEWAY,
            ErrorKind::BrokerTimeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::DownstreamError => StatusCode::BAD_GATEWAY,

            // Internal server error
            ErrorKind::JSONError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Return the HTTP error response
    fn error_response(&self) -> HttpResponse {
        // calculate the status code
        let status_code = self.status_code();

        // put together the array of errors: in our case always 1
        // but this keeps the envelope extensible
        let errors: Vec<BridgeErrorResponse> = vec![BridgeErrorResponse {
            code: self.kind.to_string(),
            message: self.message.to_string(),
            details: self.error.to_string(),
        }];

        let error_response = ErrorResponse {
            errors
        };

        let body = serde_json::to_string_pretty(&error_response);

        if body.is_err() {
            return HttpResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
                .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
                .body("Internal Server error!");
        }

        // if we got here then we are fine
        let mut builder = HttpResponseBuilder::new(status_code)
            .insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8")).take();

        builder.body(body.unwrap())
    }
}

#[cfg(test)]
mod test {
    use actix_web::error::ResponseError;
    use actix_web::http::StatusCode;
    use crate::error::bridge::BridgeError;
    use crate::error::error_kind::ErrorKind;

    #[test]
    fn status_code_mapping_test() {
        assert_eq!(StatusCode::BAD_REQUEST, BridgeError::new(ErrorKind::ValidationError).status_code());
        assert_eq!(StatusCode::NOT_FOUND, BridgeError::new(ErrorKind::NotFound).status_code());
        assert_eq!(StatusCode::BAD_GATEWAY, BridgeError::new(ErrorKind::BrokerError).status_code());
        assert_eq!(StatusCode::GATEWAY_TIMEOUT, BridgeError::new(ErrorKind::BrokerTimeout).status_code());
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, BridgeError::new(ErrorKind::InternalError).status_code());
    }

    #[test]
    fn error_context_test() {
        let err = BridgeError::new(ErrorKind::BrokerError)
            .with_context("failed to create topic")
            .with_error("connection refused");
        assert_eq!("failed to create topic", err.message);
        assert_eq!("connection refused", err.error);
    }
}
