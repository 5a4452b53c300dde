//! HTTP error responses
//!
//! Every variant renders as a short plain-text body:
//! - `MethodNotAllowed` → 405
//! - `NotFound` → 404
//! - `Internal` → 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    NotFound,
    /// Parse, scan or file failure while serving the request
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "404 page not found").into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {}", msg),
            )
                .into_response(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        let parse = Error::Parse {
            line_no: 1,
            content: "x".into(),
        };
        assert_eq!(
            ApiError::from(parse).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
