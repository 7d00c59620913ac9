//! Request error taxonomy for the sum endpoint.
//!
//! Every variant is terminal and client-facing. The `Display` text is the
//! exact message sent in the JSON `error` field.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

use crate::arith::OverflowError;
use crate::service::SumResponse;

/// One of the two query operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
}

impl Operand {
    /// Query parameter name.
    pub fn name(self) -> &'static str {
        match self {
            Operand::A => "a",
            Operand::B => "b",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a sum request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SumError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Parameters 'a' and 'b' are required")]
    MissingParameter,

    #[error("Invalid parameter '{operand}'")]
    InvalidParameter { operand: Operand, value: String },

    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

impl SumError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SumError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            SumError::MissingParameter
            | SumError::InvalidParameter { .. }
            | SumError::Overflow(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short machine-friendly label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            SumError::MethodNotAllowed => "method_not_allowed",
            SumError::MissingParameter => "missing_parameter",
            SumError::InvalidParameter { .. } => "invalid_parameter",
            SumError::Overflow(_) => "overflow",
        }
    }
}

impl IntoResponse for SumError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(SumResponse::failure(self.to_string()))).into_response()
    }
}
