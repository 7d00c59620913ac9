//! Request validation for the sum endpoint.
//!
//! Checks run in a fixed order: method, presence of both operands, parse of
//! `a`, parse of `b`. The first failure wins.

use axum::http::Method;

use crate::error::{Operand, SumError};

/// Two operands that both parsed as base-10 `i64`.
///
/// Only [`validate`] constructs this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOperands {
    a: i64,
    b: i64,
}

impl ParsedOperands {
    pub fn a(&self) -> i64 {
        self.a
    }

    pub fn b(&self) -> i64 {
        self.b
    }
}

/// Validate the method and raw operand text of a sum request.
pub fn validate(
    method: &Method,
    raw_a: Option<&str>,
    raw_b: Option<&str>,
) -> Result<ParsedOperands, SumError> {
    if *method != Method::GET {
        return Err(SumError::MethodNotAllowed);
    }

    let (raw_a, raw_b) = match (raw_a, raw_b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
        _ => return Err(SumError::MissingParameter),
    };

    Ok(ParsedOperands {
        a: parse_operand(Operand::A, raw_a)?,
        b: parse_operand(Operand::B, raw_b)?,
    })
}

fn parse_operand(operand: Operand, raw: &str) -> Result<i64, SumError> {
    raw.parse::<i64>().map_err(|_| SumError::InvalidParameter {
        operand,
        value: raw.to_string(),
    })
}

/// First decoded value of `key` in a raw query string.
pub fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
