//! Overflow-checked 64-bit addition.

use std::fmt;

/// Which end of the `i64` range an overflowing sum crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Maximum,
    Minimum,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Maximum => f.write_str("maximum"),
            Bound::Minimum => f.write_str("minimum"),
        }
    }
}

/// The exact sum of two operands does not fit in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("integer overflow: {a} + {b} exceeds {bound} value")]
pub struct OverflowError {
    pub a: i64,
    pub b: i64,
    pub bound: Bound,
}

/// Add two signed 64-bit integers, failing instead of wrapping.
///
/// Overflow is only possible when both operands share a sign, so the
/// crossed bound follows the sign of `a`.
///
/// # Example
///
/// ```
/// use sum_api::arith::{add, Bound};
///
/// assert_eq!(add(5, 3), Ok(8));
/// assert_eq!(add(i64::MAX, 1).unwrap_err().bound, Bound::Maximum);
/// ```
pub fn add(a: i64, b: i64) -> Result<i64, OverflowError> {
    a.checked_add(b).ok_or(OverflowError {
        a,
        b,
        bound: if a > 0 { Bound::Maximum } else { Bound::Minimum },
    })
}
