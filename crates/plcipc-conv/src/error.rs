//! Error types for variable marshalling

use thiserror::Error;

use crate::types::SemanticKind;

/// Errors raised while converting values to or from wire bytes.
///
/// These are local validation failures, raised before any byte crosses the
/// transport. `Clone` and `PartialEq` are derived so callers can compare
/// consecutive errors when deduplicating notifications.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvError {
    /// The value's kind does not match the variable's declared type
    #[error("value kind does not match variable type: expected {expected}, got {actual}")]
    KindMismatch {
        expected: SemanticKind,
        actual: SemanticKind,
    },

    /// Numeric value outside the type's representable range
    #[error("value out of range: {value} not in [{min}, {max}]")]
    ValueOutOfRange { value: i64, min: i64, max: i64 },

    /// Encoded string (terminator included) exceeds the wire capacity
    #[error("string too long: {len} bytes with terminator, capacity is {max}")]
    StringTooLong { len: usize, max: usize },

    /// Payload length does not match the type's byte width
    #[error("unexpected payload length: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// String payload is not valid UTF-8
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Result type for marshalling operations
pub type ConvResult<T> = Result<T, ConvError>;
