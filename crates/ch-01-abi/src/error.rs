//! # Error Types

use thiserror::Error;

/// Errors encoding or decoding ABI data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Not enough bytes for the requested value.
    #[error("short data: need {needed} bytes, have {available}")]
    ShortData {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// A dynamic offset or length points outside the buffer.
    #[error("offset {offset} out of bounds for {len}-byte buffer")]
    OutOfBounds {
        /// Offending offset.
        offset: usize,
        /// Buffer length.
        len: usize,
    },

    /// A `bool` word was neither 0 nor 1.
    #[error("invalid bool word")]
    InvalidBool,

    /// An `address` word had non-zero high bytes.
    #[error("invalid address word")]
    InvalidAddress,

    /// A `string` payload was not UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A fixed-size input array got the wrong number of elements.
    #[error("public input needs {expected} elements, got {found}")]
    InputLength {
        /// Elements the verifier takes.
        expected: usize,
        /// Elements supplied.
        found: usize,
    },
}
