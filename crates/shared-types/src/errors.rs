//! # Error Types
//!
//! Errors shared by crates that parse on-chain values from text.

use thiserror::Error;

/// Errors parsing a field element or other numeric literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty input.
    #[error("empty numeric literal")]
    Empty,

    /// Not valid hex after the `0x` prefix.
    #[error("invalid hex literal: {0}")]
    InvalidHex(String),

    /// Not a valid decimal literal.
    #[error("invalid decimal literal: {0}")]
    InvalidDecimal(String),
}

/// Parse a `0x`-prefixed hex or plain decimal literal into a `U256`.
pub fn parse_u256(literal: &str) -> Result<crate::U256, ParseError> {
    let literal = literal.trim();
    if literal.is_empty() {
        return Err(ParseError::Empty);
    }

    match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(hex) if hex.is_empty() => Err(ParseError::InvalidHex(literal.to_string())),
        Some(hex) => crate::U256::from_str_radix(hex, 16)
            .map_err(|_| ParseError::InvalidHex(literal.to_string())),
        None => crate::U256::from_dec_str(literal)
            .map_err(|_| ParseError::InvalidDecimal(literal.to_string())),
    }
}
