//! # ABI Decoder
//!
//! Decoders for the single-value returns the deed contracts produce, plus
//! revert-reason extraction.

use crate::error::AbiError;
use crate::hash::selector;
use crate::WORD;
use shared_types::{Address, U256};

/// Selector of `Error(string)`, the payload of `require(cond, "reason")`.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Read the `index`-th word of `data`.
pub fn word(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    let start = index * WORD;
    let end = start + WORD;
    data.get(start..end).ok_or(AbiError::ShortData {
        needed: end,
        available: data.len(),
    })
}

fn word_as_usize(word: &[u8], len: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(word);
    if value > U256::from(len) {
        return Err(AbiError::OutOfBounds {
            offset: usize::MAX,
            len,
        });
    }
    Ok(value.as_usize())
}

/// Decode a `uint256` return value.
pub fn decode_u256(data: &[u8]) -> Result<U256, AbiError> {
    Ok(U256::from_big_endian(word(data, 0)?))
}

/// Decode a `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    match decode_u256(data)? {
        v if v.is_zero() => Ok(false),
        v if v == U256::one() => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

/// Decode an `address` from a word.
pub fn address_from_word(word: &[u8]) -> Result<Address, AbiError> {
    if word.len() != WORD {
        return Err(AbiError::ShortData {
            needed: WORD,
            available: word.len(),
        });
    }
    if word[..12].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidAddress);
    }
    Ok(Address::from_slice(&word[12..]))
}

/// Decode an `address` return value.
pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    address_from_word(word(data, 0)?)
}

/// Decode a `string` return value (dynamic type).
pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    // First word: offset to the string; at offset: length, then bytes
    let offset = word_as_usize(word(data, 0)?, data.len())?;
    let len_word = data
        .get(offset..offset + WORD)
        .ok_or(AbiError::OutOfBounds {
            offset,
            len: data.len(),
        })?;
    let length = word_as_usize(len_word, data.len())?;

    let start = offset + WORD;
    let bytes = data
        .get(start..start + length)
        .ok_or(AbiError::OutOfBounds {
            offset: start,
            len: data.len(),
        })?;

    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

/// Extract a human-readable revert reason from revert data.
///
/// - `Error(string)` payloads yield the string.
/// - `Panic(uint256)` payloads yield `"panic 0x.."`.
/// - Anything else (including empty data) yields `None`.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let (sel, payload) = (data.get(..4)?, data.get(4..)?);

    if sel == ERROR_SELECTOR {
        return decode_string(payload).ok();
    }
    if sel == selector("Panic(uint256)") {
        return decode_u256(payload).ok().map(|code| format!("panic 0x{code:x}"));
    }
    None
}
