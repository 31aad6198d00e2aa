//! # ABI Encoder
//!
//! Head/tail encoding of a token tuple, as laid out by `abi.encode`.

use crate::WORD;
use shared_types::{Address, U256};

/// A Solidity value to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uint256` (and narrower unsigned types)
    Uint(U256),
    /// `bool`
    Bool(bool),
    /// `string`
    String(String),
    /// `T[k]`
    FixedArray(Vec<Token>),
}

impl Token {
    /// `uint[2]` from two words.
    #[must_use]
    pub fn pair(words: [U256; 2]) -> Self {
        Self::FixedArray(words.iter().copied().map(Token::Uint).collect())
    }

    /// `uint[2][2]` from a 2x2 word matrix.
    #[must_use]
    pub fn pair_of_pairs(words: [[U256; 2]; 2]) -> Self {
        Self::FixedArray(words.iter().copied().map(Token::pair).collect())
    }

    fn is_dynamic(&self) -> bool {
        match self {
            Self::String(_) => true,
            Self::FixedArray(items) => items.iter().any(Token::is_dynamic),
            Self::Address(_) | Self::Uint(_) | Self::Bool(_) => false,
        }
    }

    /// Bytes this token occupies in the head of its enclosing tuple.
    fn head_len(&self) -> usize {
        match self {
            Self::FixedArray(items) if !self.is_dynamic() => {
                items.iter().map(Token::head_len).sum()
            }
            _ => WORD,
        }
    }

    fn encode_static(&self, out: &mut Vec<u8>) {
        match self {
            Self::Address(addr) => out.extend_from_slice(&address_word(addr)),
            Self::Uint(value) => out.extend_from_slice(&u256_word(*value)),
            Self::Bool(flag) => out.extend_from_slice(&u256_word(U256::from(u8::from(*flag)))),
            Self::FixedArray(items) => items.iter().for_each(|t| t.encode_static(out)),
            Self::String(_) => unreachable!("strings are dynamic"),
        }
    }

    fn encode_tail(&self, out: &mut Vec<u8>) {
        match self {
            Self::String(s) => {
                let bytes = s.as_bytes();
                out.extend_from_slice(&u256_word(U256::from(bytes.len())));
                out.extend_from_slice(bytes);
                out.resize(out.len() + padding(bytes.len()), 0);
            }
            Self::FixedArray(items) => out.extend_from_slice(&encode_tokens(items)),
            _ => self.encode_static(out),
        }
    }
}

/// Encode an address as a 32-byte ABI word.
#[must_use]
pub fn address_word(addr: &Address) -> [u8; WORD] {
    let mut encoded = [0u8; WORD];
    encoded[12..].copy_from_slice(addr.as_bytes());
    encoded
}

/// Encode a `uint256` as a 32-byte ABI word.
#[must_use]
pub fn u256_word(value: U256) -> [u8; WORD] {
    let mut encoded = [0u8; WORD];
    value.to_big_endian(&mut encoded);
    encoded
}

fn padding(len: usize) -> usize {
    (WORD - len % WORD) % WORD
}

/// Encode a token tuple.
#[must_use]
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(Token::head_len).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&u256_word(U256::from(head_len + tail.len())));
            token.encode_tail(&mut tail);
        } else {
            token.encode_static(&mut head);
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Calldata: selector followed by the encoded arguments.
#[must_use]
pub fn encode_call(selector: [u8; 4], args: &[Token]) -> Vec<u8> {
    let mut data = selector.to_vec();
    data.extend_from_slice(&encode_tokens(args));
    data
}
