//! # CH-01 ABI - Solidity ABI Codec
//!
//! Encodes calldata for, and decodes results and logs from, the
//! `ERC721Mintable` and `SolnSquareVerifier` contracts.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Hashing | `hash.rs` | keccak256, function selectors, event topics |
//! | Encoder | `encode.rs` | `Token` tree to head/tail ABI layout |
//! | Decoder | `decode.rs` | Return values and revert reasons |
//! | Logs | `logs.rs` | Receipt logs to `ContractEvent` |
//! | Deed ABI | `deed.rs` | Calldata builders for every contract method |
//!
//! Decoders never fall back to default values: short or malformed return
//! data is an [`AbiError`].

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod decode;
pub mod deed;
pub mod encode;
pub mod error;
pub mod hash;
pub mod logs;

pub use decode::{decode_address, decode_bool, decode_revert_reason, decode_string, decode_u256};
pub use deed::{square_input_words, DeedAbi};
pub use encode::{encode_call, encode_tokens, Token};
pub use error::AbiError;
pub use hash::{event_topic, keccak256, selector};
pub use logs::{decode_log, RawLog};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;
