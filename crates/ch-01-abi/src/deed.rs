//! # Deed Contract ABI
//!
//! Calldata builders for every method of `ERC721Mintable` and the
//! `SolnSquareVerifier` extension.

use crate::encode::{encode_call, Token};
use crate::error::AbiError;
use crate::hash::selector;
use shared_types::{Address, Proof, PublicInput, TokenId, PUBLIC_INPUT_LEN, U256};

/// Signature of `SolnSquareVerifier.addSolution` (pghr13 proof layout).
pub const ADD_SOLUTION_SIGNATURE: &str = "addSolution(uint256[2],uint256[2],uint256[2][2],uint256[2],uint256[2],uint256[2],uint256[2],uint256[2],uint256[2],address,uint256)";

/// Calldata builder for the deed contracts.
pub struct DeedAbi;

impl DeedAbi {
    // Queries

    /// `isOwner()`; answered relative to the call's `from`.
    #[must_use]
    pub fn is_owner() -> Vec<u8> {
        encode_call(selector("isOwner()"), &[])
    }

    /// `name()`
    #[must_use]
    pub fn name() -> Vec<u8> {
        encode_call(selector("name()"), &[])
    }

    /// `symbol()`
    #[must_use]
    pub fn symbol() -> Vec<u8> {
        encode_call(selector("symbol()"), &[])
    }

    /// `baseTokenURI()`
    #[must_use]
    pub fn base_token_uri() -> Vec<u8> {
        encode_call(selector("baseTokenURI()"), &[])
    }

    /// `totalSupply()`
    #[must_use]
    pub fn total_supply() -> Vec<u8> {
        encode_call(selector("totalSupply()"), &[])
    }

    /// `balanceOf(address)`
    #[must_use]
    pub fn balance_of(owner: &Address) -> Vec<u8> {
        encode_call(selector("balanceOf(address)"), &[Token::Address(*owner)])
    }

    /// `tokenURI(uint256)`
    #[must_use]
    pub fn token_uri(token_id: TokenId) -> Vec<u8> {
        encode_call(selector("tokenURI(uint256)"), &[Token::Uint(token_id)])
    }

    /// `ownerOf(uint256)`
    #[must_use]
    pub fn owner_of(token_id: TokenId) -> Vec<u8> {
        encode_call(selector("ownerOf(uint256)"), &[Token::Uint(token_id)])
    }

    /// `owner()`
    #[must_use]
    pub fn owner() -> Vec<u8> {
        encode_call(selector("owner()"), &[])
    }

    /// `paused()`
    #[must_use]
    pub fn paused() -> Vec<u8> {
        encode_call(selector("paused()"), &[])
    }

    // Transactions

    /// `pause()`
    #[must_use]
    pub fn pause() -> Vec<u8> {
        encode_call(selector("pause()"), &[])
    }

    /// `unpause()`
    #[must_use]
    pub fn unpause() -> Vec<u8> {
        encode_call(selector("unpause()"), &[])
    }

    /// `mint(address,uint256)`
    #[must_use]
    pub fn mint(to: &Address, token_id: TokenId) -> Vec<u8> {
        encode_call(
            selector("mint(address,uint256)"),
            &[Token::Address(*to), Token::Uint(token_id)],
        )
    }

    /// `approve(address,uint256)`
    #[must_use]
    pub fn approve(to: &Address, token_id: TokenId) -> Vec<u8> {
        encode_call(
            selector("approve(address,uint256)"),
            &[Token::Address(*to), Token::Uint(token_id)],
        )
    }

    /// `transferFrom(address,address,uint256)`
    #[must_use]
    pub fn transfer_from(from: &Address, to: &Address, token_id: TokenId) -> Vec<u8> {
        encode_call(
            selector("transferFrom(address,address,uint256)"),
            &[
                Token::Address(*from),
                Token::Address(*to),
                Token::Uint(token_id),
            ],
        )
    }

    /// `addSolution(A, A_p, B, B_p, C, C_p, H, K, input, to, tokenId)`
    ///
    /// The input vector is encoded as `uint256[2]` and must hold exactly
    /// [`PUBLIC_INPUT_LEN`] elements.
    pub fn add_solution(
        proof: &Proof,
        input: &PublicInput,
        to: &Address,
        token_id: TokenId,
    ) -> Result<Vec<u8>, AbiError> {
        let input_words = square_input_words(input)?;

        Ok(encode_call(
            selector(ADD_SOLUTION_SIGNATURE),
            &[
                Token::pair(proof.a.words()),
                Token::pair(proof.a_p.words()),
                Token::pair_of_pairs(proof.b.words()),
                Token::pair(proof.b_p.words()),
                Token::pair(proof.c.words()),
                Token::pair(proof.c_p.words()),
                Token::pair(proof.h.words()),
                Token::pair(proof.k.words()),
                Token::pair(input_words),
                Token::Address(*to),
                Token::Uint(token_id),
            ],
        ))
    }
}

/// The verifier's `uint256[2]` input words.
pub fn square_input_words(input: &PublicInput) -> Result<[U256; PUBLIC_INPUT_LEN], AbiError> {
    match input.as_slice() {
        [first, second] => Ok([first.value(), second.value()]),
        _ => Err(AbiError::InputLength {
            expected: PUBLIC_INPUT_LEN,
            found: input.len(),
        }),
    }
}
