//! # HD Wallet
//!
//! Derives the accounts a mnemonic-backed provider exposes:
//!
//! - BIP-39 seed: PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic"`
//! - BIP-32 derivation along `m/44'/60'/0'/0/i`
//!
//! The mnemonic checksum is not verified; only the word count is. A phrase
//! with a bad checksum still derives keys, just not the ones the user meant.

use crate::error::WalletError;
use ch_01_abi::keccak256;
use hmac::{Hmac, Mac};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, NonZeroScalar, Scalar};
use sha2::Sha512;
use shared_types::Address;
use std::fmt;
use tracing::debug;

type HmacSha512 = Hmac<Sha512>;

const PBKDF2_ROUNDS: u32 = 2048;
const HARDENED: u32 = 0x8000_0000;

/// `m/44'/60'/0'/0`, the Ethereum external chain.
const ETHEREUM_PATH: [u32; 4] = [44 | HARDENED, 60 | HARDENED, HARDENED, 0];

/// Accepted mnemonic lengths.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Extended private key: signing key plus chain code.
struct ExtendedKey {
    key: SigningKey,
    chain_code: [u8; 32],
}

impl ExtendedKey {
    fn master(seed: &[u8]) -> Result<Self, WalletError> {
        let invalid = || WalletError::InvalidDerivation {
            path: "m".to_string(),
        };
        let (il, ir) = hmac_sha512(b"Bitcoin seed", &[seed]).ok_or_else(invalid)?;
        let key = SigningKey::from_bytes(&FieldBytes::clone_from_slice(&il)).map_err(|_| invalid())?;
        Ok(Self { key, chain_code: ir })
    }

    fn child(&self, index: u32, path: &str) -> Result<Self, WalletError> {
        let invalid = || WalletError::InvalidDerivation {
            path: path.to_string(),
        };

        let index_bytes = index.to_be_bytes();
        let (il, ir) = if index & HARDENED != 0 {
            let secret = self.key.to_bytes();
            hmac_sha512(&self.chain_code, &[&[0u8][..], secret.as_slice(), &index_bytes[..]])
        } else {
            let public = self.key.verifying_key().to_sec1_bytes();
            hmac_sha512(&self.chain_code, &[&public[..], &index_bytes[..]])
        }
        .ok_or_else(invalid)?;

        let tweak = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(&il)))
            .ok_or_else(invalid)?;
        let parent: Scalar = *self.key.as_nonzero_scalar().as_ref();
        let child = Option::<NonZeroScalar>::from(NonZeroScalar::new(tweak + parent))
            .ok_or_else(invalid)?;

        Ok(Self {
            key: SigningKey::from(child),
            chain_code: ir,
        })
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Option<([u8; 32], [u8; 32])> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key).ok()?;
    for part in parts {
        mac.update(part);
    }
    let out = mac.finalize().into_bytes();

    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&out[..32]);
    ir.copy_from_slice(&out[32..]);
    Some((il, ir))
}

/// Ethereum address of a secp256k1 key: last 20 bytes of
/// `keccak256(uncompressed_pubkey[1..])`.
#[must_use]
pub fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// A set of accounts derived from one mnemonic.
pub struct HdWallet {
    accounts: Vec<(Address, SigningKey)>,
}

impl HdWallet {
    /// Derive the first `count` accounts of `phrase`.
    pub fn from_mnemonic(phrase: &str, count: usize) -> Result<Self, WalletError> {
        if count == 0 {
            return Err(WalletError::NoAccounts);
        }

        let words: Vec<&str> = phrase.split_whitespace().collect();
        if !VALID_WORD_COUNTS.contains(&words.len()) {
            return Err(WalletError::InvalidWordCount(words.len()));
        }
        let normalized = words.join(" ");

        let mut seed = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(normalized.as_bytes(), b"mnemonic", PBKDF2_ROUNDS, &mut seed);

        let mut parent = ExtendedKey::master(&seed)?;
        let mut path = String::from("m");
        for (depth, index) in ETHEREUM_PATH.iter().enumerate() {
            path.push_str(&if index & HARDENED != 0 {
                format!("/{}'", index & !HARDENED)
            } else {
                format!("/{index}")
            });
            parent = parent.child(*index, &path)?;
            debug!(depth = depth + 1, "Derived HD node");
        }

        let accounts = (0..count)
            .map(|i| {
                let index = u32::try_from(i).map_err(|_| WalletError::InvalidDerivation {
                    path: format!("{path}/{i}"),
                })?;
                let child = parent.child(index, &format!("{path}/{i}"))?;
                Ok((address_of(&child.key), child.key))
            })
            .collect::<Result<Vec<_>, WalletError>>()?;

        Ok(Self { accounts })
    }

    /// Derived addresses in derivation order (account 0 first).
    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|(address, _)| *address).collect()
    }

    /// Signing key for `address`, if it belongs to this wallet.
    #[must_use]
    pub fn key_for(&self, address: &Address) -> Option<&SigningKey> {
        self.accounts
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, key)| key)
    }

    /// Number of derived accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Always false; a wallet holds at least one account.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys stay out of logs
        f.debug_struct("HdWallet")
            .field("addresses", &self.addresses())
            .finish()
    }
}
