//! # Proof Material
//!
//! Groth16-style proof in the ZoKrates `pghr13` layout accepted by the
//! square verifier: eight curve points (A, A_p, B, B_p, C, C_p, H, K) and a
//! public input vector.
//!
//! The JSON shape matches the `proof.json` file ZoKrates writes:
//!
//! ```text
//! {
//!   "proof": {
//!     "A":   ["0x..", "0x.."],
//!     "A_p": ["0x..", "0x.."],
//!     "B":   [["0x..", "0x.."], ["0x..", "0x.."]],
//!     ...
//!   },
//!   "input": ["0x09", "0x01"]
//! }
//! ```

use crate::errors::{parse_u256, ParseError};
use crate::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Element of the BN254 base or scalar field, carried as a `uint256`.
///
/// Deserializes from `0x`-hex or decimal strings; serializes as `0x`-hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldElement(pub U256);

impl FieldElement {
    /// Get the inner `U256`.
    #[must_use]
    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<U256> for FieldElement {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for FieldElement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u256(s).map(Self)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = FieldElement;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex or decimal string, or an unsigned integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FieldElement::from(v))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// A point on G1: `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct G1Point(pub [FieldElement; 2]);

impl G1Point {
    /// Coordinates as `uint256` words, in ABI order.
    #[must_use]
    pub fn words(&self) -> [U256; 2] {
        [self.0[0].value(), self.0[1].value()]
    }
}

/// A point on G2: `[[x_im, x_re], [y_im, y_re]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct G2Point(pub [[FieldElement; 2]; 2]);

impl G2Point {
    /// Coordinates as `uint256` words, in ABI order (`uint[2][2]`).
    #[must_use]
    pub fn words(&self) -> [[U256; 2]; 2] {
        [
            [self.0[0][0].value(), self.0[0][1].value()],
            [self.0[1][0].value(), self.0[1][1].value()],
        ]
    }
}

/// The eight proof components submitted to `addSolution`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proof {
    #[serde(rename = "A")]
    pub a: G1Point,
    #[serde(rename = "A_p")]
    pub a_p: G1Point,
    #[serde(rename = "B")]
    pub b: G2Point,
    #[serde(rename = "B_p")]
    pub b_p: G1Point,
    #[serde(rename = "C")]
    pub c: G1Point,
    #[serde(rename = "C_p")]
    pub c_p: G1Point,
    #[serde(rename = "H")]
    pub h: G1Point,
    #[serde(rename = "K")]
    pub k: G1Point,
}

/// Public inputs to the verifier (`uint[2]` for the square circuit).
pub type PublicInput = Vec<FieldElement>;

/// Number of public inputs the square verifier takes.
pub const PUBLIC_INPUT_LEN: usize = 2;

fn square_input<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PublicInput, D::Error> {
    let input = PublicInput::deserialize(deserializer)?;
    if input.len() != PUBLIC_INPUT_LEN {
        return Err(de::Error::invalid_length(input.len(), &"exactly 2 public inputs"));
    }
    Ok(input)
}

/// Contents of a ZoKrates `proof.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFile {
    /// The proof points.
    pub proof: Proof,
    /// The public input vector, always [`PUBLIC_INPUT_LEN`] long.
    #[serde(deserialize_with = "square_input")]
    pub input: PublicInput,
}

impl ProofFile {
    /// Parse a `proof.json` document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
