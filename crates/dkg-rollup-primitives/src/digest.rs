//! Four-limb algebraic digest
//!
//! Every leaf, node, root and action state in the engine is a `Digest`: the
//! four field elements squeezed out of a Rescue-Prime permutation. Limbs are
//! kept as canonical `u64` representatives so digests can be ordered, hashed
//! and used as map keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::{felt_from_u64, felt_to_u64, Felt};

/// Number of field elements in a digest
pub const DIGEST_WIDTH: usize = 4;

/// Errors produced when parsing a digest from hex
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DigestParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A canonical four-element field digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u64; DIGEST_WIDTH]", into = "[u64; DIGEST_WIDTH]")]
pub struct Digest([u64; DIGEST_WIDTH]);

impl Digest {
    /// The all-zero digest, used as the default empty leaf
    pub const ZERO: Digest = Digest([0; DIGEST_WIDTH]);

    /// Build a digest from raw limbs, reducing each into the field
    pub fn from_limbs(limbs: [u64; DIGEST_WIDTH]) -> Self {
        Self(limbs.map(|limb| felt_to_u64(felt_from_u64(limb))))
    }

    /// Build a digest from field elements
    pub fn from_felts(felts: [Felt; DIGEST_WIDTH]) -> Self {
        Self(felts.map(felt_to_u64))
    }

    /// Build a digest holding a single small value in its first limb
    pub fn from_u64(value: u64) -> Self {
        Self::from_limbs([value, 0, 0, 0])
    }

    /// Canonical limbs
    pub fn limbs(&self) -> [u64; DIGEST_WIDTH] {
        self.0
    }

    /// Limbs as field elements
    pub fn to_felts(&self) -> [Felt; DIGEST_WIDTH] {
        self.0.map(felt_from_u64)
    }

    /// First limb, used where a digest must address a tree slot
    pub fn first_limb(&self) -> u64 {
        self.0[0]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Little-endian byte encoding (8 bytes per limb)
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Lowercase hex of the byte encoding, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from hex (with or without `0x`)
    pub fn from_hex(value: &str) -> Result<Self, DigestParseError> {
        let value = value.strip_prefix("0x").unwrap_or(value);
        let bytes = hex::decode(value)?;
        if bytes.len() != 32 {
            return Err(DigestParseError::InvalidLength(bytes.len()));
        }
        let mut limbs = [0u64; DIGEST_WIDTH];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(raw);
        }
        Ok(Self::from_limbs(limbs))
    }
}

impl From<[u64; DIGEST_WIDTH]> for Digest {
    fn from(limbs: [u64; DIGEST_WIDTH]) -> Self {
        Self::from_limbs(limbs)
    }
}

impl From<Digest> for [u64; DIGEST_WIDTH] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GOLDILOCKS_PRIME;

    #[test]
    fn test_from_limbs_is_canonical() {
        let digest = Digest::from_limbs([GOLDILOCKS_PRIME + 3, 1, 2, 3]);
        assert_eq!(digest.limbs(), [3, 1, 2, 3]);
    }

    #[test]
    fn test_hex_roundtrip() {
        let digest = Digest::from_limbs([7, 0xdead_beef, 1 << 40, 99]);
        let parsed: Digest = digest.to_string().parse().unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_hex_wrong_length() {
        assert_eq!(
            Digest::from_hex("abcd"),
            Err(DigestParseError::InvalidLength(2))
        );
    }

    #[test]
    fn test_hex_invalid_characters() {
        let err = Digest::from_hex("zz").unwrap_err();
        assert!(matches!(err, DigestParseError::InvalidHex(_)));
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_serde_as_limbs() {
        let digest = Digest::from_limbs([1, 2, 3, 4]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
