//! SHA-256 commitments over bytes
//!
//! Used where the engine commits to opaque byte strings (serialized proofs,
//! verification keys shown to operators) rather than field elements.

use sha2::{Digest as _, Sha256};

/// A 256-bit byte hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// SHA-256 of `data` prefixed by a domain separator
    pub fn sha256_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex (with or without `0x`)
    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        let value = value.strip_prefix("0x").unwrap_or(value);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(value, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl serde::Serialize for Hash256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Hash256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_changes_hash() {
        let a = Hash256::sha256_with_domain(b"A", b"payload");
        let b = Hash256::sha256_with_domain(b"B", b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_with_prefix() {
        let hash = Hash256::sha256_with_domain(b"D", b"x");
        let parsed = Hash256::from_hex(&format!("0x{}", hash.to_hex())).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_serde_roundtrip() {
        let hash = Hash256::sha256_with_domain(b"D", b"x");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(serde_json::from_str::<Hash256>(&json).unwrap(), hash);
    }
}
