//! Rollup proofs and their transport encodings

use base64::Engine;
use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{Digest, Hash256};

use crate::backend::Statement;
use crate::error::{RollupError, RollupResult};
use crate::output::RollupOutput;

/// Domain separator for proof hashes
pub const PROOF_HASH_DOMAIN: &[u8] = b"DKG_ROLLUP_PROOF_HASH_V1";

/// One link of the recursive proof chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupProof {
    /// Number of actions folded since the base step
    pub step: u64,

    /// Hash of the action folded by this step (zero for the base step)
    pub action_hash: Digest,

    /// Public output
    pub output: RollupOutput,

    /// Hash of the proof verified by this step
    pub previous: Option<Hash256>,

    /// The raw proof bytes
    #[serde(with = "serde_bytes")]
    pub proof_bytes: Vec<u8>,
}

impl RollupProof {
    /// Compute the proof hash using the domain separator
    pub fn compute_hash(proof_bytes: &[u8]) -> Hash256 {
        Hash256::sha256_with_domain(PROOF_HASH_DOMAIN, proof_bytes)
    }

    pub fn proof_hash(&self) -> Hash256 {
        Self::compute_hash(&self.proof_bytes)
    }

    pub fn is_base(&self) -> bool {
        self.step == 0
    }

    /// The statement the proof bytes attest to
    pub fn statement(&self) -> Statement {
        Statement {
            step: self.step,
            action_hash: self.action_hash,
            output: self.output,
            previous: self.previous,
        }
    }

    pub fn to_json(&self) -> RollupResult<String> {
        serde_json::to_string(self).map_err(|e| RollupError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> RollupResult<Self> {
        serde_json::from_str(json).map_err(|e| RollupError::DeserializationFailed(e.to_string()))
    }

    /// Base64 of the JSON encoding, for HTTP bodies
    pub fn to_base64(&self) -> RollupResult<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| RollupError::SerializationFailed(e.to_string()))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(json))
    }

    pub fn from_base64(encoded: &str) -> RollupResult<Self> {
        let json = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| RollupError::DeserializationFailed(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&json).map_err(|e| RollupError::DeserializationFailed(e.to_string()))
    }
}
