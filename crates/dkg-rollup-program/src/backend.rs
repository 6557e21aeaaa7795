//! Proof system seam
//!
//! The rollup program never constructs proofs itself. It hands a
//! [`Statement`] to a [`ProofBackend`], which returns opaque proof bytes and
//! later decides whether those bytes attest to the same statement.
//!
//! [`TranscriptBackend`] is the deterministic reference backend: its "proof"
//! is a Rescue transcript binding the verification key and the statement. It
//! gives the engine determinism and binding, which is everything the rollup
//! logic depends on, but it is not zero-knowledge and anyone can produce it.
//! Production deployments plug a succinct backend in at this trait.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use winter_math::ToElements;

use dkg_rollup_actions::{Action, ActionKind};
use dkg_rollup_primitives::{felt_from_bool, felt_from_u64, hash_fields, Digest, Domain, Felt, Hash256};
use dkg_rollup_storage::TreeShape;

use crate::error::RollupResult;
use crate::output::RollupOutput;

/// What a program is compiled from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    pub name: String,
    pub kind: ActionKind,
    pub action_field_count: usize,
    pub dedup_height: u32,
}

impl ProgramDescriptor {
    /// Descriptor of the rollup program for action family `A`
    pub fn for_action<A: Action>(dedup_shape: TreeShape) -> Self {
        Self {
            name: format!("{}-rollup", A::KIND.name()),
            kind: A::KIND,
            action_field_count: A::FIELD_COUNT,
            dedup_height: dedup_shape.height(),
        }
    }
}

impl ToElements<Felt> for ProgramDescriptor {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements: Vec<Felt> = self
            .name
            .bytes()
            .map(|byte| felt_from_u64(byte as u64))
            .collect();
        elements.push(felt_from_u64(self.name.len() as u64));
        elements.push(felt_from_u64(self.action_field_count as u64));
        elements.push(felt_from_u64(self.dedup_height as u64));
        elements
    }
}

/// Commitment to a compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationKey(Digest);

impl VerificationKey {
    pub fn from_digest(digest: Digest) -> Self {
        Self(digest)
    }

    pub fn digest(&self) -> Digest {
        self.0
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything one step's proof attests to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub step: u64,
    /// Hash of the folded action, zero for the base step
    pub action_hash: Digest,
    pub output: RollupOutput,
    /// Hash of the proof this step verified
    pub previous: Option<Hash256>,
}

impl ToElements<Felt> for Statement {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::with_capacity(31);
        elements.push(felt_from_u64(self.step));
        elements.extend_from_slice(&self.action_hash.to_felts());
        elements.extend(self.output.to_elements());
        elements.push(felt_from_bool(self.previous.is_some()));
        // 32-bit chunks keep the byte hash injective in the field
        let previous = self.previous.unwrap_or_default();
        elements.extend(previous.as_bytes().chunks(4).map(|chunk| {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            felt_from_u64(u32::from_le_bytes(word) as u64)
        }));
        elements
    }
}

/// An opaque proof system
pub trait ProofBackend: Send + Sync {
    fn compile(&self, descriptor: &ProgramDescriptor) -> RollupResult<VerificationKey>;

    fn prove(&self, key: &VerificationKey, statement: &Statement) -> RollupResult<Vec<u8>>;

    fn verify(&self, key: &VerificationKey, statement: &Statement, proof_bytes: &[u8]) -> bool;
}

impl<B: ProofBackend + ?Sized> ProofBackend for Arc<B> {
    fn compile(&self, descriptor: &ProgramDescriptor) -> RollupResult<VerificationKey> {
        (**self).compile(descriptor)
    }

    fn prove(&self, key: &VerificationKey, statement: &Statement) -> RollupResult<Vec<u8>> {
        (**self).prove(key, statement)
    }

    fn verify(&self, key: &VerificationKey, statement: &Statement, proof_bytes: &[u8]) -> bool {
        (**self).verify(key, statement, proof_bytes)
    }
}

/// Deterministic Rescue transcript backend
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptBackend;

impl TranscriptBackend {
    fn transcript(key: &VerificationKey, statement: &Statement) -> Digest {
        let mut inputs: Vec<Felt> = key.digest().to_felts().to_vec();
        inputs.extend(statement.to_elements());
        hash_fields(Domain::ProofTranscript, &inputs)
    }
}

impl ProofBackend for TranscriptBackend {
    fn compile(&self, descriptor: &ProgramDescriptor) -> RollupResult<VerificationKey> {
        Ok(VerificationKey(hash_fields(
            Domain::VerificationKey,
            &descriptor.to_elements(),
        )))
    }

    fn prove(&self, key: &VerificationKey, statement: &Statement) -> RollupResult<Vec<u8>> {
        Ok(Self::transcript(key, statement).to_bytes().to_vec())
    }

    fn verify(&self, key: &VerificationKey, statement: &Statement, proof_bytes: &[u8]) -> bool {
        Self::transcript(key, statement).to_bytes().as_slice() == proof_bytes
    }
}
