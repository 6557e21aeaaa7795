//! The rollup program
//!
//! A proof chain starts with a base step and grows by one continuation per
//! action:
//!
//! ```text
//! P0 = first_step(empty, root, state)
//! Pn = next_step(a_n, P(n-1), dedup witness for chain(P(n-1).new_state, [a_n]))
//! ```
//!
//! Each continuation verifies the proof it extends, so the last proof attests
//! to the whole chain.

use std::marker::PhantomData;

use tracing::trace;

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_primitives::Digest;
use dkg_rollup_storage::{LeafCodec, MerkleWitness, ProcessCodec, ProcessStorage, TreeShape};

use crate::backend::{ProgramDescriptor, ProofBackend, Statement, VerificationKey};
use crate::error::{RollupError, RollupResult};
use crate::output::RollupOutput;
use crate::proof::RollupProof;

/// One step of the proof chain
#[derive(Debug, Clone)]
pub enum RollupStep<A> {
    /// Start a chain from a stored state
    Base {
        action: A,
        initial_root: Digest,
        initial_action_state: ActionState,
    },
    /// Fold one more action on top of an earlier proof
    Continuation {
        action: A,
        earlier: RollupProof,
        witness: MerkleWitness,
    },
}

/// Compiled rollup program for action family `A`
#[derive(Debug)]
pub struct RollupProgram<A: Action, B: ProofBackend> {
    backend: B,
    descriptor: ProgramDescriptor,
    verification_key: VerificationKey,
    dedup: ProcessCodec,
    _action: PhantomData<fn() -> A>,
}

impl<A: Action, B: ProofBackend> RollupProgram<A, B> {
    pub fn compile(backend: B, dedup_shape: TreeShape) -> RollupResult<Self> {
        let descriptor = ProgramDescriptor::for_action::<A>(dedup_shape);
        let verification_key = backend.compile(&descriptor)?;
        Ok(Self {
            backend,
            descriptor,
            verification_key,
            dedup: ProcessCodec::new(dedup_shape),
            _action: PhantomData,
        })
    }

    pub fn descriptor(&self) -> &ProgramDescriptor {
        &self.descriptor
    }

    pub fn verification_key(&self) -> VerificationKey {
        self.verification_key
    }

    pub fn dedup_shape(&self) -> TreeShape {
        self.dedup.shape()
    }

    /// Dedup slot of an action state
    pub fn dedup_index(&self, state: &ActionState) -> u64 {
        self.dedup.calculate_index(state)
    }

    fn seal(&self, statement: Statement) -> RollupResult<RollupProof> {
        let proof_bytes = self.backend.prove(&self.verification_key, &statement)?;
        Ok(RollupProof {
            step: statement.step,
            action_hash: statement.action_hash,
            output: statement.output,
            previous: statement.previous,
            proof_bytes,
        })
    }

    /// Base case. The action only fixes the program's input type.
    pub fn first_step(
        &self,
        _action: &A,
        initial_root: Digest,
        initial_action_state: ActionState,
    ) -> RollupResult<RollupProof> {
        self.seal(Statement {
            step: 0,
            action_hash: Digest::ZERO,
            output: RollupOutput::base(initial_root, initial_action_state),
            previous: None,
        })
    }

    /// Fold `action` on top of `earlier`.
    ///
    /// The witness must prove that the slot of the new action state is empty
    /// in the dedup tree rooted at `earlier.output.new_root`.
    pub fn next_step(
        &self,
        action: &A,
        earlier: &RollupProof,
        witness: &MerkleWitness,
    ) -> RollupResult<RollupProof> {
        if !self.verify(earlier) {
            return Err(RollupError::EarlierProofInvalid { step: earlier.step });
        }

        let new_action_state = earlier.output.new_action_state.push(action);
        self.dedup_shape().check_witness(witness)?;
        let new_root = ProcessStorage::process(
            self.dedup_index(&new_action_state),
            0,
            new_action_state.digest(),
            earlier.output.new_root,
            witness,
        )?;

        let step = earlier.step + 1;
        trace!(step, action_state = %new_action_state, root = %new_root, "folded action");
        self.seal(Statement {
            step,
            action_hash: action.hash(),
            output: earlier.output.advance(new_action_state, new_root),
            previous: Some(earlier.proof_hash()),
        })
    }

    pub fn prove(&self, step: RollupStep<A>) -> RollupResult<RollupProof> {
        match step {
            RollupStep::Base {
                action,
                initial_root,
                initial_action_state,
            } => self.first_step(&action, initial_root, initial_action_state),
            RollupStep::Continuation {
                action,
                earlier,
                witness,
            } => self.next_step(&action, &earlier, &witness),
        }
    }

    /// Check a proof's bytes and its shape as a chain link
    pub fn verify(&self, proof: &RollupProof) -> bool {
        let well_formed = if proof.is_base() {
            proof.previous.is_none() && proof.output.is_noop()
        } else {
            proof.previous.is_some()
        };
        well_formed
            && self
                .backend
                .verify(&self.verification_key, &proof.statement(), &proof.proof_bytes)
    }
}
