//! Error types for contract-side verification

use thiserror::Error;

use dkg_rollup_actions::ActionState;
use dkg_rollup_program::RollupState;

/// Reasons a contract rejects a call. Stored state is unchanged on every error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Proof bytes do not verify against the contract's program
    #[error("Rollup proof failed verification")]
    InvalidProof,

    /// Proof starts from a state other than the stored one
    #[error(
        "Stale rollup proof: stored ({}, {}), proof starts at ({}, {})",
        stored.action_state,
        stored.root,
        proof.action_state,
        proof.root
    )]
    StaleProof {
        stored: RollupState,
        proof: RollupState,
    },

    /// Proof ends at an action state the log never produced
    #[error("Action state {0} is not in the action log")]
    UnknownActionState(ActionState),

    /// Proof's step count disagrees with the log positions it advances
    #[error("Rollup proof claims {step} steps but advances the log by {folded}")]
    StepMismatch { step: u64, folded: u64 },

    /// Proof does not fold any action
    #[error("Rollup proof folds no actions")]
    EmptyRollup,
}

/// Result type for contract calls
pub type ContractResult<T> = Result<T, ContractError>;
