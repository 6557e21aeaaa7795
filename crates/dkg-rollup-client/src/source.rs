//! External collaborators of the rollup worker

use async_trait::async_trait;

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_program::{RollupProof, RollupState};

use crate::error::ClientResult;

/// Append-only action log of a contract
#[async_trait]
pub trait ActionSource<A: Action>: Send + Sync {
    /// Batches dispatched after `from`, up to and including `to` (or the
    /// latest), in dispatch order
    async fn fetch_actions(
        &self,
        address: &str,
        from: &ActionState,
        to: Option<&ActionState>,
    ) -> ClientResult<Vec<Vec<A>>>;
}

/// Reader of a contract's stored `(action_state, root)` pair
#[async_trait]
pub trait StateReader: Send + Sync {
    async fn fetch_state(&self, address: &str) -> ClientResult<RollupState>;
}

/// Submits rollup proofs to a contract
#[async_trait]
pub trait RollupSubmitter: Send + Sync {
    /// Returns the contract's state after the commit
    async fn submit_rollup(&self, address: &str, proof: &RollupProof) -> ClientResult<RollupState>;
}
