//! In-process chain
//!
//! Serves one [`RollupContract`] through the same traits as the HTTP client,
//! for simulations and tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_contract::RollupContract;
use dkg_rollup_program::{ProofBackend, RollupProof, RollupState};

use crate::error::{ClientError, ClientResult};
use crate::source::{ActionSource, RollupSubmitter, StateReader};

pub struct LocalChain<A: Action, B: ProofBackend> {
    address: String,
    contract: Arc<Mutex<RollupContract<A, B>>>,
}

impl<A: Action, B: ProofBackend> Clone for LocalChain<A, B> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            contract: Arc::clone(&self.contract),
        }
    }
}

impl<A: Action, B: ProofBackend> LocalChain<A, B> {
    pub fn new(address: &str, contract: RollupContract<A, B>) -> Self {
        Self {
            address: address.to_string(),
            contract: Arc::new(Mutex::new(contract)),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Dispatch an action to the contract
    pub async fn dispatch(&self, action: A) -> ActionState {
        self.contract.lock().await.dispatch(action)
    }

    /// Stored state, without the address check
    pub async fn state(&self) -> RollupState {
        self.contract.lock().await.state()
    }

    fn check_address(&self, address: &str) -> ClientResult<()> {
        if address != self.address {
            return Err(ClientError::NotFound(address.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<A: Action, B: ProofBackend> ActionSource<A> for LocalChain<A, B> {
    async fn fetch_actions(
        &self,
        address: &str,
        from: &ActionState,
        to: Option<&ActionState>,
    ) -> ClientResult<Vec<Vec<A>>> {
        self.check_address(address)?;
        Ok(self.contract.lock().await.log().fetch(from, to)?)
    }
}

#[async_trait]
impl<A: Action, B: ProofBackend> StateReader for LocalChain<A, B> {
    async fn fetch_state(&self, address: &str) -> ClientResult<RollupState> {
        self.check_address(address)?;
        Ok(self.contract.lock().await.state())
    }
}

#[async_trait]
impl<A: Action, B: ProofBackend> RollupSubmitter for LocalChain<A, B> {
    async fn submit_rollup(&self, address: &str, proof: &RollupProof) -> ClientResult<RollupState> {
        self.check_address(address)?;
        Ok(self.contract.lock().await.rollup(proof)?)
    }
}
