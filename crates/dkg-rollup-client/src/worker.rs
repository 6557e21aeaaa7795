//! Off-chain rollup worker
//!
//! One `run_once` call performs a full rollup round against a single contract:
//!
//! 1. fetch the stored `(action_state, root)` pair
//! 2. rebuild local dedup storage from the action history if it has drifted
//! 3. fetch the actions dispatched since the stored action state
//! 4. prove them as one chain on the blocking pool and submit the final proof
//!
//! Local storage is a disposable cache. Nothing from a failed round is
//! trusted by the next one: the root check in step 2 forces a rebuild.

use tokio::task;
use tracing::{debug, info, warn};

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_program::{
    CancelToken, ProofBackend, RollupBatch, RollupDriver, RollupProof, RollupState,
};

use crate::error::{ClientError, ClientResult};
use crate::source::{ActionSource, RollupSubmitter, StateReader};

/// Result of one worker round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Nothing pending
    Idle,
    /// A proof folding `actions` actions was committed
    Submitted { actions: usize, state: RollupState },
}

pub struct RollupWorker<A, B, C>
where
    A: Action,
    B: ProofBackend + 'static,
    C: ActionSource<A> + StateReader + RollupSubmitter,
{
    chain: C,
    driver: RollupDriver<A, B>,
    address: String,
    cancel: CancelToken,
}

impl<A, B, C> RollupWorker<A, B, C>
where
    A: Action,
    B: ProofBackend + 'static,
    C: ActionSource<A> + StateReader + RollupSubmitter,
{
    pub fn new(chain: C, driver: RollupDriver<A, B>, address: &str) -> Self {
        Self {
            chain,
            driver,
            address: address.to_string(),
            cancel: CancelToken::new(),
        }
    }

    pub fn driver(&self) -> &RollupDriver<A, B> {
        &self.driver
    }

    /// Token that abandons the current round at the next step boundary
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Replay the log up to the stored action state and rebuild dedup storage
    async fn resync(&mut self, stored: &RollupState) -> ClientResult<()> {
        let history: Vec<A> = self
            .chain
            .fetch_actions(&self.address, &ActionState::initial(), Some(&stored.action_state))
            .await?
            .into_iter()
            .flatten()
            .collect();

        let mut state = ActionState::initial();
        let mut processed = Vec::with_capacity(history.len());
        for action in &history {
            state = state.push(action);
            processed.push(state);
        }
        if state != stored.action_state {
            return Err(ClientError::ReplayMismatch {
                expected: stored.action_state,
                actual: state,
            });
        }

        self.driver.rebuild(processed, stored.root)?;
        info!(address = %self.address, actions = history.len(), "resynced dedup storage");
        Ok(())
    }

    /// Run the batch on the blocking pool. The driver moves into the task
    /// and back; if the task is lost an empty driver takes its place and the
    /// next round resyncs it.
    async fn prove(&mut self, stored: RollupState, pending: Vec<A>) -> ClientResult<RollupBatch> {
        let empty = RollupDriver::with_program(self.driver.program().clone(), *self.driver.config());
        let mut driver = std::mem::replace(&mut self.driver, empty);
        let cancel = self.cancel.clone();

        let (driver, batch) = task::spawn_blocking(move || {
            let batch = driver.prove_batch(&stored, &pending, &cancel);
            (driver, batch)
        })
        .await?;
        self.driver = driver;
        Ok(batch?)
    }

    /// A 409 after a lost reply can belong to our own commit
    async fn submit(&self, proof: &RollupProof) -> ClientResult<RollupState> {
        match self.chain.submit_rollup(&self.address, proof).await {
            Err(ClientError::StaleSubmission(reason)) => {
                let stored = self.chain.fetch_state(&self.address).await?;
                if stored == proof.output.latest() {
                    debug!(address = %self.address, %reason, "stale reply for an already committed rollup");
                    Ok(stored)
                } else {
                    Err(ClientError::StaleSubmission(reason))
                }
            }
            result => result,
        }
    }

    pub async fn run_once(&mut self) -> ClientResult<WorkerOutcome> {
        let stored = self.chain.fetch_state(&self.address).await?;

        if self.driver.storage().root() != stored.root {
            debug!(
                local = %self.driver.storage().root(),
                stored = %stored.root,
                "local dedup storage drifted"
            );
            self.resync(&stored).await?;
        }

        let mut pending: Vec<A> = self
            .chain
            .fetch_actions(&self.address, &stored.action_state, None)
            .await?
            .into_iter()
            .flatten()
            .collect();
        if pending.is_empty() {
            return Ok(WorkerOutcome::Idle);
        }
        pending.truncate(self.driver.config().max_batch_size);
        let actions = pending.len();

        let batch = self.prove(stored, pending).await?;
        let state = match self.submit(&batch.proof).await {
            Ok(state) => state,
            Err(error) => {
                warn!(address = %self.address, %error, "rollup submission failed");
                return Err(error);
            }
        };

        info!(
            address = %self.address,
            actions,
            proving_time_ms = batch.proving_time_ms,
            action_state = %state.action_state,
            "rollup committed"
        );
        Ok(WorkerOutcome::Submitted { actions, state })
    }
}
