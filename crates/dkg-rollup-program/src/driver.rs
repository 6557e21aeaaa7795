//! Batch driver
//!
//! Drives one proof chain per batch over a private snapshot of the dedup
//! storage. The snapshot replaces the driver's storage only when the whole
//! batch proved; a failed or cancelled run leaves the storage at the last
//! known-good state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_primitives::Digest;
use dkg_rollup_storage::{ProcessStorage, StorageError};

use crate::backend::ProofBackend;
use crate::config::RollupConfig;
use crate::error::{RollupError, RollupResult};
use crate::output::RollupState;
use crate::program::RollupProgram;
use crate::proof::RollupProof;

/// Cooperative cancellation flag, checked between steps
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A fully proved batch
#[derive(Debug, Clone)]
pub struct RollupBatch {
    /// Final proof of the chain
    pub proof: RollupProof,
    /// Action states marked processed, in folding order
    pub processed: Vec<ActionState>,
    /// Time taken to prove the batch (milliseconds)
    pub proving_time_ms: u64,
}

/// Owns one chain's program handle and dedup storage
#[derive(Debug)]
pub struct RollupDriver<A: Action, B: ProofBackend> {
    program: Arc<RollupProgram<A, B>>,
    config: RollupConfig,
    storage: ProcessStorage,
}

impl<A: Action, B: ProofBackend> RollupDriver<A, B> {
    /// Compile the program and start from an empty dedup tree
    pub fn new(backend: B, config: RollupConfig) -> RollupResult<Self> {
        let program = RollupProgram::compile(backend, config.dedup_shape)?;
        Ok(Self::with_program(Arc::new(program), config))
    }

    /// Share an already compiled program. The dedup shape comes from the program.
    pub fn with_program(program: Arc<RollupProgram<A, B>>, config: RollupConfig) -> Self {
        let config = config.with_dedup_shape(program.dedup_shape());
        Self {
            storage: ProcessStorage::new(config.dedup_shape),
            program,
            config,
        }
    }

    pub fn program(&self) -> &Arc<RollupProgram<A, B>> {
        &self.program
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    pub fn storage(&self) -> &ProcessStorage {
        &self.storage
    }

    /// Replace local storage with one rebuilt from the already processed
    /// action states, checked against the stored root
    pub fn rebuild<I>(&mut self, processed: I, expected_root: Digest) -> RollupResult<()>
    where
        I: IntoIterator<Item = ActionState>,
    {
        let storage = ProcessStorage::from_processed(self.config.dedup_shape, processed)?;
        if storage.root() != expected_root {
            warn!(expected = %expected_root, actual = %storage.root(), "rebuilt dedup storage does not match stored root");
            return Err(RollupError::StorageOutOfSync {
                expected: expected_root,
                actual: storage.root(),
            });
        }
        debug!(slots = storage.len(), root = %storage.root(), "rebuilt dedup storage");
        self.storage = storage;
        Ok(())
    }

    /// Fold `actions` on top of `base`, in order
    pub fn prove_batch(
        &mut self,
        base: &RollupState,
        actions: &[A],
        cancel: &CancelToken,
    ) -> RollupResult<RollupBatch> {
        if actions.is_empty() {
            return Err(RollupError::EmptyBatch);
        }
        if actions.len() > self.config.max_batch_size {
            return Err(RollupError::BatchTooLarge {
                size: actions.len(),
                max: self.config.max_batch_size,
            });
        }
        if self.storage.root() != base.root {
            return Err(RollupError::StorageOutOfSync {
                expected: base.root,
                actual: self.storage.root(),
            });
        }

        let start = Instant::now();
        let mut snapshot = self.storage.clone();
        let mut proof = self
            .program
            .first_step(&A::empty(), base.root, base.action_state)?;
        let mut processed = Vec::with_capacity(actions.len());

        for (step, action) in actions.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(step, kind = %A::KIND, "rollup cancelled");
                return Err(RollupError::Cancelled { step });
            }

            let next_state = proof.output.new_action_state.push(action);
            let index = snapshot.index_of(&next_state);
            if snapshot.is_processed(&next_state) {
                return Err(StorageError::AlreadyProcessed { index }.into());
            }
            let witness = snapshot.witness(index)?;
            proof = self.program.next_step(action, &proof, &witness)?;

            let root = snapshot.apply(&next_state)?;
            if root != proof.output.new_root {
                return Err(RollupError::StorageOutOfSync {
                    expected: proof.output.new_root,
                    actual: root,
                });
            }
            debug!(step = step + 1, index, root = %root, "proved rollup step");
            processed.push(next_state);
        }

        self.storage = snapshot;
        let proving_time_ms = start.elapsed().as_millis() as u64;
        info!(
            kind = %A::KIND,
            actions = actions.len(),
            action_state = %proof.output.new_action_state,
            root = %proof.output.new_root,
            proving_time_ms,
            "proved rollup batch"
        );

        Ok(RollupBatch {
            proof,
            processed,
            proving_time_ms,
        })
    }
}

/// A batch for one independent chain
#[derive(Debug)]
pub struct RollupJob<A: Action, B: ProofBackend> {
    pub driver: RollupDriver<A, B>,
    pub base: RollupState,
    pub actions: Vec<A>,
}

/// Prove independent chains concurrently. Every job owns its driver and
/// therefore its storage; results come back in job order.
pub fn prove_independent<A, B>(
    jobs: Vec<RollupJob<A, B>>,
    cancel: &CancelToken,
) -> Vec<(RollupDriver<A, B>, RollupResult<RollupBatch>)>
where
    A: Action,
    B: ProofBackend,
{
    jobs.into_par_iter()
        .map(|mut job| {
            let result = job.driver.prove_batch(&job.base, &job.actions, cancel);
            (job.driver, result)
        })
        .collect()
}
