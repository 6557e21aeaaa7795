//! Process/dedup storage
//!
//! One slot per action state, addressed by the low bits of the state digest.
//! A slot encodes how often the action has been folded:
//!
//! | times processed | leaf                                   |
//! |-----------------|----------------------------------------|
//! | 0               | `Digest::ZERO` (default leaf)          |
//! | 1               | `action_state`                         |
//! | n > 1           | `H_process(action_state, n - 1)`       |
//!
//! The rollup only ever folds an action once, so it always proves the
//! `0 -> 1` transition. Higher counters are supported for protocols that
//! intentionally reprocess.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dkg_rollup_actions::ActionState;
use dkg_rollup_primitives::{felt_from_u64, hash_fields, Digest, Domain, Felt};

use crate::codec::LeafCodec;
use crate::error::{StorageError, StorageResult};
use crate::merkle::MerkleWitness;
use crate::one_level::OneLevelStorage;
use crate::shape::TreeShape;

/// Raw value of a dedup slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub action_state: Digest,
    /// Number of times the slot had been processed before this record was written
    pub process_counter: u64,
}

/// Leaf codec of the dedup tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessCodec {
    shape: TreeShape,
}

impl ProcessCodec {
    pub fn new(shape: TreeShape) -> Self {
        Self { shape }
    }
}

impl Default for ProcessCodec {
    fn default() -> Self {
        Self::new(TreeShape::FULL)
    }
}

impl LeafCodec for ProcessCodec {
    type Key = ActionState;
    type Value = ProcessRecord;

    fn shape(&self) -> TreeShape {
        self.shape
    }

    fn calculate_index(&self, key: &ActionState) -> u64 {
        key.digest().first_limb() & self.shape.index_mask()
    }

    fn calculate_leaf(&self, record: &ProcessRecord) -> Digest {
        if record.process_counter == 0 {
            return record.action_state;
        }
        let mut inputs: Vec<Felt> = record.action_state.to_felts().to_vec();
        inputs.push(felt_from_u64(record.process_counter));
        hash_fields(Domain::ProcessRecord, &inputs)
    }
}

/// Leaf of a slot that has been processed `times` times
pub fn processed_leaf(action_state: Digest, times: u64) -> Digest {
    match times {
        0 => Digest::ZERO,
        n => ProcessCodec::default().calculate_leaf(&ProcessRecord {
            action_state,
            process_counter: n - 1,
        }),
    }
}

/// Dedup tree plus the per-slot counters needed to witness the next transition
#[derive(Debug, Clone)]
pub struct ProcessStorage {
    storage: OneLevelStorage<ProcessCodec>,
    records: BTreeMap<u64, ProcessRecord>,
}

impl ProcessStorage {
    pub fn new(shape: TreeShape) -> Self {
        Self {
            storage: OneLevelStorage::new(ProcessCodec::new(shape)),
            records: BTreeMap::new(),
        }
    }

    /// Rebuild from the action states already folded, in order
    pub fn from_processed<I>(shape: TreeShape, states: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = ActionState>,
    {
        let mut storage = Self::new(shape);
        for state in states {
            storage.apply(&state)?;
        }
        Ok(storage)
    }

    /// Guarded dedup transition.
    ///
    /// `process_counter` is the number of times the slot has already been
    /// processed. The witness must reproduce `expected_previous_root` from the
    /// slot's current encoding and must address `action_index`. Returns the
    /// root after the counter is incremented.
    pub fn process(
        action_index: u64,
        process_counter: u64,
        action_state: Digest,
        expected_previous_root: Digest,
        witness: &MerkleWitness,
    ) -> StorageResult<Digest> {
        let previous_leaf = processed_leaf(action_state, process_counter);
        let recomputed = witness.calculate_root(previous_leaf);
        if recomputed != expected_previous_root {
            return Err(StorageError::RootMismatch {
                expected: expected_previous_root,
                actual: recomputed,
            });
        }

        let addressed = witness.calculate_index();
        if addressed != action_index {
            return Err(StorageError::IndexMismatch {
                expected: action_index,
                actual: addressed,
            });
        }

        let next_leaf = processed_leaf(action_state, process_counter.saturating_add(1));
        Ok(witness.calculate_root(next_leaf))
    }

    pub fn shape(&self) -> TreeShape {
        self.storage.codec().shape()
    }

    pub fn root(&self) -> Digest {
        self.storage.root()
    }

    pub fn storage(&self) -> &OneLevelStorage<ProcessCodec> {
        &self.storage
    }

    pub fn index_of(&self, state: &ActionState) -> u64 {
        self.storage.calculate_index(state)
    }

    pub fn witness(&self, index: u64) -> StorageResult<MerkleWitness> {
        self.storage.witness(index)
    }

    /// Last record written to a slot
    pub fn record(&self, index: u64) -> Option<&ProcessRecord> {
        self.records.get(&index)
    }

    pub fn times_processed(&self, index: u64) -> u64 {
        self.records
            .get(&index)
            .map_or(0, |record| record.process_counter + 1)
    }

    pub fn is_processed(&self, state: &ActionState) -> bool {
        self.times_processed(self.index_of(state)) > 0
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark an action state processed for the first time
    pub fn apply(&mut self, state: &ActionState) -> StorageResult<Digest> {
        let index = self.index_of(state);
        if self.times_processed(index) > 0 {
            return Err(StorageError::AlreadyProcessed { index });
        }
        self.advance(index, state)
    }

    /// Process a slot again, whatever its counter
    pub fn reprocess(&mut self, state: &ActionState) -> StorageResult<Digest> {
        let index = self.index_of(state);
        self.advance(index, state)
    }

    fn advance(&mut self, index: u64, state: &ActionState) -> StorageResult<Digest> {
        let times = self.times_processed(index);
        let witness = self.storage.witness(index)?;
        let expected = Self::process(index, times, state.digest(), self.root(), &witness)?;

        let record = ProcessRecord {
            action_state: state.digest(),
            process_counter: times,
        };
        let root = self.storage.update_raw_leaf(index, &record)?;
        if root != expected {
            return Err(StorageError::RootMismatch {
                expected,
                actual: root,
            });
        }
        self.records.insert(index, record);
        debug!(index, times = times + 1, root = %root, "processed action state");
        Ok(root)
    }

    pub fn is_consistent(&self) -> bool {
        self.storage.is_consistent()
            && self.records.iter().all(|(index, record)| {
                self.storage
                    .leaf(*index)
                    .map_or(false, |leaf| leaf == self.storage.calculate_leaf(record))
            })
    }
}

impl Default for ProcessStorage {
    fn default() -> Self {
        Self::new(TreeShape::FULL)
    }
}
