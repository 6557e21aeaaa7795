//! Action hash chain
//!
//! The action state commits to every batch dispatched so far, in order:
//!
//! ```text
//! batch_hash(b)   = fold(ZERO, |acc, a| H_batch(acc, H_action(a)))   over b in order
//! update(s, b)    = H_chain(s, batch_hash(b))
//! ```
//!
//! Contracts compute it when dispatching and off-chain workers recompute it
//! when replaying; both sides go through `update`, so the results are
//! bit-identical by construction.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{hash_fields, hash_pair, Digest, Domain, Felt};

use crate::action::Action;

/// Hash of one dispatched batch of action field encodings.
///
/// An empty batch hashes to `Digest::ZERO`.
pub fn batch_hash(batch: &[Vec<Felt>]) -> Digest {
    batch.iter().fold(Digest::ZERO, |acc, fields| {
        hash_pair(Domain::ActionBatch, &acc, &hash_fields(Domain::Action, fields))
    })
}

/// Running action-chain commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionState(Digest);

impl ActionState {
    /// Well-known seed of every chain
    pub fn initial() -> Self {
        Self(hash_fields(Domain::ActionChainInit, &[]))
    }

    pub fn from_digest(digest: Digest) -> Self {
        Self(digest)
    }

    pub fn digest(&self) -> Digest {
        self.0
    }

    /// Fold one batch into the chain
    pub fn update(&self, batch: &[Vec<Felt>]) -> Self {
        Self(hash_pair(Domain::ActionChain, &self.0, &batch_hash(batch)))
    }

    /// Fold a single-action batch
    pub fn push<A: Action>(&self, action: &A) -> Self {
        self.update(&[action.to_fields()])
    }

    /// Fold a sequence of batches starting from `self`
    pub fn fold<'a, I>(&self, batches: I) -> Self
    where
        I: IntoIterator<Item = &'a [Vec<Felt>]>,
    {
        batches
            .into_iter()
            .fold(*self, |state, batch| state.update(batch))
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Every state a chain has passed through, in order
#[derive(Debug, Clone)]
pub struct ActionChain {
    states: Vec<ActionState>,
    positions: HashMap<ActionState, usize>,
}

impl ActionChain {
    pub fn new(initial: ActionState) -> Self {
        let mut positions = HashMap::new();
        positions.insert(initial, 0);
        Self {
            states: vec![initial],
            positions,
        }
    }

    /// Append a batch and return the new latest state
    pub fn append(&mut self, batch: &[Vec<Felt>]) -> ActionState {
        let next = self.latest().update(batch);
        self.positions.entry(next).or_insert(self.states.len());
        self.states.push(next);
        next
    }

    pub fn initial(&self) -> ActionState {
        self.states[0]
    }

    pub fn latest(&self) -> ActionState {
        self.states[self.states.len() - 1]
    }

    /// Number of batches appended
    pub fn len(&self) -> usize {
        self.states.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of a state (0 is the initial state)
    pub fn position(&self, state: &ActionState) -> Option<usize> {
        self.positions.get(state).copied()
    }

    pub fn contains(&self, state: &ActionState) -> bool {
        self.positions.contains_key(state)
    }

    pub fn states(&self) -> &[ActionState] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::committee::CommitteeAction;

    fn actions() -> Vec<CommitteeAction> {
        vec![
            CommitteeAction::create(1, 2, 3, Digest::from_u64(10)),
            CommitteeAction::join(1, 1, Digest::from_u64(11)),
            CommitteeAction::join(1, 2, Digest::from_u64(12)),
        ]
    }

    #[test]
    fn test_initial_is_constant() {
        assert_eq!(ActionState::initial(), ActionState::initial());
        assert!(!ActionState::initial().digest().is_zero());
    }

    #[test]
    fn test_push_matches_update() {
        let action = &actions()[0];
        let s0 = ActionState::initial();
        assert_eq!(s0.push(action), s0.update(&[action.to_fields()]));
    }

    #[test]
    fn test_order_dependent_across_batches() {
        let a = actions();
        let s0 = ActionState::initial();
        assert_ne!(s0.push(&a[0]).push(&a[1]), s0.push(&a[1]).push(&a[0]));
    }

    #[test]
    fn test_order_dependent_within_batch() {
        let a = actions();
        let s0 = ActionState::initial();
        let forward = s0.update(&[a[0].to_fields(), a[1].to_fields()]);
        let reverse = s0.update(&[a[1].to_fields(), a[0].to_fields()]);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_multi_action_batch_differs_from_single_batches() {
        let a = actions();
        let s0 = ActionState::initial();
        let batched = s0.update(&[a[0].to_fields(), a[1].to_fields()]);
        assert_ne!(batched, s0.push(&a[0]).push(&a[1]));
    }

    #[test]
    fn test_fold() {
        let a = actions();
        let batches: Vec<Vec<Vec<Felt>>> = a.iter().map(|x| vec![x.to_fields()]).collect();
        let s0 = ActionState::initial();
        let folded = s0.fold(batches.iter().map(|b| b.as_slice()));
        assert_eq!(folded, s0.push(&a[0]).push(&a[1]).push(&a[2]));
    }

    #[test]
    fn test_chain_positions() {
        let a = actions();
        let mut chain = ActionChain::new(ActionState::initial());
        let s1 = chain.append(&[a[0].to_fields()]);
        let s2 = chain.append(&[a[1].to_fields()]);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.position(&s1), Some(1));
        assert_eq!(chain.position(&s2), Some(2));
        assert_eq!(chain.latest(), s2);
        assert!(!chain.contains(&ActionState::initial().push(&a[1])));
    }
}
