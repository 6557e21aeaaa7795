//! Append-only action log
//!
//! Every dispatched action is its own batch, so log position `n` is the
//! action state after the `n`-th action and matches the state a rollup chain
//! reaches after `n` continuation steps from the initial state.

use dkg_rollup_actions::{Action, ActionChain, ActionState};

use crate::error::{ContractError, ContractResult};

#[derive(Debug, Clone)]
pub struct ActionLog<A: Action> {
    chain: ActionChain,
    actions: Vec<A>,
}

impl<A: Action> Default for ActionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ActionLog<A> {
    pub fn new() -> Self {
        Self {
            chain: ActionChain::new(ActionState::initial()),
            actions: Vec::new(),
        }
    }

    /// Append one action and return the new action state
    pub fn dispatch(&mut self, action: A) -> ActionState {
        let state = self.chain.append(&[action.to_fields()]);
        self.actions.push(action);
        state
    }

    pub fn latest(&self) -> ActionState {
        self.chain.latest()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn contains(&self, state: &ActionState) -> bool {
        self.chain.contains(state)
    }

    pub fn position(&self, state: &ActionState) -> ContractResult<usize> {
        self.chain
            .position(state)
            .ok_or(ContractError::UnknownActionState(*state))
    }

    /// Batches dispatched after `from`, up to and including the one that
    /// produced `to` (or the latest), in dispatch order
    pub fn fetch(&self, from: &ActionState, to: Option<&ActionState>) -> ContractResult<Vec<Vec<A>>> {
        let start = self.position(from)?;
        let end = match to {
            Some(state) => self.position(state)?,
            None => self.len(),
        };
        if end < start {
            return Ok(Vec::new());
        }
        Ok(self.actions[start..end]
            .iter()
            .map(|action| vec![action.clone()])
            .collect())
    }

    /// Every state after the initial one, up to and including `to`
    pub fn states_until(&self, to: &ActionState) -> ContractResult<Vec<ActionState>> {
        let end = self.position(to)?;
        Ok(self.chain.states()[1..=end].to_vec())
    }
}
