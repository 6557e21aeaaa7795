//! Public output of a rollup proof

use serde::{Deserialize, Serialize};
use winter_math::ToElements;

use dkg_rollup_actions::ActionState;
use dkg_rollup_primitives::{Digest, Felt};

/// The `(action_state, root)` pair a contract stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollupState {
    pub action_state: ActionState,
    pub root: Digest,
}

impl RollupState {
    pub fn new(action_state: ActionState, root: Digest) -> Self {
        Self { action_state, root }
    }
}

/// Public output of every rollup step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupOutput {
    pub initial_action_state: ActionState,
    pub initial_root: Digest,
    pub new_action_state: ActionState,
    pub new_root: Digest,
}

impl RollupOutput {
    /// Output of the base step: nothing folded yet
    pub fn base(initial_root: Digest, initial_action_state: ActionState) -> Self {
        Self {
            initial_action_state,
            initial_root,
            new_action_state: initial_action_state,
            new_root: initial_root,
        }
    }

    /// Carry the initial fields through and replace the new ones
    pub fn advance(&self, new_action_state: ActionState, new_root: Digest) -> Self {
        Self {
            new_action_state,
            new_root,
            ..*self
        }
    }

    pub fn initial(&self) -> RollupState {
        RollupState::new(self.initial_action_state, self.initial_root)
    }

    pub fn latest(&self) -> RollupState {
        RollupState::new(self.new_action_state, self.new_root)
    }

    pub fn is_noop(&self) -> bool {
        self.initial() == self.latest()
    }
}

impl ToElements<Felt> for RollupOutput {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::with_capacity(16);
        elements.extend_from_slice(&self.initial_action_state.digest().to_felts());
        elements.extend_from_slice(&self.initial_root.to_felts());
        elements.extend_from_slice(&self.new_action_state.digest().to_felts());
        elements.extend_from_slice(&self.new_root.to_felts());
        elements
    }
}
