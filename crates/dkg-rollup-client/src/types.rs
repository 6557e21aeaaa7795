//! Request and response bodies of the chain API

use serde::{Deserialize, Serialize};

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_primitives::Digest;
use dkg_rollup_program::{RollupProof, RollupState};

use crate::error::ClientResult;

/// Stored state of a rollup contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub action_state: ActionState,
    pub root: Digest,
}

impl From<StateResponse> for RollupState {
    fn from(response: StateResponse) -> Self {
        RollupState::new(response.action_state, response.root)
    }
}

/// Query for dispatched actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchActionsRequest {
    pub from: ActionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<ActionState>,
}

/// Dispatched actions, one inner vector per batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchActionsResponse<A> {
    pub batches: Vec<Vec<A>>,
}

impl<A: Action> FetchActionsResponse<A> {
    /// Batches whose every action passes the codec checks
    pub fn into_checked(self) -> ClientResult<Vec<Vec<A>>> {
        for action in self.batches.iter().flatten() {
            action.check_canonical()?;
        }
        Ok(self.batches)
    }
}

/// Rollup proof submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRollupRequest {
    /// Number of actions folded by the proof
    pub step: u64,
    /// Proof hash (hex)
    pub proof_hash: String,
    /// The proof, JSON encoded then base64
    pub proof_b64: String,
}

impl SubmitRollupRequest {
    pub fn from_proof(proof: &RollupProof) -> ClientResult<Self> {
        Ok(Self {
            step: proof.step,
            proof_hash: proof.proof_hash().to_hex(),
            proof_b64: proof.to_base64()?,
        })
    }

    pub fn decode_proof(&self) -> ClientResult<RollupProof> {
        Ok(RollupProof::from_base64(&self.proof_b64)?)
    }
}

/// Result of a committed rollup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRollupResponse {
    pub action_state: ActionState,
    pub root: Digest,
    /// Transaction hash, when the chain reports one
    pub tx_hash: Option<String>,
}

impl From<SubmitRollupResponse> for RollupState {
    fn from(response: SubmitRollupResponse) -> Self {
        RollupState::new(response.action_state, response.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use dkg_rollup_actions::{CodecError, CommitteeAction};

    #[test]
    fn test_fetched_actions_are_checked() {
        let join = CommitteeAction::join(3, 1, Digest::from_u64(9));
        let body = serde_json::json!({ "batches": [[join.clone()]] });
        let response: FetchActionsResponse<CommitteeAction> =
            serde_json::from_value(body).unwrap();
        assert_eq!(response.into_checked().unwrap(), vec![vec![join.clone()]]);

        // packed data wider than the committee layout
        let mut raw = serde_json::to_value(&join).unwrap();
        raw["packed_data"] = serde_json::json!(u64::MAX >> 1);
        let response: FetchActionsResponse<CommitteeAction> =
            serde_json::from_value(serde_json::json!({ "batches": [[raw]] })).unwrap();
        assert!(matches!(
            response.into_checked(),
            Err(ClientError::Action(CodecError::PackedOverflow { .. }))
        ));
    }
}
