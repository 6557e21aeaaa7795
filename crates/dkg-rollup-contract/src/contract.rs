//! Contract-facing rollup verification

use std::sync::Arc;

use tracing::{info, warn};

use dkg_rollup_actions::{Action, ActionState};
use dkg_rollup_program::{ProofBackend, RollupProgram, RollupProof, RollupState};

use crate::error::{ContractError, ContractResult};
use crate::log::ActionLog;

/// A contract that accumulates actions and commits rollup proofs.
///
/// The stored `(action_state, root)` pair only moves inside [`rollup`],
/// after every check has passed.
///
/// [`rollup`]: RollupContract::rollup
#[derive(Debug)]
pub struct RollupContract<A: Action, B: ProofBackend> {
    program: Arc<RollupProgram<A, B>>,
    log: ActionLog<A>,
    state: RollupState,
}

impl<A: Action, B: ProofBackend> RollupContract<A, B> {
    /// Deploy with the initial action state and an empty dedup tree
    pub fn new(program: Arc<RollupProgram<A, B>>) -> Self {
        let state = RollupState::new(ActionState::initial(), program.dedup_shape().empty_root());
        Self {
            program,
            log: ActionLog::new(),
            state,
        }
    }

    pub fn program(&self) -> &Arc<RollupProgram<A, B>> {
        &self.program
    }

    pub fn state(&self) -> RollupState {
        self.state
    }

    pub fn log(&self) -> &ActionLog<A> {
        &self.log
    }

    /// Record one action
    pub fn dispatch(&mut self, action: A) -> ActionState {
        self.log.dispatch(action)
    }

    /// Actions dispatched after the stored action state
    pub fn pending(&self) -> ContractResult<&[A]> {
        let start = self.log.position(&self.state.action_state)?;
        Ok(&self.log.actions()[start..])
    }

    /// Verify a rollup proof against stored state and commit its output
    pub fn rollup(&mut self, proof: &RollupProof) -> ContractResult<RollupState> {
        if !self.program.verify(proof) {
            warn!(step = proof.step, "rejected rollup: invalid proof");
            return Err(ContractError::InvalidProof);
        }

        let initial = proof.output.initial();
        if initial != self.state {
            warn!(stored = %self.state.action_state, proof = %initial.action_state, "rejected rollup: stale proof");
            return Err(ContractError::StaleProof {
                stored: self.state,
                proof: initial,
            });
        }

        if proof.is_base() {
            return Err(ContractError::EmptyRollup);
        }

        let new_action_state = proof.output.new_action_state;
        let stored_position = self.log.position(&self.state.action_state)?;
        let new_position = self.log.position(&new_action_state).map_err(|e| {
            warn!(action_state = %new_action_state, "rejected rollup: action state not in log");
            e
        })?;
        if new_position <= stored_position {
            return Err(ContractError::UnknownActionState(new_action_state));
        }
        let folded = (new_position - stored_position) as u64;
        if proof.step != folded {
            warn!(step = proof.step, folded, "rejected rollup: step count does not match log");
            return Err(ContractError::StepMismatch {
                step: proof.step,
                folded,
            });
        }

        self.state = proof.output.latest();
        info!(
            action_state = %self.state.action_state,
            root = %self.state.root,
            folded,
            "committed rollup"
        );
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dkg_rollup_actions::CommitteeAction;
    use dkg_rollup_primitives::{Digest, Hash256};
    use dkg_rollup_program::{
        CancelToken, ProofBackend, RollupConfig, RollupDriver, RollupOutput, Statement,
        TranscriptBackend,
    };
    use dkg_rollup_storage::TreeShape;

    type Contract = RollupContract<CommitteeAction, TranscriptBackend>;
    type Driver = RollupDriver<CommitteeAction, TranscriptBackend>;

    fn setup() -> (Contract, Driver) {
        let driver = Driver::new(TranscriptBackend, RollupConfig::default()).unwrap();
        let contract = Contract::new(driver.program().clone());
        (contract, driver)
    }

    #[test]
    fn test_initial_state() {
        let (contract, _) = setup();
        assert_eq!(contract.state().action_state, ActionState::initial());
        assert_eq!(contract.state().root, TreeShape::FULL.empty_root());
        assert!(contract.pending().unwrap().is_empty());
    }

    #[test]
    fn test_rollup_commits() {
        let (mut contract, mut driver) = setup();
        contract.dispatch(CommitteeAction::create(1, 2, 3, Digest::from_u64(1)));
        contract.dispatch(CommitteeAction::join(1, 1, Digest::from_u64(2)));

        let pending = contract.pending().unwrap().to_vec();
        let batch = driver
            .prove_batch(&contract.state(), &pending, &CancelToken::new())
            .unwrap();
        let committed = contract.rollup(&batch.proof).unwrap();

        assert_eq!(committed.action_state, contract.log().latest());
        assert_eq!(committed.root, driver.storage().root());
        assert!(contract.pending().unwrap().is_empty());
    }

    #[test]
    fn test_resubmission_rejected() {
        let (mut contract, mut driver) = setup();
        contract.dispatch(CommitteeAction::join(1, 0, Digest::from_u64(2)));
        let pending = contract.pending().unwrap().to_vec();
        let batch = driver
            .prove_batch(&contract.state(), &pending, &CancelToken::new())
            .unwrap();
        contract.rollup(&batch.proof).unwrap();

        let before = contract.state();
        assert!(matches!(
            contract.rollup(&batch.proof),
            Err(ContractError::StaleProof { .. })
        ));
        assert_eq!(contract.state(), before);
    }

    #[test]
    fn test_base_proof_rejected() {
        let (mut contract, driver) = setup();
        let state = contract.state();
        let base = driver
            .program()
            .first_step(&CommitteeAction::empty(), state.root, state.action_state)
            .unwrap();
        assert_eq!(contract.rollup(&base), Err(ContractError::EmptyRollup));
    }

    #[test]
    fn test_tampered_proof_rejected() {
        let (mut contract, mut driver) = setup();
        contract.dispatch(CommitteeAction::join(1, 0, Digest::from_u64(2)));
        let pending = contract.pending().unwrap().to_vec();
        let mut proof = driver
            .prove_batch(&contract.state(), &pending, &CancelToken::new())
            .unwrap()
            .proof;
        proof.output.new_root = Digest::from_u64(42);
        assert_eq!(contract.rollup(&proof), Err(ContractError::InvalidProof));
    }

    #[test]
    fn test_step_count_must_match_log() {
        let (mut contract, driver) = setup();
        for member in 0..3 {
            contract.dispatch(CommitteeAction::join(1, member, Digest::from_u64(member)));
        }
        let stored = contract.state();
        let latest = contract.log().latest();

        // a single-step statement that jumps three log positions
        let program = driver.program();
        let statement = Statement {
            step: 1,
            action_hash: Digest::from_u64(7),
            output: RollupOutput::base(stored.root, stored.action_state)
                .advance(latest, Digest::from_u64(42)),
            previous: Some(Hash256::default()),
        };
        let proof_bytes = TranscriptBackend
            .prove(&program.verification_key(), &statement)
            .unwrap();
        let forged = RollupProof {
            step: statement.step,
            action_hash: statement.action_hash,
            output: statement.output,
            previous: statement.previous,
            proof_bytes,
        };
        assert!(program.verify(&forged));

        assert_eq!(
            contract.rollup(&forged),
            Err(ContractError::StepMismatch { step: 1, folded: 3 })
        );
        assert_eq!(contract.state(), stored);
    }

    #[test]
    fn test_undispatched_actions_rejected() {
        let (mut contract, mut driver) = setup();
        contract.dispatch(CommitteeAction::join(1, 0, Digest::from_u64(2)));
        // proof folds an action the contract never saw
        let forged = vec![CommitteeAction::join(1, 5, Digest::from_u64(3))];
        let batch = driver
            .prove_batch(&contract.state(), &forged, &CancelToken::new())
            .unwrap();
        assert!(matches!(
            contract.rollup(&batch.proof),
            Err(ContractError::UnknownActionState(_))
        ));
    }
}
