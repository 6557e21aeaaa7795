//! End-to-end rollup scenario
//!
//! Two committee actions are dispatched to a contract, folded off-chain by
//! hand with `first_step`/`next_step`, and committed in one submission.

use std::sync::Arc;

use dkg_rollup::actions::{Action, ActionState, CommitteeAction};
use dkg_rollup::contract::{ContractError, RollupContract};
use dkg_rollup::primitives::Digest;
use dkg_rollup::program::{
    CancelToken, RollupConfig, RollupDriver, RollupOutput, RollupProgram, RollupProof,
    RollupState, TranscriptBackend,
};
use dkg_rollup::storage::{processed_leaf, ProcessStorage, TreeShape};

type Program = RollupProgram<CommitteeAction, TranscriptBackend>;

// =============================================================================
// Test Helpers
// =============================================================================

fn program() -> Arc<Program> {
    Arc::new(Program::compile(TranscriptBackend, TreeShape::FULL).expect("compile"))
}

fn create_committee_1() -> CommitteeAction {
    CommitteeAction::create(1, 2, 3, Digest::from_limbs([11, 12, 13, 14]))
}

fn join_committee_1() -> CommitteeAction {
    CommitteeAction::join(1, 1, Digest::from_limbs([21, 22, 23, 24]))
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_two_action_rollup_scenario() {
    let program = program();
    let mut contract = RollupContract::new(program.clone());

    let s0 = ActionState::initial();
    let empty_root = TreeShape::FULL.empty_root();
    assert_eq!(contract.state(), RollupState::new(s0, empty_root));

    let a1 = create_committee_1();
    let a2 = join_committee_1();
    contract.dispatch(a1.clone());
    contract.dispatch(a2.clone());

    // P0: the base step does not move anything
    let mut storage = ProcessStorage::new(TreeShape::FULL);
    let p0 = program
        .first_step(&CommitteeAction::empty(), empty_root, s0)
        .unwrap();
    assert_eq!(p0.output, RollupOutput::base(empty_root, s0));

    // P1: fold a1 over a non-existence witness for its chain position
    let s1 = s0.push(&a1);
    let w1 = storage.witness(storage.index_of(&s1)).unwrap();
    assert_eq!(w1.calculate_root(Digest::ZERO), empty_root);
    let p1 = program.next_step(&a1, &p0, &w1).unwrap();
    let r1 = storage.apply(&s1).unwrap();
    assert_eq!(p1.output.new_action_state, s1);
    assert_eq!(p1.output.new_root, r1);
    assert_eq!(r1, w1.calculate_root(processed_leaf(s1.digest(), 1)));

    // P2: fold a2 on top of P1
    let s2 = p1.output.new_action_state.push(&a2);
    let w2 = storage.witness(storage.index_of(&s2)).unwrap();
    let p2 = program.next_step(&a2, &p1, &w2).unwrap();
    let r2 = storage.apply(&s2).unwrap();
    assert_eq!(p2.output.new_action_state, s0.push(&a1).push(&a2));
    assert_eq!(p2.output.new_root, r2);
    assert_eq!(p2.output.initial(), RollupState::new(s0, empty_root));
    assert_eq!(p2.step, 2);

    // commit
    let committed = contract.rollup(&p2).unwrap();
    assert_eq!(committed, RollupState::new(s2, r2));
    assert_eq!(contract.state(), committed);
    assert!(contract.pending().unwrap().is_empty());

    // the stored initial state has moved on, so P2 is now stale
    assert!(matches!(
        contract.rollup(&p2),
        Err(ContractError::StaleProof { .. })
    ));
    assert_eq!(contract.state(), committed);
}

#[test]
fn test_driver_matches_manual_fold() {
    let program = program();
    let mut contract = RollupContract::new(program.clone());
    contract.dispatch(create_committee_1());
    contract.dispatch(join_committee_1());

    let mut driver = RollupDriver::with_program(program.clone(), RollupConfig::default());
    let pending = contract.pending().unwrap().to_vec();
    let batch = driver
        .prove_batch(&contract.state(), &pending, &CancelToken::new())
        .unwrap();

    let manual = ActionState::initial()
        .push(&create_committee_1())
        .push(&join_committee_1());
    assert_eq!(batch.proof.output.new_action_state, manual);
    assert_eq!(batch.processed.len(), 2);
    assert_eq!(batch.processed.last(), Some(&manual));

    contract.rollup(&batch.proof).unwrap();
    assert_eq!(contract.state().root, driver.storage().root());
}

#[test]
fn test_consecutive_rollups() {
    let program = program();
    let mut contract = RollupContract::new(program.clone());
    let mut driver = RollupDriver::with_program(program, RollupConfig::small_batch());

    for round in 0..3u64 {
        for member in 0..4u64 {
            contract.dispatch(CommitteeAction::join(
                round + 1,
                member,
                Digest::from_u64(round * 10 + member),
            ));
        }
        let pending = contract.pending().unwrap().to_vec();
        assert_eq!(pending.len(), 4);

        let batch = driver
            .prove_batch(&contract.state(), &pending, &CancelToken::new())
            .unwrap();
        let committed = contract.rollup(&batch.proof).unwrap();
        assert_eq!(committed.action_state, contract.log().latest());
    }

    assert_eq!(driver.storage().len(), 12);
    assert!(driver.storage().is_consistent());
}

#[test]
fn test_proof_survives_transport() {
    let program = program();
    let mut contract = RollupContract::new(program.clone());
    contract.dispatch(create_committee_1());

    let mut driver = RollupDriver::with_program(program, RollupConfig::default());
    let pending = contract.pending().unwrap().to_vec();
    let proof = driver
        .prove_batch(&contract.state(), &pending, &CancelToken::new())
        .unwrap()
        .proof;

    let from_json = RollupProof::from_json(&proof.to_json().unwrap()).unwrap();
    let from_b64 = RollupProof::from_base64(&proof.to_base64().unwrap()).unwrap();
    assert_eq!(from_json, proof);
    assert_eq!(from_b64.proof_hash(), proof.proof_hash());

    contract.rollup(&from_b64).unwrap();
}
