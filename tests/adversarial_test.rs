//! Adversarial tests for the rollup pipeline
//!
//! Every attack below must be rejected either while building the proof chain
//! or at submission, and a rejected submission must leave the contract state
//! untouched.

use std::sync::Arc;

use dkg_rollup::actions::{Action, ActionState, CommitteeAction, KeyAction};
use dkg_rollup::contract::{ContractError, RollupContract};
use dkg_rollup::primitives::{Digest, Hash256};
use dkg_rollup::program::{
    CancelToken, ProofBackend, RollupConfig, RollupDriver, RollupError, RollupOutput,
    RollupProgram, RollupProof, Statement, TranscriptBackend,
};
use dkg_rollup::storage::{ProcessStorage, StorageError, TreeShape};

type Program = RollupProgram<CommitteeAction, TranscriptBackend>;
type Contract = RollupContract<CommitteeAction, TranscriptBackend>;
type Driver = RollupDriver<CommitteeAction, TranscriptBackend>;

// =============================================================================
// Test Helpers
// =============================================================================

fn setup() -> (Arc<Program>, Contract) {
    let program = Arc::new(Program::compile(TranscriptBackend, TreeShape::FULL).expect("compile"));
    let contract = Contract::new(program.clone());
    (program, contract)
}

fn driver(program: &Arc<Program>) -> Driver {
    Driver::with_program(program.clone(), RollupConfig::default())
}

fn a1() -> CommitteeAction {
    CommitteeAction::create(1, 2, 3, Digest::from_u64(0xa1))
}

fn a2() -> CommitteeAction {
    CommitteeAction::join(1, 1, Digest::from_u64(0xa2))
}

fn prove(driver: &mut Driver, contract: &Contract, actions: &[CommitteeAction]) -> RollupProof {
    driver
        .prove_batch(&contract.state(), actions, &CancelToken::new())
        .expect("prove batch")
        .proof
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn test_dedup_rejects_second_processing() {
    let mut storage = ProcessStorage::new(TreeShape::FULL);
    let state = ActionState::initial().push(&a1());
    let index = storage.index_of(&state);

    let before = storage.witness(index).unwrap();
    let first = ProcessStorage::process(index, 0, state.digest(), storage.root(), &before).unwrap();
    assert_eq!(storage.apply(&state).unwrap(), first);

    // same slot, same claimed counter, advanced snapshot
    let after = storage.witness(index).unwrap();
    assert!(matches!(
        ProcessStorage::process(index, 0, state.digest(), storage.root(), &after),
        Err(StorageError::RootMismatch { .. })
    ));
    assert_eq!(
        storage.apply(&state),
        Err(StorageError::AlreadyProcessed { index })
    );
}

#[test]
fn test_replayed_step_rejected_by_program() {
    let (program, _) = setup();
    let mut storage = ProcessStorage::new(TreeShape::FULL);
    let s0 = ActionState::initial();
    let s1 = s0.push(&a1());

    let p0 = program
        .first_step(&CommitteeAction::empty(), storage.root(), s0)
        .unwrap();
    let witness = storage.witness(storage.index_of(&s1)).unwrap();
    let p1 = program.next_step(&a1(), &p0, &witness).unwrap();
    storage.apply(&s1).unwrap();

    // restart from s0 on the advanced tree and try to fold a1 again
    let restarted = program
        .first_step(&CommitteeAction::empty(), p1.output.new_root, s0)
        .unwrap();
    let witness = storage.witness(storage.index_of(&s1)).unwrap();
    assert!(matches!(
        program.next_step(&a1(), &restarted, &witness),
        Err(RollupError::Storage(StorageError::RootMismatch { .. }))
    ));
}

#[test]
fn test_driver_refuses_out_of_sync_base() {
    let (program, mut contract) = setup();
    let mut driver = driver(&program);
    contract.dispatch(a1());
    let genesis = contract.state();
    let _ = prove(&mut driver, &contract, &[a1()]);

    // driver storage has moved past the genesis root
    assert!(matches!(
        driver.prove_batch(&genesis, &[a1()], &CancelToken::new()),
        Err(RollupError::StorageOutOfSync { .. })
    ));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_reordered_batch_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());
    contract.dispatch(a2());
    let before = contract.state();

    let proof = prove(&mut driver(&program), &contract, &[a2(), a1()]);
    assert!(program.verify(&proof));
    assert!(matches!(
        contract.rollup(&proof),
        Err(ContractError::UnknownActionState(_))
    ));
    assert_eq!(contract.state(), before);
}

#[test]
fn test_skipped_action_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());
    contract.dispatch(a2());

    let proof = prove(&mut driver(&program), &contract, &[a2()]);
    assert!(matches!(
        contract.rollup(&proof),
        Err(ContractError::UnknownActionState(_))
    ));
}

#[test]
fn test_prefix_rollup_leaves_rest_pending() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());
    contract.dispatch(a2());

    let proof = prove(&mut driver(&program), &contract, &[a1()]);
    contract.rollup(&proof).unwrap();
    assert_eq!(contract.pending().unwrap(), &[a2()]);
}

// =============================================================================
// Stale submissions
// =============================================================================

#[test]
fn test_competing_submission_is_stale() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());

    let first = prove(&mut driver(&program), &contract, &[a1()]);
    let second = prove(&mut driver(&program), &contract, &[a1()]);
    assert_eq!(first.output, second.output);

    let committed = contract.rollup(&first).unwrap();
    assert!(matches!(
        contract.rollup(&second),
        Err(ContractError::StaleProof { .. })
    ));
    assert_eq!(contract.state(), committed);
}

// =============================================================================
// Forged witnesses
// =============================================================================

#[test]
fn test_witness_for_other_slot_rejected() {
    let (program, _) = setup();
    let storage = ProcessStorage::new(TreeShape::FULL);
    let s0 = ActionState::initial();
    let s1 = s0.push(&a1());

    let p0 = program
        .first_step(&CommitteeAction::empty(), storage.root(), s0)
        .unwrap();
    // empty siblings reproduce the root, but the path addresses another slot
    let wrong = storage.witness(storage.index_of(&s1) ^ 1).unwrap();
    assert!(matches!(
        program.next_step(&a1(), &p0, &wrong),
        Err(RollupError::Storage(StorageError::IndexMismatch { .. }))
    ));
}

#[test]
fn test_witness_against_wrong_root_rejected() {
    let (program, _) = setup();
    let mut other = ProcessStorage::new(TreeShape::FULL);
    other.apply(&ActionState::initial().push(&a2())).unwrap();

    let s0 = ActionState::initial();
    let s1 = s0.push(&a1());
    let p0 = program
        .first_step(&CommitteeAction::empty(), TreeShape::FULL.empty_root(), s0)
        .unwrap();
    let foreign = other.witness(other.index_of(&s1)).unwrap();
    assert!(matches!(
        program.next_step(&a1(), &p0, &foreign),
        Err(RollupError::Storage(StorageError::RootMismatch { .. }))
    ));
}

// =============================================================================
// Tampered proofs
// =============================================================================

#[test]
fn test_tampered_output_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());
    let before = contract.state();

    let mut proof = prove(&mut driver(&program), &contract, &[a1()]);
    proof.output.new_root = Digest::from_u64(7);
    assert_eq!(contract.rollup(&proof), Err(ContractError::InvalidProof));
    assert_eq!(contract.state(), before);
}

#[test]
fn test_tampered_bytes_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());

    let mut proof = prove(&mut driver(&program), &contract, &[a1()]);
    if let Some(byte) = proof.proof_bytes.first_mut() {
        *byte ^= 0xff;
    }
    assert_eq!(contract.rollup(&proof), Err(ContractError::InvalidProof));
}

#[test]
fn test_tampered_link_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());

    let mut proof = prove(&mut driver(&program), &contract, &[a1()]);
    proof.previous = Some(Hash256::sha256_with_domain(b"FORGED", b"previous"));
    assert_eq!(contract.rollup(&proof), Err(ContractError::InvalidProof));

    proof.previous = None;
    assert_eq!(contract.rollup(&proof), Err(ContractError::InvalidProof));
}

#[test]
fn test_proof_from_other_family_rejected() {
    let (_, mut contract) = setup();
    contract.dispatch(a1());

    let key_program =
        RollupProgram::<KeyAction, _>::compile(TranscriptBackend, TreeShape::FULL).unwrap();
    let state = contract.state();
    let base = key_program
        .first_step(&KeyAction::empty(), state.root, state.action_state)
        .unwrap();
    // a key-family proof never verifies against the committee program
    assert_eq!(contract.rollup(&base), Err(ContractError::InvalidProof));
}

#[test]
fn test_statement_skipping_log_positions_rejected() {
    let (program, mut contract) = setup();
    contract.dispatch(a1());
    contract.dispatch(a2());
    let stored = contract.state();

    // a transcript proof can be sealed for any statement: one step, two log positions
    let statement = Statement {
        step: 1,
        action_hash: a2().hash(),
        output: RollupOutput::base(stored.root, stored.action_state)
            .advance(contract.log().latest(), Digest::from_u64(0xbad)),
        previous: Some(Hash256::sha256_with_domain(b"FORGED", b"previous")),
    };
    let forged = RollupProof {
        step: statement.step,
        action_hash: statement.action_hash,
        output: statement.output,
        previous: statement.previous,
        proof_bytes: TranscriptBackend
            .prove(&program.verification_key(), &statement)
            .unwrap(),
    };

    assert_eq!(
        contract.rollup(&forged),
        Err(ContractError::StepMismatch { step: 1, folded: 2 })
    );
    assert_eq!(contract.state(), stored);

    // the honest two-step proof still lands and workers stay in sync
    let mut honest = driver(&program);
    let proof = prove(&mut honest, &contract, &[a1(), a2()]);
    contract.rollup(&proof).unwrap();
    assert_eq!(contract.state().root, honest.storage().root());
}
