//! DKG Rollup - off-chain action rollup and sparse Merkle storage for
//! distributed key generation
//!
//! Contract methods for committees, keys, contributions and decryption
//! requests only append actions to an on-chain hash chain. This workspace
//! folds those actions off-chain into a chain of recursive proofs and
//! commits the result back in one transaction.
//!
//! # Crates
//!
//! - `dkg-rollup-primitives`: Goldilocks field, Rescue hashing, digests
//! - `dkg-rollup-actions`: action families, packed-field codecs, the action hash chain
//! - `dkg-rollup-storage`: sparse Merkle trees, one- and two-level storages, dedup storage
//! - `dkg-rollup-program`: rollup program, proof backend seam, batch driver
//! - `dkg-rollup-contract`: contract-side action log and rollup acceptance
//! - `dkg-rollup-client`: chain clients and the rollup worker
//!
//! # Example
//!
//! ```no_run
//! use dkg_rollup::actions::CommitteeAction;
//! use dkg_rollup::contract::RollupContract;
//! use dkg_rollup::primitives::Digest;
//! use dkg_rollup::program::{CancelToken, RollupConfig, RollupDriver, TranscriptBackend};
//!
//! let mut driver =
//!     RollupDriver::<CommitteeAction, _>::new(TranscriptBackend, RollupConfig::default()).unwrap();
//! let mut contract = RollupContract::new(driver.program().clone());
//!
//! contract.dispatch(CommitteeAction::create(1, 2, 3, Digest::from_u64(7)));
//! let pending = contract.pending().unwrap().to_vec();
//! let batch = driver
//!     .prove_batch(&contract.state(), &pending, &CancelToken::new())
//!     .unwrap();
//! contract.rollup(&batch.proof).unwrap();
//! ```

pub use dkg_rollup_actions as actions;
pub use dkg_rollup_client as client;
pub use dkg_rollup_contract as contract;
pub use dkg_rollup_primitives as primitives;
pub use dkg_rollup_program as program;
pub use dkg_rollup_storage as storage;
