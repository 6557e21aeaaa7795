//! DKG Rollup Program
//!
//! Recursive composition of rollup steps over the dedup storage.
//!
//! - [`RollupProgram`]: `first_step` / `next_step` state machine
//! - [`ProofBackend`]: the opaque proof system, with [`TranscriptBackend`] as
//!   the deterministic reference implementation
//! - [`RollupDriver`]: folds a batch of actions into one proof chain over a
//!   storage snapshot, with cooperative cancellation
//! - [`prove_independent`]: parallel proving of independent chains

pub mod backend;
pub mod config;
pub mod driver;
pub mod error;
pub mod output;
pub mod program;
pub mod proof;

pub use backend::{ProgramDescriptor, ProofBackend, Statement, TranscriptBackend, VerificationKey};
pub use config::RollupConfig;
pub use driver::{prove_independent, CancelToken, RollupBatch, RollupDriver, RollupJob};
pub use error::{RollupError, RollupResult};
pub use output::{RollupOutput, RollupState};
pub use program::{RollupProgram, RollupStep};
pub use proof::{RollupProof, PROOF_HASH_DOMAIN};
