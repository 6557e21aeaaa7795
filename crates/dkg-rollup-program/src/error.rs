//! Error types for rollup proof construction

use thiserror::Error;

use dkg_rollup_primitives::Digest;
use dkg_rollup_storage::StorageError;

/// Errors that abort a rollup step or batch
#[derive(Debug, Error)]
pub enum RollupError {
    /// The proof handed to `next_step` does not verify
    #[error("Earlier proof at step {step} failed verification")]
    EarlierProofInvalid { step: u64 },

    /// Dedup witness or storage assertion failed
    #[error("Dedup check failed: {0}")]
    Storage(#[from] StorageError),

    /// Local dedup storage does not match the root the batch starts from
    #[error("Local storage out of sync: expected root {expected}, local root {actual}")]
    StorageOutOfSync { expected: Digest, actual: Digest },

    /// Batch has no actions
    #[error("Batch cannot be empty")]
    EmptyBatch,

    /// Batch exceeds maximum size
    #[error("Batch size {size} exceeds maximum {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Batch abandoned at a step boundary
    #[error("Rollup cancelled before step {step}")]
    Cancelled { step: usize },

    /// Proof backend failure
    #[error("Proof backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// Result type for rollup operations
pub type RollupResult<T> = Result<T, RollupError>;
