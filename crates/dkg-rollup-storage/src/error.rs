//! Error types for authenticated storage

use thiserror::Error;

use dkg_rollup_primitives::Digest;

/// Errors raised by sparse Merkle storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Tree heights are limited to 1..=64 so that indices fit in a `u64`
    #[error("Invalid tree height {height}, expected 1..=64")]
    InvalidHeight { height: u32 },

    /// Index does not address a leaf of the tree
    #[error("Index {index} out of range for tree of height {height}")]
    IndexOutOfRange { index: u64, height: u32 },

    /// Level-2 tree has never been initialized or written
    #[error("No level-2 tree registered under level-1 index {level1_index}")]
    Level2Missing { level1_index: u64 },

    /// Witness path length does not match the tree height
    #[error("Witness length {actual} does not match tree height {expected}")]
    WitnessLength { expected: usize, actual: usize },

    /// Root recomputed from a witness differs from the expected root
    #[error("Root mismatch: expected {expected}, computed {actual}")]
    RootMismatch { expected: Digest, actual: Digest },

    /// Witness addresses a different leaf than the one being updated
    #[error("Witness index mismatch: expected {expected}, witness addresses {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    /// Action state already folded into the dedup tree
    #[error("Action at dedup index {index} already processed")]
    AlreadyProcessed { index: u64 },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
