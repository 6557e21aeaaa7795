//! DKG Rollup Storage
//!
//! Authenticated key-addressed storage backed by Rescue sparse Merkle trees.
//!
//! - [`SparseMerkleTree`] and [`MerkleWitness`]: the tree and its paths
//! - [`TreeShape`]: capacity to height, empty trees and witness construction
//! - [`OneLevelStorage`] / [`TwoLevelStorage`]: generic storages over a
//!   [`LeafCodec`] / [`TwoLevelCodec`]
//! - [`ProcessStorage`]: the dedup tree guarding rollup replay
//! - [`domains`]: codecs for committees, members, keys, contributions,
//!   requests and responses

pub mod codec;
pub mod domains;
pub mod error;
pub mod merkle;
pub mod one_level;
pub mod process;
pub mod shape;
pub mod two_level;

pub use codec::{LeafCodec, TwoLevelCodec};
pub use error::{StorageError, StorageResult};
pub use merkle::{node_hash, MerkleWitness, SparseMerkleTree, WitnessNode};
pub use one_level::OneLevelStorage;
pub use process::{processed_leaf, ProcessCodec, ProcessRecord, ProcessStorage};
pub use shape::TreeShape;
pub use two_level::{TwoLevelStorage, TwoLevelWitness};
