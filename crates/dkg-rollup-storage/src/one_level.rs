//! Generic one-level storage

use tracing::trace;

use dkg_rollup_primitives::Digest;

use crate::codec::LeafCodec;
use crate::error::StorageResult;
use crate::merkle::{MerkleWitness, SparseMerkleTree};

/// A sparse Merkle tree with a cached root, addressed through a codec
#[derive(Debug, Clone)]
pub struct OneLevelStorage<C: LeafCodec> {
    codec: C,
    tree: SparseMerkleTree,
    root: Digest,
}

impl<C: LeafCodec> OneLevelStorage<C> {
    pub fn new(codec: C) -> Self {
        let tree = codec.shape().new_tree();
        let root = tree.root();
        Self { codec, tree, root }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn tree(&self) -> &SparseMerkleTree {
        &self.tree
    }

    pub fn root(&self) -> Digest {
        self.root
    }

    pub fn calculate_leaf(&self, value: &C::Value) -> Digest {
        self.codec.calculate_leaf(value)
    }

    pub fn calculate_index(&self, key: &C::Key) -> u64 {
        self.codec.calculate_index(key)
    }

    pub fn leaf(&self, index: u64) -> StorageResult<Digest> {
        self.tree.leaf(index)
    }

    pub fn witness(&self, index: u64) -> StorageResult<MerkleWitness> {
        self.tree.witness(index)
    }

    /// Write an already-hashed leaf
    pub fn update_leaf(&mut self, index: u64, leaf: Digest) -> StorageResult<Digest> {
        self.root = self.tree.set_leaf(index, leaf)?;
        trace!(index, root = %self.root, "updated leaf");
        Ok(self.root)
    }

    /// Hash a typed value through the codec and write it
    pub fn update_raw_leaf(&mut self, index: u64, value: &C::Value) -> StorageResult<Digest> {
        let leaf = self.codec.calculate_leaf(value);
        self.update_leaf(index, leaf)
    }

    /// Derive the index from a domain key and write a typed value
    pub fn insert(&mut self, key: &C::Key, value: &C::Value) -> StorageResult<Digest> {
        let index = self.codec.calculate_index(key);
        self.update_raw_leaf(index, value)
    }

    /// Cached root agrees with a from-scratch recomputation
    pub fn is_consistent(&self) -> bool {
        self.root == self.tree.root() && self.root == self.tree.compute_root_from_scratch()
    }
}
