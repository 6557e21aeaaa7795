//! Generic two-level storage
//!
//! The level-1 tree's leaves are the roots of level-2 trees. Unwritten level-1
//! slots hold the empty level-2 root, so creating a level-2 tree never moves
//! the level-1 root and `level1.leaf(i) == level2[i].root()` holds for every
//! registered `i`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use dkg_rollup_primitives::Digest;

use crate::codec::TwoLevelCodec;
use crate::error::{StorageError, StorageResult};
use crate::merkle::{MerkleWitness, SparseMerkleTree};

/// Pair of authentication paths: leaf to level-2 root, level-2 root to level-1 root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoLevelWitness {
    pub level1: MerkleWitness,
    pub level2: MerkleWitness,
}

impl TwoLevelWitness {
    /// Level-2 root holding `leaf`
    pub fn calculate_level2_root(&self, leaf: Digest) -> Digest {
        self.level2.calculate_root(leaf)
    }

    /// Level-1 root holding `leaf`
    pub fn calculate_root(&self, leaf: Digest) -> Digest {
        self.level1.calculate_root(self.calculate_level2_root(leaf))
    }

    pub fn calculate_level1_index(&self) -> u64 {
        self.level1.calculate_index()
    }

    pub fn calculate_level2_index(&self) -> u64 {
        self.level2.calculate_index()
    }

    pub fn verify(&self, root: &Digest, leaf: Digest) -> bool {
        self.calculate_root(leaf) == *root
    }
}

/// Level-1 tree plus the level-2 trees it owns
#[derive(Debug, Clone)]
pub struct TwoLevelStorage<C: TwoLevelCodec> {
    codec: C,
    level1: SparseMerkleTree,
    level2: BTreeMap<u64, SparseMerkleTree>,
    root: Digest,
}

impl<C: TwoLevelCodec> TwoLevelStorage<C> {
    pub fn new(codec: C) -> Self {
        let empty_level2 = codec.level2_shape().empty_root();
        let level1 = SparseMerkleTree::with_default_leaf(codec.level1_shape(), empty_level2);
        let root = level1.root();
        Self {
            codec,
            level1,
            level2: BTreeMap::new(),
            root,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn root(&self) -> Digest {
        self.root
    }

    pub fn level1_tree(&self) -> &SparseMerkleTree {
        &self.level1
    }

    pub fn level2_tree(&self, level1_index: u64) -> Option<&SparseMerkleTree> {
        self.level2.get(&level1_index)
    }

    /// Level-1 indices with a registered level-2 tree, ascending
    pub fn level1_indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.level2.keys().copied()
    }

    pub fn calculate_leaf(&self, value: &C::Value) -> Digest {
        self.codec.calculate_leaf(value)
    }

    pub fn calculate_level1_index(&self, key: &C::Level1Key) -> u64 {
        self.codec.calculate_level1_index(key)
    }

    pub fn calculate_level2_index(&self, key: &C::Level2Key) -> u64 {
        self.codec.calculate_level2_index(key)
    }

    /// Register an empty level-2 tree. A no-op if one already exists.
    pub fn init_level2(&mut self, level1_index: u64) -> StorageResult<()> {
        self.level1.leaf(level1_index)?;
        if !self.level2.contains_key(&level1_index) {
            debug!(level1_index, "initialized level-2 tree");
            self.level2
                .insert(level1_index, self.codec.level2_shape().new_tree());
        }
        Ok(())
    }

    fn registered(&self, level1_index: u64) -> StorageResult<&SparseMerkleTree> {
        self.level2
            .get(&level1_index)
            .ok_or(StorageError::Level2Missing { level1_index })
    }

    pub fn level2_root(&self, level1_index: u64) -> StorageResult<Digest> {
        Ok(self.registered(level1_index)?.root())
    }

    pub fn leaf(&self, level1_index: u64, level2_index: u64) -> StorageResult<Digest> {
        self.registered(level1_index)?.leaf(level2_index)
    }

    /// Witness pair for a leaf. The level-2 tree must already be registered.
    pub fn witness(&self, level1_index: u64, level2_index: u64) -> StorageResult<TwoLevelWitness> {
        let level2 = self.registered(level1_index)?.witness(level2_index)?;
        let level1 = self.level1.witness(level1_index)?;
        Ok(TwoLevelWitness { level1, level2 })
    }

    /// Write an already-hashed leaf, creating the level-2 tree on first write
    pub fn update_leaf(
        &mut self,
        level1_index: u64,
        level2_index: u64,
        leaf: Digest,
    ) -> StorageResult<Digest> {
        self.level1.leaf(level1_index)?;
        let level2_shape = self.codec.level2_shape();
        if !level2_shape.contains(level2_index) {
            return Err(StorageError::IndexOutOfRange {
                index: level2_index,
                height: level2_shape.height(),
            });
        }

        let level2_root = self
            .level2
            .entry(level1_index)
            .or_insert_with(|| level2_shape.new_tree())
            .set_leaf(level2_index, leaf)?;
        self.root = self.level1.set_leaf(level1_index, level2_root)?;
        trace!(level1_index, level2_index, root = %self.root, "updated two-level leaf");
        Ok(self.root)
    }

    pub fn update_raw_leaf(
        &mut self,
        level1_index: u64,
        level2_index: u64,
        value: &C::Value,
    ) -> StorageResult<Digest> {
        let leaf = self.codec.calculate_leaf(value);
        self.update_leaf(level1_index, level2_index, leaf)
    }

    pub fn insert(
        &mut self,
        level1_key: &C::Level1Key,
        level2_key: &C::Level2Key,
        value: &C::Value,
    ) -> StorageResult<Digest> {
        let level1_index = self.codec.calculate_level1_index(level1_key);
        let level2_index = self.codec.calculate_level2_index(level2_key);
        self.update_raw_leaf(level1_index, level2_index, value)
    }

    /// Cached root is current, every level-2 root is reflected into its
    /// level-1 slot, and no level-1 slot is written without a level-2 tree
    pub fn is_consistent(&self) -> bool {
        if self.root != self.level1.root() || self.root != self.level1.compute_root_from_scratch() {
            return false;
        }
        let reflected = self.level2.iter().all(|(index, tree)| {
            tree.root() == tree.compute_root_from_scratch()
                && self.level1.leaf(*index).map_or(false, |leaf| leaf == tree.root())
        });
        let owned = self
            .level1
            .leaves()
            .keys()
            .all(|index| self.level2.contains_key(index));
        reflected && owned
    }
}
