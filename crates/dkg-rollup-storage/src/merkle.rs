//! Rescue-based sparse Merkle tree
//!
//! Leaves live at level 0 and the root at level `height`. Only nodes that
//! differ from the default node of their level are stored, so a tree of
//! height 64 costs memory proportional to the number of written leaves.
//!
//! ```text
//! default[0]     = default leaf
//! default[k + 1] = H_node(default[k], default[k])
//! node(k + 1, i) = H_node(node(k, 2i), node(k, 2i + 1))
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{hash_pair, Digest, Domain};

use crate::error::{StorageError, StorageResult};
use crate::shape::TreeShape;

/// Hash two children into their parent
pub fn node_hash(left: &Digest, right: &Digest) -> Digest {
    hash_pair(Domain::MerkleNode, left, right)
}

/// Default node of every level, index 0 being the default leaf
pub(crate) fn default_nodes(height: u32, default_leaf: Digest) -> Vec<Digest> {
    let mut defaults = Vec::with_capacity(height as usize + 1);
    defaults.push(default_leaf);
    for level in 0..height as usize {
        let below = defaults[level];
        defaults.push(node_hash(&below, &below));
    }
    defaults
}

/// One step of an authentication path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessNode {
    /// Hash of the sibling at this level
    pub sibling: Digest,
    /// True when the path node is the left child
    pub is_left: bool,
}

/// Authentication path from a leaf to the root, leaf level first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleWitness {
    path: Vec<WitnessNode>,
}

impl MerkleWitness {
    pub fn new(path: Vec<WitnessNode>) -> Self {
        Self { path }
    }

    pub fn height(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[WitnessNode] {
        &self.path
    }

    /// Root of the tree that would hold `leaf` at this path
    pub fn calculate_root(&self, leaf: Digest) -> Digest {
        self.path.iter().fold(leaf, |current, node| {
            if node.is_left {
                node_hash(&current, &node.sibling)
            } else {
                node_hash(&node.sibling, &current)
            }
        })
    }

    /// Leaf index addressed by this path
    pub fn calculate_index(&self) -> u64 {
        self.path
            .iter()
            .take(TreeShape::MAX_HEIGHT as usize)
            .enumerate()
            .filter(|(_, node)| !node.is_left)
            .fold(0u64, |index, (level, _)| index | (1u64 << level))
    }

    pub fn verify(&self, root: &Digest, leaf: Digest) -> bool {
        self.calculate_root(leaf) == *root
    }
}

/// Fixed-height sparse Merkle tree
#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    shape: TreeShape,
    defaults: Vec<Digest>,
    nodes: HashMap<(u32, u64), Digest>,
}

impl SparseMerkleTree {
    /// Empty tree with `Digest::ZERO` leaves
    pub fn new(shape: TreeShape) -> Self {
        Self::with_default_leaf(shape, Digest::ZERO)
    }

    /// Empty tree whose unwritten leaves hold `default_leaf`
    pub fn with_default_leaf(shape: TreeShape, default_leaf: Digest) -> Self {
        Self {
            shape,
            defaults: default_nodes(shape.height(), default_leaf),
            nodes: HashMap::new(),
        }
    }

    /// Build a tree from `(index, leaf)` pairs, later pairs overwriting earlier ones
    pub fn from_leaves<I>(shape: TreeShape, leaves: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = (u64, Digest)>,
    {
        let mut tree = Self::new(shape);
        for (index, leaf) in leaves {
            tree.set_leaf(index, leaf)?;
        }
        Ok(tree)
    }

    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    pub fn height(&self) -> u32 {
        self.shape.height()
    }

    pub fn default_leaf(&self) -> Digest {
        self.defaults[0]
    }

    pub fn root(&self) -> Digest {
        self.node(self.height(), 0)
    }

    fn node(&self, level: u32, index: u64) -> Digest {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.defaults[level as usize])
    }

    fn put(&mut self, level: u32, index: u64, value: Digest) {
        if value == self.defaults[level as usize] {
            self.nodes.remove(&(level, index));
        } else {
            self.nodes.insert((level, index), value);
        }
    }

    fn check_index(&self, index: u64) -> StorageResult<()> {
        if !self.shape.contains(index) {
            return Err(StorageError::IndexOutOfRange {
                index,
                height: self.height(),
            });
        }
        Ok(())
    }

    pub fn leaf(&self, index: u64) -> StorageResult<Digest> {
        self.check_index(index)?;
        Ok(self.node(0, index))
    }

    /// Write a leaf and rehash its path. Returns the new root.
    pub fn set_leaf(&mut self, index: u64, leaf: Digest) -> StorageResult<Digest> {
        self.check_index(index)?;

        let mut current = leaf;
        let mut position = index;
        for level in 0..self.height() {
            self.put(level, position, current);
            let sibling = self.node(level, position ^ 1);
            current = if position & 1 == 0 {
                node_hash(&current, &sibling)
            } else {
                node_hash(&sibling, &current)
            };
            position >>= 1;
        }
        self.put(self.height(), 0, current);

        Ok(current)
    }

    /// Authentication path for the leaf at `index`
    pub fn witness(&self, index: u64) -> StorageResult<MerkleWitness> {
        self.check_index(index)?;

        let mut path = Vec::with_capacity(self.height() as usize);
        let mut position = index;
        for level in 0..self.height() {
            path.push(WitnessNode {
                sibling: self.node(level, position ^ 1),
                is_left: position & 1 == 0,
            });
            position >>= 1;
        }
        Ok(MerkleWitness::new(path))
    }

    /// Every leaf that differs from the default leaf, by index
    pub fn leaves(&self) -> BTreeMap<u64, Digest> {
        self.nodes
            .iter()
            .filter(|((level, _), _)| *level == 0)
            .map(|((_, index), leaf)| (*index, *leaf))
            .collect()
    }

    /// Number of stored non-default nodes across all levels
    pub fn stored_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Recompute the root from the leaves alone, ignoring cached internal nodes
    pub fn compute_root_from_scratch(&self) -> Digest {
        let mut current = self.leaves();
        for level in 0..self.height() as usize {
            let default = self.defaults[level];
            let mut parents = BTreeMap::new();
            for &index in current.keys() {
                let parent = index >> 1;
                if parents.contains_key(&parent) {
                    continue;
                }
                let left = current.get(&(index & !1)).copied().unwrap_or(default);
                let right = current.get(&(index | 1)).copied().unwrap_or(default);
                parents.insert(parent, node_hash(&left, &right));
            }
            current = parents;
        }
        current
            .get(&0)
            .copied()
            .unwrap_or(self.defaults[self.height() as usize])
    }
}
