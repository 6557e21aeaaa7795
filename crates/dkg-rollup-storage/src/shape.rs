//! Tree shapes
//!
//! A [`TreeShape`] is the single place where a storage's capacity turns into a
//! tree height. Storages receive their shape at construction time and build
//! empty trees and witnesses from it; there is no global table of heights.

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::Digest;

use crate::error::{StorageError, StorageResult};
use crate::merkle::{default_nodes, MerkleWitness, SparseMerkleTree, WitnessNode};

/// Height of a sparse Merkle tree (number of edges from leaf to root)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TreeShape {
    height: u32,
}

impl TreeShape {
    pub const MAX_HEIGHT: u32 = 64;

    /// Full 64-bit address space
    pub const FULL: TreeShape = TreeShape {
        height: Self::MAX_HEIGHT,
    };

    pub fn new(height: u32) -> StorageResult<Self> {
        if height == 0 || height > Self::MAX_HEIGHT {
            return Err(StorageError::InvalidHeight { height });
        }
        Ok(Self { height })
    }

    /// Smallest shape with at least `capacity` leaves
    pub const fn best_for(capacity: u64) -> Self {
        if capacity <= 2 {
            return Self { height: 1 };
        }
        Self {
            height: 64 - (capacity - 1).leading_zeros(),
        }
    }

    /// Shape addressing every value of a `bits`-wide packed sub-field.
    /// Widths outside 1..=64 are clamped.
    pub const fn for_bits(bits: u32) -> Self {
        let height = if bits == 0 {
            1
        } else if bits > Self::MAX_HEIGHT {
            Self::MAX_HEIGHT
        } else {
            bits
        };
        Self { height }
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Mask of the low `height` bits
    pub const fn index_mask(&self) -> u64 {
        if self.height >= Self::MAX_HEIGHT {
            u64::MAX
        } else {
            (1u64 << self.height) - 1
        }
    }

    pub const fn contains(&self, index: u64) -> bool {
        index & !self.index_mask() == 0
    }

    pub fn leaf_count(&self) -> u128 {
        1u128 << self.height
    }

    /// Empty tree factory
    pub fn new_tree(&self) -> SparseMerkleTree {
        SparseMerkleTree::new(*self)
    }

    /// Root of a tree whose leaves all hold `Digest::ZERO`
    pub fn empty_root(&self) -> Digest {
        let defaults = default_nodes(self.height, Digest::ZERO);
        defaults[self.height as usize]
    }

    /// Witness constructor, checking the path length against the height
    pub fn witness_from(&self, path: Vec<WitnessNode>) -> StorageResult<MerkleWitness> {
        if path.len() != self.height as usize {
            return Err(StorageError::WitnessLength {
                expected: self.height as usize,
                actual: path.len(),
            });
        }
        Ok(MerkleWitness::new(path))
    }

    /// Check a witness produced elsewhere against this shape
    pub fn check_witness(&self, witness: &MerkleWitness) -> StorageResult<()> {
        if witness.height() != self.height as usize {
            return Err(StorageError::WitnessLength {
                expected: self.height as usize,
                actual: witness.height(),
            });
        }
        Ok(())
    }
}

impl TryFrom<u32> for TreeShape {
    type Error = StorageError;

    fn try_from(height: u32) -> Result<Self, Self::Error> {
        Self::new(height)
    }
}

impl From<TreeShape> for u32 {
    fn from(shape: TreeShape) -> Self {
        shape.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_for() {
        assert_eq!(TreeShape::best_for(0).height(), 1);
        assert_eq!(TreeShape::best_for(2).height(), 1);
        assert_eq!(TreeShape::best_for(3).height(), 2);
        assert_eq!(TreeShape::best_for(4).height(), 2);
        assert_eq!(TreeShape::best_for(5).height(), 3);
        assert_eq!(TreeShape::best_for(4096).height(), 12);
        assert_eq!(TreeShape::best_for(u64::MAX).height(), 64);
    }

    #[test]
    fn test_invalid_heights() {
        assert_eq!(
            TreeShape::new(0),
            Err(StorageError::InvalidHeight { height: 0 })
        );
        assert!(TreeShape::new(65).is_err());
        assert!(TreeShape::new(64).is_ok());
    }

    #[test]
    fn test_index_mask() {
        assert_eq!(TreeShape::for_bits(4).index_mask(), 0b1111);
        assert_eq!(TreeShape::FULL.index_mask(), u64::MAX);
        assert!(TreeShape::for_bits(4).contains(15));
        assert!(!TreeShape::for_bits(4).contains(16));
    }

    #[test]
    fn test_empty_root_matches_new_tree() {
        let shape = TreeShape::for_bits(5);
        assert_eq!(shape.new_tree().root(), shape.empty_root());
        assert_ne!(shape.empty_root(), TreeShape::for_bits(6).empty_root());
    }

    #[test]
    fn test_witness_from_checks_length() {
        let shape = TreeShape::for_bits(3);
        let node = WitnessNode {
            sibling: Digest::ZERO,
            is_left: true,
        };
        assert!(shape.witness_from(vec![node; 3]).is_ok());
        assert_eq!(
            shape.witness_from(vec![node; 2]),
            Err(StorageError::WitnessLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_serde_rejects_bad_height() {
        let shape: TreeShape = serde_json::from_str("12").unwrap();
        assert_eq!(shape.height(), 12);
        assert!(serde_json::from_str::<TreeShape>("0").is_err());
    }
}
