//! Leaf codecs
//!
//! A storage is a tree plus a codec: the codec decides how a domain key maps
//! to a leaf address and how a typed value is hashed into a leaf. Both
//! functions must match the on-chain computation bit for bit.

use dkg_rollup_primitives::Digest;

use crate::shape::TreeShape;

/// Codec for a one-level storage
pub trait LeafCodec {
    /// Domain key the index is derived from
    type Key: ?Sized;
    /// Typed value stored in a leaf
    type Value: ?Sized;

    /// Tree shape the indices of this codec fit into
    fn shape(&self) -> TreeShape;

    fn calculate_index(&self, key: &Self::Key) -> u64;

    fn calculate_leaf(&self, value: &Self::Value) -> Digest;
}

/// Codec for a two-level storage
pub trait TwoLevelCodec {
    type Level1Key: ?Sized;
    type Level2Key: ?Sized;
    type Value: ?Sized;

    fn level1_shape(&self) -> TreeShape;

    fn level2_shape(&self) -> TreeShape;

    fn calculate_level1_index(&self, key: &Self::Level1Key) -> u64;

    fn calculate_level2_index(&self, key: &Self::Level2Key) -> u64;

    fn calculate_leaf(&self, value: &Self::Value) -> Digest;
}
