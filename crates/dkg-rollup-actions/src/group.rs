//! Opaque group elements carried in action payloads.
//!
//! Curve arithmetic and the encryption scheme live outside this crate; the
//! engine only needs a stable field encoding of each point so that it can be
//! hashed into actions and storage leaves.

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{felt_from_u64, felt_to_u64, hash_fields, Digest, Domain, Felt};

/// A group element as two canonical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawGroupElement")]
pub struct GroupElement {
    pub x: u64,
    pub y: u64,
}

/// Wire form, reduced into the field on the way in
#[derive(Deserialize)]
struct RawGroupElement {
    x: u64,
    y: u64,
}

impl From<RawGroupElement> for GroupElement {
    fn from(raw: RawGroupElement) -> Self {
        Self::new(raw.x, raw.y)
    }
}

impl GroupElement {
    /// Identity sentinel used by empty actions
    pub const ZERO: GroupElement = GroupElement { x: 0, y: 0 };

    pub fn new(x: u64, y: u64) -> Self {
        Self::from_felts(felt_from_u64(x), felt_from_u64(y))
    }

    pub fn from_felts(x: Felt, y: Felt) -> Self {
        Self {
            x: felt_to_u64(x),
            y: felt_to_u64(y),
        }
    }

    pub fn to_felts(&self) -> [Felt; 2] {
        [felt_from_u64(self.x), felt_from_u64(self.y)]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Commitment to the point, used as a storage leaf
    pub fn hash(&self) -> Digest {
        hash_fields(Domain::GroupElement, &self.to_felts())
    }
}
