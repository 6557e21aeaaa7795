//! Requester actions: accumulating encrypted task vectors before a request is
//! opened.
//!
//! Packed layout (MSB first):
//!
//! | request_id | requester_index |
//! |------------|-----------------|
//! | 13         | 9               |

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{Digest, Felt};

use crate::action::{Action, ActionKind};
use crate::codec::{BitLayout, FieldReader, FieldWriter};
use crate::error::CodecResult;
use crate::group::GroupElement;
use crate::limits::{REQUESTER_INDEX_BITS, REQUEST_ID_BITS};

pub const REQUESTER_LAYOUT: BitLayout<2> = BitLayout::new(
    ["request_id", "requester_index"],
    [REQUEST_ID_BITS, REQUESTER_INDEX_BITS],
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterAction {
    pub packed_data: u64,
    /// Sum of ephemeral randomness points
    pub r_sum: GroupElement,
    /// Sum of encrypted message points
    pub m_sum: GroupElement,
    /// Commitment to the requester's plaintext vector
    pub commitment: Digest,
}

impl RequesterAction {
    pub fn pack(request_id: u64, requester_index: u64) -> u64 {
        REQUESTER_LAYOUT.pack([request_id, requester_index])
    }

    pub fn new(
        request_id: u64,
        requester_index: u64,
        r_sum: GroupElement,
        m_sum: GroupElement,
        commitment: Digest,
    ) -> Self {
        Self {
            packed_data: Self::pack(request_id, requester_index),
            r_sum,
            m_sum,
            commitment,
        }
    }

    pub fn request_id(&self) -> u64 {
        REQUESTER_LAYOUT.field(0).extract(self.packed_data)
    }

    pub fn requester_index(&self) -> u64 {
        REQUESTER_LAYOUT.field(1).extract(self.packed_data)
    }
}

impl Action for RequesterAction {
    const KIND: ActionKind = ActionKind::Requester;
    const FIELD_COUNT: usize = 9;

    fn empty() -> Self {
        Self {
            packed_data: 0,
            r_sum: GroupElement::ZERO,
            m_sum: GroupElement::ZERO,
            commitment: Digest::ZERO,
        }
    }

    fn to_fields(&self) -> Vec<Felt> {
        FieldWriter::with_capacity(Self::FIELD_COUNT)
            .u64(self.packed_data)
            .group(&self.r_sum)
            .group(&self.m_sum)
            .digest(&self.commitment)
            .finish()
    }

    fn from_fields(fields: &[Felt]) -> CodecResult<Self> {
        let mut reader = FieldReader::new(Self::KIND.name(), fields, Self::FIELD_COUNT)?;
        let packed_data = reader.u64();
        REQUESTER_LAYOUT.check_packed(packed_data)?;
        Ok(Self {
            packed_data,
            r_sum: reader.group(),
            m_sum: reader.group(),
            commitment: reader.digest(),
        })
    }
}
