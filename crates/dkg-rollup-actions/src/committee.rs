//! Committee actions: creating a committee and members joining it
//!
//! Packed layout (MSB first):
//!
//! | committee_id | member_id | threshold | size | action_type |
//! |--------------|-----------|-----------|------|-------------|
//! | 7            | 4         | 4         | 4    | 2           |

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{Digest, Felt};

use crate::action::{Action, ActionKind};
use crate::codec::{bits_for, BitLayout, FieldReader, FieldWriter};
use crate::error::{CodecError, CodecResult};
use crate::limits::{COMMITTEE_ID_BITS, MEMBER_ID_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum CommitteeActionType {
    Create = 0,
    Join = 1,
}

impl CommitteeActionType {
    pub const COUNT: u64 = 2;
}

impl TryFrom<u64> for CommitteeActionType {
    type Error = CodecError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Create),
            1 => Ok(Self::Join),
            _ => Err(CodecError::UnknownTag {
                field: "committee action type",
                tag,
            }),
        }
    }
}

pub const COMMITTEE_LAYOUT: BitLayout<5> = BitLayout::new(
    ["committee_id", "member_id", "threshold", "size", "action_type"],
    [
        COMMITTEE_ID_BITS,
        MEMBER_ID_BITS,
        MEMBER_ID_BITS,
        MEMBER_ID_BITS,
        bits_for(CommitteeActionType::COUNT),
    ],
);

/// A committee lifecycle action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeAction {
    /// Bit-packed sub-fields, see module docs
    pub packed_data: u64,
    /// Hash of the joining member's public key (creator for `Create`)
    pub member_key: Digest,
}

impl CommitteeAction {
    /// Pack sub-fields. Values wider than their slot are truncated.
    pub fn pack(
        committee_id: u64,
        member_id: u64,
        threshold: u64,
        size: u64,
        action_type: CommitteeActionType,
    ) -> u64 {
        COMMITTEE_LAYOUT.pack([committee_id, member_id, threshold, size, action_type as u64])
    }

    pub fn create(committee_id: u64, threshold: u64, size: u64, creator_key: Digest) -> Self {
        Self {
            packed_data: Self::pack(committee_id, 0, threshold, size, CommitteeActionType::Create),
            member_key: creator_key,
        }
    }

    pub fn join(committee_id: u64, member_id: u64, member_key: Digest) -> Self {
        Self {
            packed_data: Self::pack(committee_id, member_id, 0, 0, CommitteeActionType::Join),
            member_key,
        }
    }

    pub fn committee_id(&self) -> u64 {
        COMMITTEE_LAYOUT.field(0).extract(self.packed_data)
    }

    pub fn member_id(&self) -> u64 {
        COMMITTEE_LAYOUT.field(1).extract(self.packed_data)
    }

    pub fn threshold(&self) -> u64 {
        COMMITTEE_LAYOUT.field(2).extract(self.packed_data)
    }

    pub fn size(&self) -> u64 {
        COMMITTEE_LAYOUT.field(3).extract(self.packed_data)
    }

    pub fn action_type(&self) -> CodecResult<CommitteeActionType> {
        CommitteeActionType::try_from(COMMITTEE_LAYOUT.field(4).extract(self.packed_data))
    }
}

impl Action for CommitteeAction {
    const KIND: ActionKind = ActionKind::Committee;
    const FIELD_COUNT: usize = 5;

    fn empty() -> Self {
        Self {
            packed_data: 0,
            member_key: Digest::ZERO,
        }
    }

    fn to_fields(&self) -> Vec<Felt> {
        FieldWriter::with_capacity(Self::FIELD_COUNT)
            .u64(self.packed_data)
            .digest(&self.member_key)
            .finish()
    }

    fn from_fields(fields: &[Felt]) -> CodecResult<Self> {
        let mut reader = FieldReader::new(Self::KIND.name(), fields, Self::FIELD_COUNT)?;
        let packed_data = reader.u64();
        COMMITTEE_LAYOUT.check_packed(packed_data)?;
        Ok(Self {
            packed_data,
            member_key: reader.digest(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accessors() {
        let action = CommitteeAction::create(3, 2, 5, Digest::from_u64(77));
        assert_eq!(action.committee_id(), 3);
        assert_eq!(action.member_id(), 0);
        assert_eq!(action.threshold(), 2);
        assert_eq!(action.size(), 5);
        assert_eq!(action.action_type().unwrap(), CommitteeActionType::Create);
    }

    #[test]
    fn test_join_accessors() {
        let action = CommitteeAction::join(63, 14, Digest::from_u64(1));
        assert_eq!(action.committee_id(), 63);
        assert_eq!(action.member_id(), 14);
        assert_eq!(action.action_type().unwrap(), CommitteeActionType::Join);
    }

    #[test]
    fn test_empty_action() {
        let empty = CommitteeAction::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.to_fields().len(), CommitteeAction::FIELD_COUNT);
    }

    #[test]
    fn test_fields_roundtrip() {
        let action = CommitteeAction::join(9, 4, Digest::from_limbs([1, 2, 3, 4]));
        let decoded = CommitteeAction::from_fields(&action.to_fields()).unwrap();
        assert_eq!(decoded, action);
    }

    #[test]
    fn test_unknown_type_tag() {
        let action = CommitteeAction {
            packed_data: COMMITTEE_LAYOUT.pack([1, 0, 0, 0, 3]),
            member_key: Digest::ZERO,
        };
        assert!(matches!(
            action.action_type(),
            Err(CodecError::UnknownTag { tag: 3, .. })
        ));
    }

    #[test]
    fn test_overflowing_member_id_is_truncated() {
        // 16 needs 5 bits; the 4-bit slot keeps only the low bits
        let action = CommitteeAction::join(1, 16, Digest::ZERO);
        assert_eq!(action.member_id(), 0);
        assert_eq!(action.committee_id(), 1);
    }
}
