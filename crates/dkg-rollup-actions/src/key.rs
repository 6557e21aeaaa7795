//! Key actions: generating, contributing to, finalizing and deprecating a
//! committee's threshold key.
//!
//! Packed layout (MSB first):
//!
//! | committee_id | key_id | member_id | action_type |
//! |--------------|--------|-----------|-------------|
//! | 7            | 7      | 4         | 3           |

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::Felt;

use crate::action::{Action, ActionKind};
use crate::codec::{bits_for, BitLayout, FieldReader, FieldWriter};
use crate::error::{CodecError, CodecResult};
use crate::group::GroupElement;
use crate::limits::{key_index, COMMITTEE_ID_BITS, KEY_ID_BITS, MEMBER_ID_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum KeyActionType {
    Generate = 0,
    Contribute = 1,
    Finalize = 2,
    Deprecate = 3,
}

impl KeyActionType {
    pub const COUNT: u64 = 4;
}

impl TryFrom<u64> for KeyActionType {
    type Error = CodecError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Generate),
            1 => Ok(Self::Contribute),
            2 => Ok(Self::Finalize),
            3 => Ok(Self::Deprecate),
            _ => Err(CodecError::UnknownTag {
                field: "key action type",
                tag,
            }),
        }
    }
}

pub const KEY_LAYOUT: BitLayout<4> = BitLayout::new(
    ["committee_id", "key_id", "member_id", "action_type"],
    [
        COMMITTEE_ID_BITS,
        KEY_ID_BITS,
        MEMBER_ID_BITS,
        bits_for(KeyActionType::COUNT),
    ],
);

/// A key lifecycle action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAction {
    pub packed_data: u64,
    /// Member's public key share for `Contribute`, aggregate key for `Finalize`
    pub public_key: GroupElement,
}

impl KeyAction {
    pub fn pack(committee_id: u64, key_id: u64, member_id: u64, action_type: KeyActionType) -> u64 {
        KEY_LAYOUT.pack([committee_id, key_id, member_id, action_type as u64])
    }

    pub fn new(
        committee_id: u64,
        key_id: u64,
        member_id: u64,
        action_type: KeyActionType,
        public_key: GroupElement,
    ) -> Self {
        Self {
            packed_data: Self::pack(committee_id, key_id, member_id, action_type),
            public_key,
        }
    }

    pub fn committee_id(&self) -> u64 {
        KEY_LAYOUT.field(0).extract(self.packed_data)
    }

    pub fn key_id(&self) -> u64 {
        KEY_LAYOUT.field(1).extract(self.packed_data)
    }

    pub fn member_id(&self) -> u64 {
        KEY_LAYOUT.field(2).extract(self.packed_data)
    }

    pub fn action_type(&self) -> CodecResult<KeyActionType> {
        KeyActionType::try_from(KEY_LAYOUT.field(3).extract(self.packed_data))
    }

    /// Global key index of the key this action targets
    pub fn key_index(&self) -> u64 {
        key_index(self.committee_id(), self.key_id())
    }
}

impl Action for KeyAction {
    const KIND: ActionKind = ActionKind::Key;
    const FIELD_COUNT: usize = 3;

    fn empty() -> Self {
        Self {
            packed_data: 0,
            public_key: GroupElement::ZERO,
        }
    }

    fn to_fields(&self) -> Vec<Felt> {
        FieldWriter::with_capacity(Self::FIELD_COUNT)
            .u64(self.packed_data)
            .group(&self.public_key)
            .finish()
    }

    fn from_fields(fields: &[Felt]) -> CodecResult<Self> {
        let mut reader = FieldReader::new(Self::KIND.name(), fields, Self::FIELD_COUNT)?;
        let packed_data = reader.u64();
        KEY_LAYOUT.check_packed(packed_data)?;
        Ok(Self {
            packed_data,
            public_key: reader.group(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let action = KeyAction::new(12, 40, 7, KeyActionType::Finalize, GroupElement::new(5, 6));
        assert_eq!(action.committee_id(), 12);
        assert_eq!(action.key_id(), 40);
        assert_eq!(action.member_id(), 7);
        assert_eq!(action.action_type().unwrap(), KeyActionType::Finalize);
        assert_eq!(action.key_index(), key_index(12, 40));
    }

    #[test]
    fn test_fields_roundtrip() {
        let action = KeyAction::new(1, 2, 3, KeyActionType::Contribute, GroupElement::new(10, 20));
        assert_eq!(KeyAction::from_fields(&action.to_fields()).unwrap(), action);
    }

    #[test]
    fn test_from_fields_wrong_length() {
        let fields = KeyAction::empty().to_fields();
        assert!(matches!(
            KeyAction::from_fields(&fields[..2]),
            Err(CodecError::FieldCount { expected: 3, actual: 2, .. })
        ));
    }
}
