//! Contribution actions: round-1 commitments, round-2 encrypted shares and
//! decryption responses submitted by committee members.
//!
//! Packed layout (MSB first):
//!
//! | committee_id | key_id | member_id | round |
//! |--------------|--------|-----------|-------|
//! | 7            | 7      | 4         | 2     |

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{Digest, Felt};

use crate::action::{Action, ActionKind};
use crate::codec::{bits_for, BitLayout, FieldReader, FieldWriter};
use crate::error::{CodecError, CodecResult};
use crate::group::GroupElement;
use crate::limits::{key_index, COMMITTEE_ID_BITS, KEY_ID_BITS, MEMBER_ID_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum ContributionRound {
    Round1 = 0,
    Round2 = 1,
    Response = 2,
}

impl ContributionRound {
    pub const COUNT: u64 = 3;
}

impl TryFrom<u64> for ContributionRound {
    type Error = CodecError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Round1),
            1 => Ok(Self::Round2),
            2 => Ok(Self::Response),
            _ => Err(CodecError::UnknownTag {
                field: "contribution round",
                tag,
            }),
        }
    }
}

pub const CONTRIBUTION_LAYOUT: BitLayout<4> = BitLayout::new(
    ["committee_id", "key_id", "member_id", "round"],
    [
        COMMITTEE_ID_BITS,
        KEY_ID_BITS,
        MEMBER_ID_BITS,
        bits_for(ContributionRound::COUNT),
    ],
);

/// A member's contribution to one round of key generation or decryption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionAction {
    pub packed_data: u64,
    /// Polynomial commitment (round 1) or partial decryption (response)
    pub commitment: GroupElement,
    /// Ephemeral encryption point of the encrypted shares (round 2)
    pub encryption: GroupElement,
    /// Hash of the encrypted share vector
    pub share_hash: Digest,
}

impl ContributionAction {
    pub fn pack(committee_id: u64, key_id: u64, member_id: u64, round: ContributionRound) -> u64 {
        CONTRIBUTION_LAYOUT.pack([committee_id, key_id, member_id, round as u64])
    }

    pub fn new(
        committee_id: u64,
        key_id: u64,
        member_id: u64,
        round: ContributionRound,
        commitment: GroupElement,
        encryption: GroupElement,
        share_hash: Digest,
    ) -> Self {
        Self {
            packed_data: Self::pack(committee_id, key_id, member_id, round),
            commitment,
            encryption,
            share_hash,
        }
    }

    pub fn committee_id(&self) -> u64 {
        CONTRIBUTION_LAYOUT.field(0).extract(self.packed_data)
    }

    pub fn key_id(&self) -> u64 {
        CONTRIBUTION_LAYOUT.field(1).extract(self.packed_data)
    }

    pub fn member_id(&self) -> u64 {
        CONTRIBUTION_LAYOUT.field(2).extract(self.packed_data)
    }

    pub fn round(&self) -> CodecResult<ContributionRound> {
        ContributionRound::try_from(CONTRIBUTION_LAYOUT.field(3).extract(self.packed_data))
    }

    pub fn key_index(&self) -> u64 {
        key_index(self.committee_id(), self.key_id())
    }
}

impl Action for ContributionAction {
    const KIND: ActionKind = ActionKind::Contribution;
    const FIELD_COUNT: usize = 9;

    fn empty() -> Self {
        Self {
            packed_data: 0,
            commitment: GroupElement::ZERO,
            encryption: GroupElement::ZERO,
            share_hash: Digest::ZERO,
        }
    }

    fn to_fields(&self) -> Vec<Felt> {
        FieldWriter::with_capacity(Self::FIELD_COUNT)
            .u64(self.packed_data)
            .group(&self.commitment)
            .group(&self.encryption)
            .digest(&self.share_hash)
            .finish()
    }

    fn from_fields(fields: &[Felt]) -> CodecResult<Self> {
        let mut reader = FieldReader::new(Self::KIND.name(), fields, Self::FIELD_COUNT)?;
        let packed_data = reader.u64();
        CONTRIBUTION_LAYOUT.check_packed(packed_data)?;
        Ok(Self {
            packed_data,
            commitment: reader.group(),
            encryption: reader.group(),
            share_hash: reader.digest(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(round: ContributionRound) -> ContributionAction {
        ContributionAction::new(
            2,
            9,
            4,
            round,
            GroupElement::new(1, 2),
            GroupElement::new(3, 4),
            Digest::from_limbs([5, 6, 7, 8]),
        )
    }

    #[test]
    fn test_accessors() {
        let action = sample(ContributionRound::Round2);
        assert_eq!(action.committee_id(), 2);
        assert_eq!(action.key_id(), 9);
        assert_eq!(action.member_id(), 4);
        assert_eq!(action.round().unwrap(), ContributionRound::Round2);
    }

    #[test]
    fn test_fields_roundtrip() {
        let action = sample(ContributionRound::Response);
        assert_eq!(
            ContributionAction::from_fields(&action.to_fields()).unwrap(),
            action
        );
    }

    #[test]
    fn test_rounds_hash_differently() {
        assert_ne!(
            sample(ContributionRound::Round1).hash(),
            sample(ContributionRound::Round2).hash()
        );
    }
}
