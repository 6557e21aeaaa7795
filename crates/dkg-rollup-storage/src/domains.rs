//! Storage configurations for the DKG domains
//!
//! Each domain storage is a generic storage instantiated with one of these
//! codecs. Indices come straight from packed action sub-fields, so every
//! shape is sized to the bit width of the sub-field it is addressed by.

use serde::{Deserialize, Serialize};

use dkg_rollup_actions::limits::{
    key_index, COMMITTEE_ID_BITS, KEY_ID_BITS, MEMBER_ID_BITS, REQUEST_ID_BITS,
};
use dkg_rollup_actions::{ContributionRound, GroupElement};
use dkg_rollup_primitives::{felt_from_u64, hash_digests, hash_fields, Digest, Domain, Felt};

use crate::codec::{LeafCodec, TwoLevelCodec};
use crate::one_level::OneLevelStorage;
use crate::shape::TreeShape;
use crate::two_level::TwoLevelStorage;

const COMMITTEE_SHAPE: TreeShape = TreeShape::for_bits(COMMITTEE_ID_BITS);
const MEMBER_SHAPE: TreeShape = TreeShape::for_bits(MEMBER_ID_BITS);
const KEY_INDEX_SHAPE: TreeShape = TreeShape::for_bits(COMMITTEE_ID_BITS + KEY_ID_BITS);
const REQUEST_SHAPE: TreeShape = TreeShape::for_bits(REQUEST_ID_BITS);

/// Committee key address: committee id and key id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId {
    pub committee_id: u64,
    pub key_id: u64,
}

impl KeyId {
    pub fn new(committee_id: u64, key_id: u64) -> Self {
        Self {
            committee_id,
            key_id,
        }
    }

    pub fn index(&self) -> u64 {
        key_index(self.committee_id, self.key_id)
    }
}

// ============================================================================
// Committee settings and members
// ============================================================================

/// Threshold and size fixed when a committee is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeSetting {
    pub threshold: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingCodec;

impl LeafCodec for SettingCodec {
    type Key = u64;
    type Value = CommitteeSetting;

    fn shape(&self) -> TreeShape {
        COMMITTEE_SHAPE
    }

    fn calculate_index(&self, committee_id: &u64) -> u64 {
        *committee_id
    }

    fn calculate_leaf(&self, setting: &CommitteeSetting) -> Digest {
        hash_fields(
            Domain::CommitteeSetting,
            &[felt_from_u64(setting.threshold), felt_from_u64(setting.size)],
        )
    }
}

/// Committee id -> member id -> member public key hash
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberCodec;

impl TwoLevelCodec for MemberCodec {
    type Level1Key = u64;
    type Level2Key = u64;
    type Value = Digest;

    fn level1_shape(&self) -> TreeShape {
        COMMITTEE_SHAPE
    }

    fn level2_shape(&self) -> TreeShape {
        MEMBER_SHAPE
    }

    fn calculate_level1_index(&self, committee_id: &u64) -> u64 {
        *committee_id
    }

    fn calculate_level2_index(&self, member_id: &u64) -> u64 {
        *member_id
    }

    fn calculate_leaf(&self, member_key: &Digest) -> Digest {
        hash_digests(Domain::Member, &[*member_key])
    }
}

// ============================================================================
// Keys
// ============================================================================

/// Lifecycle of a committee key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum KeyStatus {
    Empty = 0,
    RoundOneContribution = 1,
    RoundTwoContribution = 2,
    Active = 3,
    Deprecated = 4,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyStatusCodec;

impl LeafCodec for KeyStatusCodec {
    type Key = KeyId;
    type Value = KeyStatus;

    fn shape(&self) -> TreeShape {
        KEY_INDEX_SHAPE
    }

    fn calculate_index(&self, key: &KeyId) -> u64 {
        key.index()
    }

    /// The status value itself, so `Empty` is the default leaf
    fn calculate_leaf(&self, status: &KeyStatus) -> Digest {
        Digest::from_u64(*status as u64)
    }
}

/// Key index -> generated public key
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyCodec;

impl LeafCodec for KeyCodec {
    type Key = KeyId;
    type Value = GroupElement;

    fn shape(&self) -> TreeShape {
        KEY_INDEX_SHAPE
    }

    fn calculate_index(&self, key: &KeyId) -> u64 {
        key.index()
    }

    fn calculate_leaf(&self, public_key: &GroupElement) -> Digest {
        public_key.hash()
    }
}

// ============================================================================
// Contributions
// ============================================================================

/// Payload of a stored contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub commitment: GroupElement,
    pub encryption: GroupElement,
    pub share_hash: Digest,
}

/// Key index -> member id -> contribution, one storage per round
#[derive(Debug, Clone, Copy)]
pub struct ContributionCodec {
    pub round: ContributionRound,
}

impl ContributionCodec {
    pub fn new(round: ContributionRound) -> Self {
        Self { round }
    }
}

impl TwoLevelCodec for ContributionCodec {
    type Level1Key = KeyId;
    type Level2Key = u64;
    type Value = Contribution;

    fn level1_shape(&self) -> TreeShape {
        KEY_INDEX_SHAPE
    }

    fn level2_shape(&self) -> TreeShape {
        MEMBER_SHAPE
    }

    fn calculate_level1_index(&self, key: &KeyId) -> u64 {
        key.index()
    }

    fn calculate_level2_index(&self, member_id: &u64) -> u64 {
        *member_id
    }

    fn calculate_leaf(&self, contribution: &Contribution) -> Digest {
        let mut inputs: Vec<Felt> = Vec::with_capacity(9);
        inputs.push(felt_from_u64(self.round as u64));
        inputs.extend_from_slice(&contribution.commitment.to_felts());
        inputs.extend_from_slice(&contribution.encryption.to_felts());
        inputs.extend_from_slice(&contribution.share_hash.to_felts());
        hash_fields(Domain::Contribution, &inputs)
    }
}

// ============================================================================
// Requests and responses
// ============================================================================

/// Stored state of a decryption request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub key_index: u64,
    pub task: Digest,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCodec;

impl LeafCodec for RequestCodec {
    type Key = u64;
    type Value = RequestRecord;

    fn shape(&self) -> TreeShape {
        REQUEST_SHAPE
    }

    fn calculate_index(&self, request_id: &u64) -> u64 {
        *request_id
    }

    fn calculate_leaf(&self, request: &RequestRecord) -> Digest {
        let mut inputs: Vec<Felt> = Vec::with_capacity(6);
        inputs.push(felt_from_u64(request.key_index));
        inputs.extend_from_slice(&request.task.to_felts());
        inputs.push(felt_from_u64(request.deadline));
        hash_fields(Domain::Request, &inputs)
    }
}

/// Request id -> member id -> response contribution hash
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCodec;

impl TwoLevelCodec for ResponseCodec {
    type Level1Key = u64;
    type Level2Key = u64;
    type Value = Digest;

    fn level1_shape(&self) -> TreeShape {
        REQUEST_SHAPE
    }

    fn level2_shape(&self) -> TreeShape {
        MEMBER_SHAPE
    }

    fn calculate_level1_index(&self, request_id: &u64) -> u64 {
        *request_id
    }

    fn calculate_level2_index(&self, member_id: &u64) -> u64 {
        *member_id
    }

    fn calculate_leaf(&self, response: &Digest) -> Digest {
        hash_digests(Domain::Response, &[*response])
    }
}

pub type SettingStorage = OneLevelStorage<SettingCodec>;
pub type MemberStorage = TwoLevelStorage<MemberCodec>;
pub type KeyStatusStorage = OneLevelStorage<KeyStatusCodec>;
pub type KeyStorage = OneLevelStorage<KeyCodec>;
pub type ContributionStorage = TwoLevelStorage<ContributionCodec>;
pub type RequestStorage = OneLevelStorage<RequestCodec>;
pub type ResponseStorage = TwoLevelStorage<ResponseCodec>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_cover_packed_widths() {
        assert_eq!(SettingCodec.shape().height(), 7);
        assert_eq!(MemberCodec.level2_shape().height(), 4);
        assert_eq!(KeyStatusCodec.shape().height(), 14);
        assert_eq!(RequestCodec.shape().height(), 13);
        assert!(KeyStatusCodec.shape().contains(KeyId::new(64, 64).index()));
    }

    #[test]
    fn test_setting_storage() {
        let mut storage = SettingStorage::new(SettingCodec);
        let setting = CommitteeSetting {
            threshold: 2,
            size: 3,
        };
        let root = storage.insert(&1, &setting).unwrap();
        let witness = storage.witness(1).unwrap();
        assert_eq!(witness.calculate_root(storage.calculate_leaf(&setting)), root);
        assert!(storage.is_consistent());
    }

    #[test]
    fn test_member_storage() {
        let mut storage = MemberStorage::new(MemberCodec);
        storage.insert(&1, &0, &Digest::from_u64(10)).unwrap();
        storage.insert(&1, &1, &Digest::from_u64(11)).unwrap();
        let leaf = storage.calculate_leaf(&Digest::from_u64(11));
        assert!(storage.witness(1, 1).unwrap().verify(&storage.root(), leaf));
        assert!(storage.is_consistent());
    }

    #[test]
    fn test_key_status_empty_is_default() {
        let mut storage = KeyStatusStorage::new(KeyStatusCodec);
        let empty_root = storage.root();
        let key = KeyId::new(2, 5);
        storage.insert(&key, &KeyStatus::Active).unwrap();
        assert_ne!(storage.root(), empty_root);
        storage.insert(&key, &KeyStatus::Empty).unwrap();
        assert_eq!(storage.root(), empty_root);
    }

    #[test]
    fn test_key_storage() {
        let mut storage = KeyStorage::new(KeyCodec);
        let key = KeyId::new(1, 0);
        let public_key = GroupElement::new(3, 4);
        storage.insert(&key, &public_key).unwrap();
        assert_eq!(storage.leaf(key.index()).unwrap(), public_key.hash());
    }

    #[test]
    fn test_contribution_round_separates_leaves() {
        let contribution = Contribution {
            commitment: GroupElement::new(1, 2),
            encryption: GroupElement::new(3, 4),
            share_hash: Digest::from_u64(5),
        };
        let round1 = ContributionCodec::new(ContributionRound::Round1);
        let round2 = ContributionCodec::new(ContributionRound::Round2);
        assert_ne!(
            round1.calculate_leaf(&contribution),
            round2.calculate_leaf(&contribution)
        );

        let mut storage = ContributionStorage::new(round1);
        storage.insert(&KeyId::new(1, 1), &3, &contribution).unwrap();
        assert!(storage.is_consistent());
    }

    #[test]
    fn test_request_and_response_storage() {
        let mut requests = RequestStorage::new(RequestCodec);
        let record = RequestRecord {
            key_index: KeyId::new(1, 0).index(),
            task: Digest::from_u64(77),
            deadline: 1_000,
        };
        requests.insert(&4095, &record).unwrap();
        assert!(requests.is_consistent());

        let mut responses = ResponseStorage::new(ResponseCodec);
        responses.insert(&4095, &2, &Digest::from_u64(1)).unwrap();
        assert!(responses.witness(4095, 2).is_ok());
        assert!(responses.witness(4094, 2).is_err());
    }
}
