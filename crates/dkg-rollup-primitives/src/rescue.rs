//! Domain-separated Rescue-Prime hashing
//!
//! All algebraic hashing goes through Winterfell's `Rp64_256` sponge (state
//! width 12, rate 8, capacity 4). Inputs are prefixed with a single domain tag
//! element so that, for example, a Merkle node can never collide with an
//! action-chain step that happens to hash the same eight limbs.

use winter_crypto::hashers::Rp64_256;
use winter_crypto::ElementHasher;

use crate::digest::Digest;
use crate::field::{felt_from_u64, Felt};

/// Hash domains. The discriminant is absorbed as the first sponge element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Domain {
    /// Hash of a single action's field encoding
    Action = 1,
    /// Running hash over the actions of one dispatched batch
    ActionBatch = 2,
    /// Folding a batch hash into the previous action state
    ActionChain = 3,
    /// Seed of the action hash chain
    ActionChainInit = 4,
    /// Internal sparse Merkle node
    MerkleNode = 5,
    /// Process/dedup leaf for a reprocessed action
    ProcessRecord = 6,
    /// Committee threshold/size setting leaf
    CommitteeSetting = 7,
    /// Committee member leaf
    Member = 8,
    /// Group element commitment leaf
    GroupElement = 9,
    /// Encrypted contribution leaf
    Contribution = 10,
    /// Decryption request leaf
    Request = 11,
    /// Response contribution leaf
    Response = 12,
    /// Proof backend transcript
    ProofTranscript = 13,
    /// Compiled program verification key
    VerificationKey = 14,
}

impl Domain {
    pub fn tag(self) -> Felt {
        felt_from_u64(self as u64)
    }
}

/// Hash field elements under a domain
pub fn hash_fields(domain: Domain, inputs: &[Felt]) -> Digest {
    let mut absorbed = Vec::with_capacity(inputs.len() + 1);
    absorbed.push(domain.tag());
    absorbed.extend_from_slice(inputs);

    let digest = Rp64_256::hash_elements(&absorbed);
    let elements = digest.as_elements();
    Digest::from_felts([elements[0], elements[1], elements[2], elements[3]])
}

/// Hash a sequence of digests under a domain
pub fn hash_digests(domain: Domain, digests: &[Digest]) -> Digest {
    let inputs: Vec<Felt> = digests.iter().flat_map(|d| d.to_felts()).collect();
    hash_fields(domain, &inputs)
}

/// Hash an ordered pair of digests under a domain
pub fn hash_pair(domain: Domain, left: &Digest, right: &Digest) -> Digest {
    hash_digests(domain, &[*left, *right])
}
