//! Request actions: opening, resolving and aborting a decryption request.
//!
//! Request actions lead with a 32-bit block-number deadline, the only family
//! to do so. Packed layout (MSB first):
//!
//! | deadline | request_id | action_type |
//! |----------|------------|-------------|
//! | 32       | 13         | 2           |

use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{Digest, Felt};

use crate::action::{Action, ActionKind};
use crate::codec::{
    bits_for, canonical_u64, deserialize_canonical_u64, BitLayout, FieldReader, FieldWriter,
};
use crate::error::{CodecError, CodecResult};
use crate::limits::{DEADLINE_BITS, REQUEST_ID_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u64)]
pub enum RequestActionType {
    Initialize = 0,
    Resolve = 1,
    Abort = 2,
}

impl RequestActionType {
    pub const COUNT: u64 = 3;
}

impl TryFrom<u64> for RequestActionType {
    type Error = CodecError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Initialize),
            1 => Ok(Self::Resolve),
            2 => Ok(Self::Abort),
            _ => Err(CodecError::UnknownTag {
                field: "request action type",
                tag,
            }),
        }
    }
}

pub const REQUEST_LAYOUT: BitLayout<3> = BitLayout::new(
    ["deadline", "request_id", "action_type"],
    [
        DEADLINE_BITS,
        REQUEST_ID_BITS,
        bits_for(RequestActionType::COUNT),
    ],
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAction {
    pub packed_data: u64,
    /// Global index of the key the ciphertexts were encrypted under
    #[serde(deserialize_with = "deserialize_canonical_u64")]
    pub key_index: u64,
    /// Requester task commitment
    pub task: Digest,
    /// Hash of the decryption result (`Resolve` only)
    pub result: Digest,
}

impl RequestAction {
    pub fn pack(deadline: u64, request_id: u64, action_type: RequestActionType) -> u64 {
        REQUEST_LAYOUT.pack([deadline, request_id, action_type as u64])
    }

    pub fn initialize(request_id: u64, deadline: u64, key_index: u64, task: Digest) -> Self {
        Self {
            packed_data: Self::pack(deadline, request_id, RequestActionType::Initialize),
            key_index: canonical_u64(key_index),
            task,
            result: Digest::ZERO,
        }
    }

    pub fn resolve(request_id: u64, key_index: u64, task: Digest, result: Digest) -> Self {
        Self {
            packed_data: Self::pack(0, request_id, RequestActionType::Resolve),
            key_index: canonical_u64(key_index),
            task,
            result,
        }
    }

    pub fn abort(request_id: u64, key_index: u64, task: Digest) -> Self {
        Self {
            packed_data: Self::pack(0, request_id, RequestActionType::Abort),
            key_index: canonical_u64(key_index),
            task,
            result: Digest::ZERO,
        }
    }

    pub fn deadline(&self) -> u64 {
        REQUEST_LAYOUT.field(0).extract(self.packed_data)
    }

    pub fn request_id(&self) -> u64 {
        REQUEST_LAYOUT.field(1).extract(self.packed_data)
    }

    pub fn action_type(&self) -> CodecResult<RequestActionType> {
        RequestActionType::try_from(REQUEST_LAYOUT.field(2).extract(self.packed_data))
    }
}

impl Action for RequestAction {
    const KIND: ActionKind = ActionKind::Request;
    const FIELD_COUNT: usize = 10;

    fn empty() -> Self {
        Self {
            packed_data: 0,
            key_index: 0,
            task: Digest::ZERO,
            result: Digest::ZERO,
        }
    }

    fn to_fields(&self) -> Vec<Felt> {
        FieldWriter::with_capacity(Self::FIELD_COUNT)
            .u64(self.packed_data)
            .u64(self.key_index)
            .digest(&self.task)
            .digest(&self.result)
            .finish()
    }

    fn from_fields(fields: &[Felt]) -> CodecResult<Self> {
        let mut reader = FieldReader::new(Self::KIND.name(), fields, Self::FIELD_COUNT)?;
        let packed_data = reader.u64();
        REQUEST_LAYOUT.check_packed(packed_data)?;
        Ok(Self {
            packed_data,
            key_index: reader.u64(),
            task: reader.digest(),
            result: reader.digest(),
        })
    }
}
