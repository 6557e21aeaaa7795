//! The common shape of every action family

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dkg_rollup_primitives::{hash_fields, Digest, Domain, Felt};

use crate::committee::CommitteeAction;
use crate::contribution::ContributionAction;
use crate::error::{CodecError, CodecResult};
use crate::key::KeyAction;
use crate::request::RequestAction;
use crate::requester::RequesterAction;

/// Action family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Committee,
    Key,
    Contribution,
    Request,
    Requester,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Committee => "committee",
            ActionKind::Key => "key",
            ActionKind::Contribution => "contribution",
            ActionKind::Request => "request",
            ActionKind::Requester => "requester",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable action record dispatched by a contract method.
///
/// The field encoding is fixed per family: packed data first, then the
/// payload slots in declaration order. The hash chain and every rollup step
/// consume this encoding, so it must never change for a deployed family.
pub trait Action:
    Clone + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Family tag
    const KIND: ActionKind;

    /// Number of field elements in the encoding
    const FIELD_COUNT: usize;

    /// All-zero padding action
    fn empty() -> Self;

    /// Field encoding consumed by the hash chain
    fn to_fields(&self) -> Vec<Felt>;

    /// Decode a field encoding, rejecting wrong lengths and out-of-layout packed data
    fn from_fields(fields: &[Felt]) -> CodecResult<Self>;

    /// Hash of the field encoding
    fn hash(&self) -> Digest {
        hash_fields(Domain::Action, &self.to_fields())
    }

    fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Reject values decoded without the codec's checks, such as packed data
    /// wider than the layout or coordinates outside the field
    fn check_canonical(&self) -> CodecResult<()> {
        if Self::from_fields(&self.to_fields())? == *self {
            Ok(())
        } else {
            Err(CodecError::NonCanonical {
                kind: Self::KIND.name(),
            })
        }
    }
}

/// Entry in the action family registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRegistryEntry {
    pub name: &'static str,
    pub kind: ActionKind,
    pub field_count: usize,
}

/// Every action family the engine can roll up
pub const ACTION_REGISTRY: [ActionRegistryEntry; 5] = [
    ActionRegistryEntry {
        name: "committee",
        kind: ActionKind::Committee,
        field_count: <CommitteeAction as Action>::FIELD_COUNT,
    },
    ActionRegistryEntry {
        name: "key",
        kind: ActionKind::Key,
        field_count: <KeyAction as Action>::FIELD_COUNT,
    },
    ActionRegistryEntry {
        name: "contribution",
        kind: ActionKind::Contribution,
        field_count: <ContributionAction as Action>::FIELD_COUNT,
    },
    ActionRegistryEntry {
        name: "request",
        kind: ActionKind::Request,
        field_count: <RequestAction as Action>::FIELD_COUNT,
    },
    ActionRegistryEntry {
        name: "requester",
        kind: ActionKind::Requester,
        field_count: <RequesterAction as Action>::FIELD_COUNT,
    },
];

/// Look up a registry entry by family name
pub fn registry_entry(name: &str) -> Option<&'static ActionRegistryEntry> {
    ACTION_REGISTRY.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_match_kinds() {
        for entry in ACTION_REGISTRY.iter() {
            assert_eq!(entry.name, entry.kind.name());
        }
    }

    #[test]
    fn test_check_canonical() {
        let join = CommitteeAction::join(1, 1, Digest::from_u64(3));
        assert_eq!(join.check_canonical(), Ok(()));

        let wide = CommitteeAction {
            packed_data: 1 << 60,
            ..join
        };
        assert!(matches!(
            wide.check_canonical(),
            Err(CodecError::PackedOverflow { .. })
        ));

        let mut key = KeyAction::empty();
        key.public_key.x = u64::MAX;
        assert_eq!(
            key.check_canonical(),
            Err(CodecError::NonCanonical { kind: "key" })
        );
    }

    #[test]
    fn test_registry_lookup() {
        let entry = registry_entry("request").unwrap();
        assert_eq!(entry.kind, ActionKind::Request);
        assert_eq!(entry.field_count, 10);
        assert!(registry_entry("unknown").is_none());
    }
}
