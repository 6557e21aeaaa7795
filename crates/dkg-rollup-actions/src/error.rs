//! Error types for action encoding

use thiserror::Error;

/// Errors raised by the checked codec paths.
///
/// The plain `pack` functions never return these: they truncate silently, and
/// callers that care must go through `checked_pack`/`validate` first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A sub-field value does not fit its bit width
    #[error("field `{field}` value {value} exceeds {width}-bit width")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: u32,
    },

    /// Packed data carries bits above the layout's total width
    #[error("packed data {packed:#x} exceeds {width}-bit layout")]
    PackedOverflow { packed: u64, width: u32 },

    /// Unknown discriminant for a tagged sub-field
    #[error("unknown {field} tag {tag}")]
    UnknownTag { field: &'static str, tag: u64 },

    /// Value does not survive its own field encoding unchanged
    #[error("{kind} action is not in canonical form")]
    NonCanonical { kind: &'static str },

    /// Field encoding has the wrong number of elements
    #[error("{kind} action expects {expected} fields, got {actual}")]
    FieldCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
