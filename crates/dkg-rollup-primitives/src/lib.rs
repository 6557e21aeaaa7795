//! DKG Rollup Primitives
//!
//! Building blocks shared by every layer of the rollup engine:
//! - Field arithmetic over Winterfell's `BaseElement` (64-bit Goldilocks prime field)
//! - `Digest`, the four-limb output of the algebraic hash used for leaves, roots and action states
//! - Domain-separated Rescue-Prime hashing (`Rp64_256`)
//! - SHA-256 `Hash256` for byte-level commitments such as proof hashes

pub mod digest;
pub mod field;
pub mod hash;
pub mod rescue;

pub use digest::{Digest, DigestParseError};
pub use field::{felt_from_bool, felt_from_u64, felt_to_u64, Felt, FELT_ONE, FELT_ZERO};
pub use hash::Hash256;
pub use rescue::{hash_digests, hash_fields, hash_pair, Domain};
