//! Field arithmetic using Winterfell's BaseElement (Goldilocks 64-bit prime field)
//!
//! The Goldilocks field is defined by the prime p = 2^64 - 2^32 + 1. Packed
//! action data always stays below 2^63, so it is represented without reduction.

use winter_math::fields::f64::BaseElement;
use winter_math::FieldElement;

/// The field element type used throughout the rollup engine
pub type Felt = BaseElement;

/// Zero in the field
pub const FELT_ZERO: Felt = BaseElement::ZERO;

/// One in the field
pub const FELT_ONE: Felt = BaseElement::ONE;

/// The Goldilocks prime: p = 2^64 - 2^32 + 1
pub const GOLDILOCKS_PRIME: u64 = 0xFFFF_FFFF_0000_0001;

/// Convert a u64 to a field element (reduced mod p)
#[inline]
pub fn felt_from_u64(value: u64) -> Felt {
    BaseElement::new(value)
}

/// Convert a field element to its canonical u64 representative
#[inline]
pub fn felt_to_u64(felt: Felt) -> u64 {
    felt.as_int()
}

/// Encode a boolean flag as 0 or 1
#[inline]
pub fn felt_from_bool(flag: bool) -> Felt {
    if flag {
        FELT_ONE
    } else {
        FELT_ZERO
    }
}

/// Convert a slice of canonical u64 values to field elements
pub fn felts_from_u64s(values: &[u64]) -> Vec<Felt> {
    values.iter().copied().map(felt_from_u64).collect()
}
