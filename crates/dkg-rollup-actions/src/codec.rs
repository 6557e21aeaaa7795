//! Fixed-width bit packing
//!
//! A `BitLayout` lists named sub-fields most-significant first. Packing shifts
//! each value in after the previous one, so the first field lands in the
//! highest bits. Accessors slice the same ranges back out.
//!
//! `pack` masks every value to its width and never fails. A value that does
//! not fit is silently truncated; use `checked_pack` or `validate` when the
//! inputs are not already range-checked.

use serde::{Deserialize, Deserializer};

use dkg_rollup_primitives::{felt_from_u64, felt_to_u64, Digest, Felt};

use crate::error::{CodecError, CodecResult};
use crate::group::GroupElement;

/// Bits needed to store values of a domain with `cardinality` members:
/// `floor(log2(cardinality)) + 1`, and 0 for an empty domain.
pub const fn bits_for(cardinality: u64) -> u32 {
    u64::BITS - cardinality.leading_zeros()
}

/// A contiguous bit range inside packed data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Offset of the least-significant bit
    pub offset: u32,
    /// Width in bits
    pub width: u32,
}

impl BitField {
    pub const fn mask(&self) -> u64 {
        if self.width >= u64::BITS {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u64 {
        self.mask()
    }

    pub const fn fits(&self, value: u64) -> bool {
        value <= self.mask()
    }

    /// Slice this field out of packed data
    pub const fn extract(&self, packed: u64) -> u64 {
        (packed >> self.offset) & self.mask()
    }
}

/// Named sub-fields, most significant first
#[derive(Debug, Clone, Copy)]
pub struct BitLayout<const N: usize> {
    names: [&'static str; N],
    widths: [u32; N],
}

impl<const N: usize> BitLayout<N> {
    pub const fn new(names: [&'static str; N], widths: [u32; N]) -> Self {
        Self { names, widths }
    }

    /// Sum of all sub-field widths
    pub const fn total_width(&self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < N {
            total += self.widths[i];
            i += 1;
        }
        total
    }

    /// Bit range of the sub-field at `position`
    pub const fn field(&self, position: usize) -> BitField {
        let mut offset = 0;
        let mut i = N;
        while i > position + 1 {
            i -= 1;
            offset += self.widths[i];
        }
        BitField {
            offset,
            width: self.widths[position],
        }
    }

    pub fn name(&self, position: usize) -> &'static str {
        self.names[position]
    }

    /// Concatenate sub-fields, truncating any that overflow their width
    pub fn pack(&self, values: [u64; N]) -> u64 {
        let mut packed = 0u64;
        for (position, value) in values.into_iter().enumerate() {
            let field = self.field(position);
            packed = packed.checked_shl(field.width).unwrap_or(0) | (value & field.mask());
        }
        packed
    }

    /// Reject any sub-field that does not fit its width
    pub fn validate(&self, values: &[u64; N]) -> CodecResult<()> {
        for (position, &value) in values.iter().enumerate() {
            let field = self.field(position);
            if !field.fits(value) {
                return Err(CodecError::FieldOverflow {
                    field: self.names[position],
                    value,
                    width: field.width,
                });
            }
        }
        Ok(())
    }

    /// `pack` after `validate`
    pub fn checked_pack(&self, values: [u64; N]) -> CodecResult<u64> {
        self.validate(&values)?;
        Ok(self.pack(values))
    }

    /// Split packed data back into sub-fields
    pub fn unpack(&self, packed: u64) -> [u64; N] {
        let mut values = [0u64; N];
        for (position, value) in values.iter_mut().enumerate() {
            *value = self.field(position).extract(packed);
        }
        values
    }

    /// Reject packed data with bits set above the layout
    pub fn check_packed(&self, packed: u64) -> CodecResult<()> {
        let width = self.total_width();
        if width < u64::BITS && packed >> width != 0 {
            return Err(CodecError::PackedOverflow { packed, width });
        }
        Ok(())
    }
}

/// Sequential reader over an action's field encoding
pub(crate) struct FieldReader<'a> {
    fields: &'a [Felt],
    position: usize,
}

impl<'a> FieldReader<'a> {
    /// Fails unless `fields` has exactly `expected` elements
    pub(crate) fn new(kind: &'static str, fields: &'a [Felt], expected: usize) -> CodecResult<Self> {
        if fields.len() != expected {
            return Err(CodecError::FieldCount {
                kind,
                expected,
                actual: fields.len(),
            });
        }
        Ok(Self {
            fields,
            position: 0,
        })
    }

    fn next(&mut self) -> Felt {
        let felt = self.fields[self.position];
        self.position += 1;
        felt
    }

    pub(crate) fn u64(&mut self) -> u64 {
        felt_to_u64(self.next())
    }

    pub(crate) fn digest(&mut self) -> Digest {
        Digest::from_felts([self.next(), self.next(), self.next(), self.next()])
    }

    pub(crate) fn group(&mut self) -> GroupElement {
        GroupElement::from_felts(self.next(), self.next())
    }
}

/// Representative of `value` in the field
pub(crate) fn canonical_u64(value: u64) -> u64 {
    felt_to_u64(felt_from_u64(value))
}

pub(crate) fn deserialize_canonical_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(canonical_u64)
}

/// Sequential writer producing an action's field encoding
#[derive(Default)]
pub(crate) struct FieldWriter {
    fields: Vec<Felt>,
}

impl FieldWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn u64(mut self, value: u64) -> Self {
        self.fields.push(felt_from_u64(value));
        self
    }

    pub(crate) fn digest(mut self, digest: &Digest) -> Self {
        self.fields.extend_from_slice(&digest.to_felts());
        self
    }

    pub(crate) fn group(mut self, point: &GroupElement) -> Self {
        self.fields.extend_from_slice(&point.to_felts());
        self
    }

    pub(crate) fn finish(self) -> Vec<Felt> {
        self.fields
    }
}
