//! Protocol instance limits and the sub-field widths derived from them.
//!
//! Each width is `floor(log2(N)) + 1` for the limit `N` of its domain. Changing
//! any of these is a protocol-breaking change: every packed action and every
//! storage index derived from them changes with it.

use crate::codec::bits_for;

/// Maximum number of committees
pub const MAX_COMMITTEES: u64 = 64;

/// Maximum number of members in one committee
pub const MAX_MEMBERS: u64 = 15;

/// Maximum number of keys generated by one committee
pub const MAX_KEYS: u64 = 64;

/// Maximum number of decryption requests
pub const MAX_REQUESTS: u64 = 4096;

/// Maximum number of requesters contributing to one request
pub const MAX_REQUESTERS: u64 = 256;

pub const COMMITTEE_ID_BITS: u32 = bits_for(MAX_COMMITTEES);
pub const MEMBER_ID_BITS: u32 = bits_for(MAX_MEMBERS);
pub const KEY_ID_BITS: u32 = bits_for(MAX_KEYS);
pub const REQUEST_ID_BITS: u32 = bits_for(MAX_REQUESTS);
pub const REQUESTER_INDEX_BITS: u32 = bits_for(MAX_REQUESTERS);

/// Block-number deadlines are stored as 32-bit values
pub const DEADLINE_BITS: u32 = 32;

/// Global key index: committee id in the high bits, key id in the low bits
pub fn key_index(committee_id: u64, key_id: u64) -> u64 {
    (committee_id << KEY_ID_BITS) | (key_id & ((1 << KEY_ID_BITS) - 1))
}

/// Inverse of [`key_index`]
pub fn split_key_index(index: u64) -> (u64, u64) {
    (index >> KEY_ID_BITS, index & ((1 << KEY_ID_BITS) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(COMMITTEE_ID_BITS, 7);
        assert_eq!(MEMBER_ID_BITS, 4);
        assert_eq!(KEY_ID_BITS, 7);
        assert_eq!(REQUEST_ID_BITS, 13);
        assert_eq!(REQUESTER_INDEX_BITS, 9);
    }

    #[test]
    fn test_key_index_roundtrip() {
        let index = key_index(5, 17);
        assert_eq!(split_key_index(index), (5, 17));
    }
}
