//! Fuzz target for the action field codecs
//!
//! This target ensures:
//! 1. Decoding arbitrary field vectors never panics
//! 2. Anything that decodes is canonical and re-encodes to the same fields
//! 3. Unpacking arbitrary packed data agrees with the checked packer

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use dkg_rollup_actions::committee::COMMITTEE_LAYOUT;
use dkg_rollup_actions::request::REQUEST_LAYOUT;
use dkg_rollup_actions::{
    Action, CommitteeAction, ContributionAction, KeyAction, RequestAction, RequesterAction,
};
use dkg_rollup_primitives::{felt_from_u64, Felt};

#[derive(Debug, Arbitrary)]
struct CodecInput {
    /// Raw limbs, reduced into the field
    fields: Vec<u64>,
    /// Packed data to split and rebuild
    packed: u64,
}

fn check<A: Action>(fields: &[Felt]) {
    if let Ok(action) = A::from_fields(fields) {
        let encoded = action.to_fields();
        assert_eq!(encoded.len(), A::FIELD_COUNT);
        assert_eq!(action.check_canonical(), Ok(()));
        assert_eq!(A::from_fields(&encoded).ok(), Some(action));
    }
}

fuzz_target!(|input: CodecInput| {
    let fields: Vec<Felt> = input.fields.iter().copied().map(felt_from_u64).collect();

    check::<CommitteeAction>(&fields);
    check::<KeyAction>(&fields);
    check::<ContributionAction>(&fields);
    check::<RequestAction>(&fields);
    check::<RequesterAction>(&fields);

    let values = COMMITTEE_LAYOUT.unpack(input.packed);
    let repacked = COMMITTEE_LAYOUT.checked_pack(values).expect("unpacked values fit");
    if COMMITTEE_LAYOUT.check_packed(input.packed).is_ok() {
        assert_eq!(repacked, input.packed);
    }

    let values = REQUEST_LAYOUT.unpack(input.packed);
    assert_eq!(REQUEST_LAYOUT.unpack(REQUEST_LAYOUT.pack(values)), values);
});
