//! Fuzz target for rollup proof transport
//!
//! This target ensures:
//! 1. JSON and base64 decoding never panic on arbitrary input
//! 2. Verification never panics and rejects whatever decodes

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;

use dkg_rollup_actions::CommitteeAction;
use dkg_rollup_program::{RollupProgram, RollupProof, TranscriptBackend};
use dkg_rollup_storage::TreeShape;

type Program = RollupProgram<CommitteeAction, TranscriptBackend>;

fn program() -> &'static Program {
    static PROGRAM: OnceLock<Program> = OnceLock::new();
    PROGRAM.get_or_init(|| Program::compile(TranscriptBackend, TreeShape::FULL).expect("compile"))
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for decoded in [RollupProof::from_json(text), RollupProof::from_base64(text)] {
        if let Ok(proof) = decoded {
            let _ = proof.proof_hash();
            let _ = program().verify(&proof);
            let _ = proof.to_json();
        }
    }
});
