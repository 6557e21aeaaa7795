//! Fuzz target for Merkle witnesses
//!
//! This target ensures:
//! 1. Root and index recomputation never panic, whatever the path length
//! 2. The dedup guard rejects witnesses that do not fit the tree shape
//! 3. Witnesses read back from a tree always verify

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use dkg_rollup_primitives::Digest;
use dkg_rollup_storage::{MerkleWitness, ProcessStorage, SparseMerkleTree, TreeShape, WitnessNode};

#[derive(Debug, Arbitrary)]
struct WitnessInput {
    path: Vec<([u64; 4], bool)>,
    leaf: [u64; 4],
    height: u8,
    writes: Vec<(u64, u64)>,
    json: String,
}

fuzz_target!(|input: WitnessInput| {
    let path = input
        .path
        .iter()
        .map(|(limbs, is_left)| WitnessNode {
            sibling: Digest::from_limbs(*limbs),
            is_left: *is_left,
        })
        .collect();
    let witness = MerkleWitness::new(path);
    let leaf = Digest::from_limbs(input.leaf);
    let root = witness.calculate_root(leaf);
    assert!(witness.verify(&root, leaf));
    let index = witness.calculate_index();

    if let Ok(shape) = TreeShape::new(u32::from(input.height)) {
        if shape.check_witness(&witness).is_ok() {
            assert!(shape.contains(index));
        }

        let mut tree = SparseMerkleTree::new(shape);
        for (index, value) in input.writes.iter().take(32) {
            let index = index & shape.index_mask();
            let leaf = Digest::from_u64(*value);
            let root = tree.set_leaf(index, leaf).expect("masked index in range");
            assert!(tree.witness(index).expect("in range").verify(&root, leaf));
        }
    }

    let _ = ProcessStorage::process(index, 0, leaf, root, &witness);

    if let Ok(parsed) = serde_json::from_str::<MerkleWitness>(&input.json) {
        let _ = parsed.calculate_root(leaf);
        let _ = parsed.calculate_index();
    }
});
