//! Marshaling and ownership properties of the bridge, checked against the stub.
//!
//! These tests treat:
//! - input descriptors as **borrowed views**: same address, exact length, and
//!   no reference kept past the engine call, and
//! - result regions as **single-owner**: copied once, released exactly once,
//!   never released when the engine produced nothing.

use proptest::prelude::*;
use zkbridge_core::stub::{StubEngine, StubProof};
use zkbridge_core::{AlgorithmId, Bridge};

fn bridge_with(proof: StubProof) -> Bridge<StubEngine> {
    Bridge::new(StubEngine::new().proof(proof))
}

proptest! {
    /// Init descriptors point at the caller's buffers with their exact byte counts.
    #[test]
    fn init_descriptors_alias_inputs(
        id in any::<u8>(),
        pk in proptest::collection::vec(any::<u8>(), 0..512),
        r1cs in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let bridge = Bridge::new(StubEngine::new());
        let out = bridge.init_algorithm(AlgorithmId::new(id), &pk, &r1cs);
        prop_assert!(out.is_ready());

        bridge.with_engine(|e| {
            let call = &e.calls().inits[0];
            prop_assert_eq!(call.algorithm, id);
            prop_assert_eq!(call.proving_key, (pk.as_ptr() as usize, pk.len(), pk.len()));
            prop_assert_eq!(
                call.constraint_system,
                (r1cs.as_ptr() as usize, r1cs.len(), r1cs.len())
            );
            Ok(())
        })?;
    }

    /// A present region decodes to exactly its bytes and is released once, by address.
    #[test]
    fn present_region_copied_then_released_once(result in "[ -~]{1,256}") {
        let bridge = bridge_with(StubProof::bytes(result.clone()));
        let got = bridge.prove("{}");
        prop_assert_eq!(got.as_deref(), Some(result.as_str()));

        bridge.with_engine(|e| {
            let calls = e.calls();
            prop_assert_eq!(calls.allocated.len(), 1);
            prop_assert_eq!(&calls.released, &calls.allocated);
            prop_assert!(calls.bogus_releases.is_empty());
            prop_assert_eq!(e.outstanding(), 0);
            Ok(())
        })?;
    }

    /// Null or non-positive regions are absent and never released.
    #[test]
    fn degenerate_region_is_absent_and_unreleased(len in i64::MIN..=0i64) {
        let bridge = bridge_with(StubProof::Degenerate(len));
        prop_assert_eq!(bridge.prove("w"), None);
        bridge.with_engine(|e| {
            prop_assert!(e.calls().released.is_empty());
            Ok(())
        })?;
    }
}

#[test]
fn witness_is_not_referenced_after_the_call() {
    let bridge = bridge_with(StubProof::bytes("proof"));
    let mut witness = br#"{"cipher":"chacha20","nonce":[1,2,3]}"#.to_vec();
    let expected = witness.clone();

    assert_eq!(bridge.prove_bytes(&witness).as_deref(), Some("proof"));

    // The host is free to scribble over and drop its buffer right away.
    witness.fill(0);
    drop(witness);

    bridge.with_engine(|e| assert_eq!(e.calls().witnesses, vec![expected]));
}

#[test]
fn non_utf8_result_bytes_are_copied_lossily() {
    let bridge = bridge_with(StubProof::bytes(vec![b'o', b'k', 0xC3]));
    assert_eq!(bridge.prove("w").as_deref(), Some("ok\u{FFFD}"));
    bridge.with_engine(|e| assert_eq!(e.calls().released.len(), 1));
}

#[test]
fn repeated_init_is_harmless() {
    let bridge = Bridge::new(StubEngine::new());
    let pk = vec![3u8; 32];
    let r1cs = vec![4u8; 48];

    let first = bridge.init_algorithm(AlgorithmId::new(2), &pk, &r1cs);
    let second = bridge.init_algorithm(AlgorithmId::new(2), &pk, &r1cs);

    assert_eq!(first, second);
    assert_eq!(bridge.initialized(), vec![AlgorithmId::new(2)]);
    bridge.with_engine(|e| {
        assert_eq!(e.calls().inits.len(), 2);
        assert_eq!(e.calls().inits[0], e.calls().inits[1]);
        assert_eq!(e.outstanding(), 0);
        assert!(e.calls().released.is_empty());
    });
}

/* ------------------------------ scenarios ------------------------------- */

#[test]
fn scenario_a_init_with_zeroed_material_succeeds() {
    let bridge = Bridge::new(StubEngine::new().init_result(1));
    let out = bridge.init_algorithm(AlgorithmId::new(1), &[0u8; 64], &[0u8; 64]);
    assert_ne!(out.raw(), 0);
}

#[test]
fn scenario_b_prove_returns_copy_and_releases_matching_address() {
    let bridge = bridge_with(StubProof::bytes("proof"));
    assert_eq!(bridge.prove(r#"{"x":1}"#).as_deref(), Some("proof"));
    bridge.with_engine(|e| {
        let calls = e.calls();
        assert_eq!(calls.released.len(), 1);
        assert_eq!(calls.released[0], calls.allocated[0]);
        assert_eq!(calls.witnesses[0], br#"{"x":1}"#.to_vec());
    });
}

#[test]
fn scenario_c_empty_witness_null_result_is_absent() {
    let bridge = bridge_with(StubProof::Null);
    assert_eq!(bridge.prove(""), None);
    bridge.with_engine(|e| {
        assert!(e.calls().released.is_empty());
        assert_eq!(e.calls().witnesses, vec![Vec::<u8>::new()]);
    });
}
