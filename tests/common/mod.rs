//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use std::thread;

use dlog_zkpok::channel::{prove_schnorr, verify_schnorr};
use dlog_zkpok::{
    generate_parameters, random_generator, GroupParameters, InProcessChannel, Result,
    SchnorrProver, SchnorrVerifier, SecureRng, Verdict,
};
use num_bigint::BigUint;

/// Initialize test tracing (call once at the beginning of tests).
///
/// Shows the library's events at INFO level through the test writer.
/// Subsequent calls are safe and will be ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("dlog_zkpok=info");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Safe-prime group with `q = 1019`, `p = 2q + 1 = 2039`, `g = 4`.
pub fn small_group() -> GroupParameters {
    GroupParameters::new(2039u32.into(), 1019u32.into(), 4u32.into())
        .expect("Fixed test group should be valid")
}

/// Freshly generated group with `N = 8`, `L = 16`.
pub fn generated_group() -> GroupParameters {
    generate_parameters(8, 16).expect("Parameter generation should succeed")
}

/// Two distinct random generators of the order-`q` subgroup.
pub fn distinct_generators(params: &GroupParameters) -> (BigUint, BigUint) {
    let mut rng = SecureRng::new();
    let g1 = random_generator(params, &mut rng).expect("Generator sampling should succeed");
    loop {
        let g2 = random_generator(params, &mut rng).expect("Generator sampling should succeed");
        if g2 != g1 {
            return (g1, g2);
        }
    }
}

/// Runs a Schnorr session with each party on its own thread.
///
/// Returns `(prover result, verifier result)`.
pub fn run_schnorr_session(
    prover: SchnorrProver,
    verifier: SchnorrVerifier,
) -> (Result<Verdict>, Result<Verdict>) {
    let (mut prover_end, mut verifier_end) = InProcessChannel::pair();

    let handle =
        thread::spawn(move || verify_schnorr(&mut verifier_end, verifier, &mut SecureRng::new()));
    let proved = prove_schnorr(&mut prover_end, prover, &mut SecureRng::new());
    let verified = handle.join().expect("Verifier thread should not panic");

    (proved, verified)
}
