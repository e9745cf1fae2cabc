mod common;

use dlog_zkpok::protocol::{ChallengeReveal, ProofData, VerifierChallenge};
use dlog_zkpok::{
    Error, GroupParameters, ProtocolVariant, SchnorrProver, SchnorrVerifier, SecureRng, Verdict,
    Witness,
};
use num_bigint::BigUint;

/// Runs the steps of one session by hand, handing `tamper` the proof data
/// before the final check.
fn run_with_tampering(
    params: &GroupParameters,
    variant: ProtocolVariant,
    witness: Witness,
    tamper: impl FnOnce(&mut ProofData),
) -> Result<Verdict, Error> {
    let mut rng = SecureRng::new();
    let prover = SchnorrProver::new(params.clone(), variant, witness);
    let verifier = SchnorrVerifier::new(params.clone(), variant);

    let (prover, verifier, data) = if variant.commits_challenge() {
        let (prover, opening) = prover.open(&mut rng)?;
        let (verifier, reply) = verifier.receive_opening(&opening, &mut rng)?;
        let (prover, data) = prover.receive_commitment(reply, &mut rng)?;
        (prover, verifier, data)
    } else {
        let (prover, data) = prover.commit(&mut rng)?;
        (prover, verifier.await_random_data()?, data)
    };

    let (verifier, challenge) = verifier.receive_random_data(data, &mut rng)?;
    let mut proof = prover.respond(challenge)?;
    tamper(&mut proof);
    verifier.verify(&proof)
}

#[test]
fn zkpok_end_to_end_with_generated_parameters() {
    common::init_tracing();
    let params = common::generated_group();
    assert_eq!(params.q().bits(), 8);

    let witness = Witness::from_integer(&params, &BigUint::from(200u32));
    let prover = SchnorrProver::new(params.clone(), ProtocolVariant::Zkpok, witness);
    let verifier = SchnorrVerifier::new(params, ProtocolVariant::Zkpok);

    let (proved, verified) = common::run_schnorr_session(prover, verifier);
    assert_eq!(proved.expect("Prover should finish"), Verdict::Accepted);
    assert_eq!(verified.expect("Verifier should finish"), Verdict::Accepted);
}

#[test]
fn every_variant_accepts_honest_prover() {
    common::init_tracing();
    let params = common::generated_group();

    for variant in ProtocolVariant::ALL {
        let witness = Witness::from_integer(&params, &BigUint::from(200u32));
        let prover = SchnorrProver::new(params.clone(), variant, witness);
        let verifier = SchnorrVerifier::new(params.clone(), variant);

        let (proved, verified) = common::run_schnorr_session(prover, verifier);
        assert_eq!(proved.unwrap(), Verdict::Accepted, "{variant} prover");
        assert_eq!(verified.unwrap(), Verdict::Accepted, "{variant} verifier");
    }
}

#[test]
fn flipping_a_bit_of_z_rejects() {
    common::init_tracing();
    let params = common::generated_group();

    for variant in ProtocolVariant::ALL {
        for bit in 0..8u64 {
            let witness = Witness::from_integer(&params, &BigUint::from(200u32));
            let result = run_with_tampering(&params, variant, witness, |proof| {
                proof.z ^= BigUint::from(1u32) << bit;
            });
            // A flip that lands outside [0, q) is refused as invalid input.
            assert!(
                !matches!(result, Ok(Verdict::Accepted)),
                "{variant}: flipped bit {bit} of z should not verify"
            );
        }
    }
}

#[test]
fn zkpok_rejects_wrong_trapdoor() {
    let params = common::small_group();
    let witness = Witness::new(&params, 42u32.into()).unwrap();
    let result = run_with_tampering(&params, ProtocolVariant::Zkpok, witness, |proof| {
        let a = proof.trapdoor.take().expect("ZKPOK proof should carry the trapdoor");
        proof.trapdoor = Some((a + 1u32) % 1019u32);
    });
    assert_eq!(result.unwrap(), Verdict::Rejected);
}

#[test]
fn registered_public_value_must_match() {
    common::init_tracing();
    let params = common::small_group();
    let registered = Witness::new(&params, 7u32.into())
        .unwrap()
        .public_value(&params, params.g())
        .unwrap();

    for variant in ProtocolVariant::ALL {
        let honest = SchnorrProver::new(
            params.clone(),
            variant,
            Witness::new(&params, 7u32.into()).unwrap(),
        );
        let verifier =
            SchnorrVerifier::with_public_value(params.clone(), variant, registered.clone())
                .unwrap();
        let (_, verified) = common::run_schnorr_session(honest, verifier);
        assert_eq!(verified.unwrap(), Verdict::Accepted, "{variant} registered user");

        // Knows a discrete log, but not the registered one.
        let impostor = SchnorrProver::new(
            params.clone(),
            variant,
            Witness::new(&params, 8u32.into()).unwrap(),
        );
        let verifier =
            SchnorrVerifier::with_public_value(params.clone(), variant, registered.clone())
                .unwrap();
        let (proved, verified) = common::run_schnorr_session(impostor, verifier);
        assert_eq!(verified.unwrap(), Verdict::Rejected, "{variant} impostor");
        assert_eq!(proved.unwrap(), Verdict::Rejected, "{variant} impostor learns outcome");
    }
}

#[test]
fn prover_public_value_is_g_to_the_secret() {
    let params = common::small_group();
    let witness = Witness::new(&params, 10u32.into()).unwrap();
    let prover = SchnorrProver::new(params.clone(), ProtocolVariant::Sigma, witness);
    let expected = BigUint::from(4u32).modpow(&BigUint::from(10u32), &BigUint::from(2039u32));
    assert_eq!(prover.public_value().unwrap(), expected);
}

#[test]
fn reveal_challenge_rejected_by_sigma_prover() {
    let mut rng = SecureRng::new();
    let params = common::small_group();
    let witness = Witness::new(&params, 3u32.into()).unwrap();
    let (prover, _) = SchnorrProver::new(params, ProtocolVariant::Zkp, witness)
        .commit(&mut rng)
        .unwrap();

    let challenge = VerifierChallenge::Reveal(ChallengeReveal {
        px: 1u32.into(),
        pr: 2u32.into(),
    });
    assert!(matches!(prover.respond(challenge), Err(Error::InvalidInput(_))));
}
