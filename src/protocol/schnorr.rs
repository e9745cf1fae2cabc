//! Schnorr identification in three strengths.
//!
//! All variants prove knowledge of `s` with `b = g^s`; they differ in how the
//! challenge is produced:
//!
//! ```text
//! Sigma / ZKP:                          ZKPOK:
//!   P -> V  (x = g^r, b)                  P -> V  h = g^a              (opening)
//!   V -> P  c random                      V -> P  c = g^px * h^pr      (commitment)
//!   P -> V  z = r + c*s                   P -> V  (x = g^r, b)
//!   V: g^z == b^c * x                     V -> P  (px, pr)             (reveal)
//!                                         P: check c, abort on mismatch
//!                                         P -> V  (z = r + px*s, a)
//!                                         V: g^a == h and g^z == b^px * x
//! ```
//!
//! Sessions are consuming state values, so the nonce `r` and the trapdoor `a`
//! belong to exactly one run.

use core::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use super::pedersen::{CommittedReceiver, IssuedCommitment, PedersenCommitter, PedersenReceiver};
use super::{
    Challenge, CommitmentReply, OpeningMessage, ProofData, ProtocolVariant, SchnorrRandomData,
    Verdict, VerifierChallenge, Witness,
};
use crate::{Error, GroupParameters, Result};

fn require_variant(variant: ProtocolVariant, committed: bool, step: &str) -> Result<()> {
    if variant.commits_challenge() != committed {
        return Err(Error::InvalidInput(format!(
            "{step} is not a step of the {variant} protocol"
        )));
    }
    Ok(())
}

/// Prover at the start of a Schnorr session.
pub struct SchnorrProver {
    params: GroupParameters,
    variant: ProtocolVariant,
    witness: Witness,
}

impl SchnorrProver {
    /// Creates a prover for `witness` running `variant`.
    pub fn new(params: GroupParameters, variant: ProtocolVariant, witness: Witness) -> Self {
        Self {
            params,
            variant,
            witness,
        }
    }

    /// Returns the variant this session runs.
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Returns the public value `b = g^s`.
    pub fn public_value(&self) -> Result<BigUint> {
        self.witness.public_value(&self.params, self.params.g())
    }

    /// ZKPOK step 1: sends the Pedersen opening message `h = g^a`.
    pub fn open<R: CryptoRng + RngCore + ?Sized>(
        self,
        rng: &mut R,
    ) -> Result<(ProverAwaitingCommitment, OpeningMessage)> {
        require_variant(self.variant, true, "opening a commitment")?;
        let (receiver, opening) = PedersenReceiver::open(self.params.clone(), rng)?;
        debug!(variant = %self.variant, "prover sent opening message");
        Ok((
            ProverAwaitingCommitment {
                core: self,
                receiver,
            },
            opening,
        ))
    }

    /// Sigma / ZKP first step: sends `(x = g^r, b)`.
    pub fn commit<R: CryptoRng + RngCore + ?Sized>(
        self,
        rng: &mut R,
    ) -> Result<(ProverAwaitingChallenge, SchnorrRandomData)> {
        require_variant(self.variant, false, "sending proof random data first")?;
        self.random_data(None, rng)
    }

    fn random_data<R: CryptoRng + RngCore + ?Sized>(
        self,
        receiver: Option<CommittedReceiver>,
        rng: &mut R,
    ) -> Result<(ProverAwaitingChallenge, SchnorrRandomData)> {
        let r = self.params.random_exponent(rng)?;
        let x = self.params.exponentiate_generator(&r)?;
        let b = self.public_value()?;
        debug!(variant = %self.variant, "prover sent proof random data");

        Ok((
            ProverAwaitingChallenge {
                core: self,
                r,
                receiver,
            },
            SchnorrRandomData { x, b },
        ))
    }
}

impl fmt::Debug for SchnorrProver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchnorrProver")
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// ZKPOK prover waiting for the verifier's commitment to its challenge.
pub struct ProverAwaitingCommitment {
    core: SchnorrProver,
    receiver: PedersenReceiver,
}

impl ProverAwaitingCommitment {
    /// Steps 3 and 4: stores the commitment, then sends `(x = g^r, b)`.
    pub fn receive_commitment<R: CryptoRng + RngCore + ?Sized>(
        self,
        reply: CommitmentReply,
        rng: &mut R,
    ) -> Result<(ProverAwaitingChallenge, SchnorrRandomData)> {
        let receiver = self.receiver.set_commitment(reply)?;
        self.core.random_data(Some(receiver), rng)
    }
}

/// Prover holding its nonce `r`, waiting for the challenge.
pub struct ProverAwaitingChallenge {
    core: SchnorrProver,
    r: BigUint,
    receiver: Option<CommittedReceiver>,
}

impl ProverAwaitingChallenge {
    /// Answers the challenge with `z = r + c*s mod q`.
    ///
    /// ZKPOK sessions take a [`VerifierChallenge::Reveal`], check it against
    /// the stored commitment and attach the trapdoor. Sigma and ZKP sessions
    /// take a [`VerifierChallenge::Plain`].
    ///
    /// # Errors
    ///
    /// - [`Error::CommitmentMismatch`] if the reveal does not open the commitment
    /// - [`Error::InvalidInput`] for out-of-range values or the wrong challenge kind
    pub fn respond(self, challenge: VerifierChallenge) -> Result<ProofData> {
        let ProverAwaitingChallenge { core, r, receiver } = self;
        let params = &core.params;

        match (core.variant, challenge, receiver) {
            (ProtocolVariant::Zkpok, VerifierChallenge::Reveal(reveal), Some(receiver)) => {
                params.validate_exponent(&reveal.px)?;
                params.validate_exponent(&reveal.pr)?;
                if !receiver.check_decommitment(&reveal.pr, &reveal.px)? {
                    warn!("verifier's challenge does not match its commitment, aborting");
                    return Err(Error::CommitmentMismatch);
                }
                let z = response(params, &r, &reveal.px, core.witness.secret());
                debug!("prover sent proof data with trapdoor");
                Ok(ProofData {
                    z,
                    trapdoor: Some(receiver.into_trapdoor()),
                })
            }
            (ProtocolVariant::Sigma | ProtocolVariant::Zkp, VerifierChallenge::Plain(c), None) => {
                params.validate_exponent(&c.c)?;
                let z = response(params, &r, &c.c, core.witness.secret());
                debug!(variant = %core.variant, "prover sent proof data");
                Ok(ProofData { z, trapdoor: None })
            }
            (variant, _, _) => Err(Error::InvalidInput(format!(
                "challenge kind does not match the {variant} protocol"
            ))),
        }
    }
}

fn response(params: &GroupParameters, r: &BigUint, c: &BigUint, s: &BigUint) -> BigUint {
    params.add_exponents(r, &params.multiply_exponents(c, s))
}

/// Verifier at the start of a Schnorr session.
#[derive(Clone, Debug)]
pub struct SchnorrVerifier {
    params: GroupParameters,
    variant: ProtocolVariant,
    expected_public_value: Option<BigUint>,
}

impl SchnorrVerifier {
    /// Creates a verifier accepting knowledge of `log_g(b)` for the `b` the
    /// prover announces.
    pub fn new(params: GroupParameters, variant: ProtocolVariant) -> Self {
        Self {
            params,
            variant,
            expected_public_value: None,
        }
    }

    /// Creates a verifier that only accepts the registered public value `b`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `public_value` is outside the order-`q`
    /// subgroup, as no secret could match it.
    pub fn with_public_value(
        params: GroupParameters,
        variant: ProtocolVariant,
        public_value: BigUint,
    ) -> Result<Self> {
        params.validate_member("registered public value", &public_value)?;
        Ok(Self {
            params,
            variant,
            expected_public_value: Some(public_value),
        })
    }

    /// Returns the variant this session runs.
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// ZKPOK step 2: picks the challenge and commits to it under `h`.
    pub fn receive_opening<R: CryptoRng + RngCore + ?Sized>(
        self,
        opening: &OpeningMessage,
        rng: &mut R,
    ) -> Result<(VerifierAwaitingRandomData, CommitmentReply)> {
        require_variant(self.variant, true, "receiving an opening message")?;
        let px = self.params.random_exponent(rng)?;
        let (issued, reply) = PedersenCommitter::new(self.params.clone()).reply(opening, px, rng)?;
        debug!("verifier committed to its challenge");
        Ok((
            VerifierAwaitingRandomData {
                core: self,
                commitment: Some(issued),
            },
            reply,
        ))
    }

    /// Sigma / ZKP: no commitment phase, wait directly for the random data.
    pub fn await_random_data(self) -> Result<VerifierAwaitingRandomData> {
        require_variant(self.variant, false, "skipping the commitment phase")?;
        Ok(VerifierAwaitingRandomData {
            core: self,
            commitment: None,
        })
    }
}

/// Verifier waiting for `(x, b)`.
#[derive(Debug)]
pub struct VerifierAwaitingRandomData {
    core: SchnorrVerifier,
    commitment: Option<IssuedCommitment>,
}

impl VerifierAwaitingRandomData {
    /// Stores `(x, b)` and releases the challenge: the decommitment for
    /// ZKPOK, a fresh random `c` otherwise.
    pub fn receive_random_data<R: CryptoRng + RngCore + ?Sized>(
        self,
        data: SchnorrRandomData,
        rng: &mut R,
    ) -> Result<(VerifierAwaitingProof, VerifierChallenge)> {
        let params = &self.core.params;
        params.validate_member("x", &data.x)?;
        params.validate_member("b", &data.b)?;

        let (challenge, opening, message) = match self.commitment {
            Some(issued) => {
                let opening = issued.h().clone();
                let reveal = issued.decommit();
                (
                    reveal.px.clone(),
                    Some(opening),
                    VerifierChallenge::Reveal(reveal),
                )
            }
            None => {
                let c = params.random_exponent(rng)?;
                (c.clone(), None, VerifierChallenge::Plain(Challenge { c }))
            }
        };
        debug!(variant = %self.core.variant, "verifier released challenge");

        Ok((
            VerifierAwaitingProof {
                core: self.core,
                data,
                challenge,
                opening,
            },
            message,
        ))
    }
}

/// Verifier holding the transcript so far, waiting for `z`.
#[derive(Debug)]
pub struct VerifierAwaitingProof {
    core: SchnorrVerifier,
    data: SchnorrRandomData,
    challenge: BigUint,
    opening: Option<BigUint>,
}

impl VerifierAwaitingProof {
    /// Returns the challenge the prover must answer.
    pub fn challenge(&self) -> &BigUint {
        &self.challenge
    }

    /// Final check.
    ///
    /// ZKPOK accepts iff `g^a == h` and `g^z == b^c * x`; Sigma and ZKP only
    /// check the second equation.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `z` or the trapdoor lie outside `[0, q)` or
    /// a ZKPOK proof lacks its trapdoor. A failing equation is not an error
    /// but [`Verdict::Rejected`].
    pub fn verify(self, proof: &ProofData) -> Result<Verdict> {
        let params = &self.core.params;
        params.validate_exponent(&proof.z)?;

        let trapdoor_holds = match (&self.opening, &proof.trapdoor) {
            (Some(h), Some(a)) => {
                params.validate_exponent(a)?;
                params.exponentiate_generator(a)? == *h
            }
            (Some(_), None) => {
                return Err(Error::InvalidInput(
                    "ZKPOK proof data must carry the trapdoor".to_string(),
                ));
            }
            (None, _) => true,
        };

        let lhs = params.exponentiate_generator(&proof.z)?;
        let b_c = params.exponentiate(&self.data.b, &self.challenge)?;
        let rhs = params.multiply(&b_c, &self.data.x)?;

        let public_value_holds = self
            .core
            .expected_public_value
            .as_ref()
            .map_or(true, |expected| *expected == self.data.b);

        let verdict = Verdict::from_check(trapdoor_holds && lhs == rhs && public_value_holds);
        match verdict {
            Verdict::Accepted => info!(variant = %self.core.variant, "schnorr proof accepted"),
            Verdict::Rejected => warn!(
                variant = %self.core.variant,
                trapdoor_holds,
                public_value_holds,
                "schnorr proof rejected"
            ),
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecureRng;

    fn params() -> GroupParameters {
        GroupParameters::new(2039u32.into(), 1019u32.into(), 4u32.into()).unwrap()
    }

    fn run(variant: ProtocolVariant, secret: u32) -> Verdict {
        let mut rng = SecureRng::new();
        let params = params();
        let witness = Witness::new(&params, secret.into()).unwrap();
        let prover = SchnorrProver::new(params.clone(), variant, witness);
        let verifier = SchnorrVerifier::new(params, variant);

        let (prover, verifier, data) = if variant.commits_challenge() {
            let (prover, opening) = prover.open(&mut rng).unwrap();
            let (verifier, reply) = verifier.receive_opening(&opening, &mut rng).unwrap();
            let (prover, data) = prover.receive_commitment(reply, &mut rng).unwrap();
            (prover, verifier, data)
        } else {
            let (prover, data) = prover.commit(&mut rng).unwrap();
            (prover, verifier.await_random_data().unwrap(), data)
        };

        let (verifier, challenge) = verifier.receive_random_data(data, &mut rng).unwrap();
        let proof = prover.respond(challenge).unwrap();
        verifier.verify(&proof).unwrap()
    }

    #[test]
    fn honest_runs_accept() {
        for variant in ProtocolVariant::ALL {
            for secret in [0u32, 1, 200, 1018] {
                assert_eq!(run(variant, secret), Verdict::Accepted, "{variant} s={secret}");
            }
        }
    }

    #[test]
    fn zkpok_prover_cannot_skip_opening() {
        let mut rng = SecureRng::new();
        let params = params();
        let witness = Witness::new(&params, 5u32.into()).unwrap();
        let prover = SchnorrProver::new(params, ProtocolVariant::Zkpok, witness);
        assert!(matches!(prover.commit(&mut rng), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn sigma_verifier_has_no_commitment_phase() {
        let mut rng = SecureRng::new();
        let params = params();
        let opening = OpeningMessage { h: 16u32.into() };
        let verifier = SchnorrVerifier::new(params.clone(), ProtocolVariant::Sigma);
        assert!(verifier.receive_opening(&opening, &mut rng).is_err());

        let verifier = SchnorrVerifier::new(params, ProtocolVariant::Zkpok);
        assert!(verifier.await_random_data().is_err());
    }

    #[test]
    fn mismatched_challenge_kind_is_rejected() {
        let mut rng = SecureRng::new();
        let params = params();
        let witness = Witness::new(&params, 5u32.into()).unwrap();
        let prover = SchnorrProver::new(params, ProtocolVariant::Sigma, witness);
        let (prover, _) = prover.commit(&mut rng).unwrap();
        let reveal = VerifierChallenge::Reveal(super::super::ChallengeReveal {
            px: 1u32.into(),
            pr: 1u32.into(),
        });
        assert!(matches!(prover.respond(reveal), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn zkpok_proof_without_trapdoor_is_invalid_input() {
        let mut rng = SecureRng::new();
        let params = params();
        let witness = Witness::new(&params, 5u32.into()).unwrap();
        let prover = SchnorrProver::new(params.clone(), ProtocolVariant::Zkpok, witness);
        let verifier = SchnorrVerifier::new(params, ProtocolVariant::Zkpok);

        let (prover, opening) = prover.open(&mut rng).unwrap();
        let (verifier, reply) = verifier.receive_opening(&opening, &mut rng).unwrap();
        let (prover, data) = prover.receive_commitment(reply, &mut rng).unwrap();
        let (verifier, challenge) = verifier.receive_random_data(data, &mut rng).unwrap();
        let mut proof = prover.respond(challenge).unwrap();
        proof.trapdoor = None;

        assert!(matches!(verifier.verify(&proof), Err(Error::InvalidInput(_))));
    }
}
