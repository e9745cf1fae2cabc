//! Equality proof whose transcript can be published without revealing
//! `(g2, t2)`.
//!
//! The prover runs the plain [`EqualityProver`](super::EqualityProver)
//! unchanged. The verifier privately draws `k` in `[2, q)` and `a, b` in
//! `[0, q)`, then
//!
//! ```text
//! g2' = g2^k                  t2' = t2^k
//! x1' = x1 * g1^a * t1^b      x2' = x2^k * g2'^a * t2'^b
//! c'  = H(p, q, g, g1, t1, g2', t2', x1', x2')
//! c   = c' + b                sent to the prover
//! check g1^z == t1^c * x1 and g2'^z == t2'^c * x2^k
//! z'  = z + a
//! ```
//!
//! and publishes `(g1, t1, g2', t2', c', z')`. That tuple is a
//! non-interactive equality proof for `(g1, t1, g2', t2')`: anyone recomputes
//! `x1' = g1^z' * t1^-c'`, `x2' = g2'^z' * t2'^-c'` and the hash. Since `k`,
//! `a` and `b` stay with the verifier, the published tuple is unlinkable to
//! the interactive session and reveals nothing about `(g2, t2)`.

use core::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use super::dlog_equality::schnorr_relation_holds;
use super::{
    Challenge, EqualityRandomData, EqualityStatement, ProofData, PublishableTranscript, Verdict,
};
use crate::primitives::rng::random_range;
use crate::{Error, GroupParameters, Result, Transcript};

/// Result of a blinded verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlindedVerdict {
    /// The proof held; the transcript may be published.
    Accepted(PublishableTranscript),
    /// The proof failed. Nothing is published.
    Rejected,
}

impl BlindedVerdict {
    /// Drops the transcript, keeping only accept or reject.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_check(matches!(self, Self::Accepted(_)))
    }

    /// Returns the publishable transcript of an accepted proof.
    pub fn transcript(&self) -> Option<&PublishableTranscript> {
        match self {
            Self::Accepted(transcript) => Some(transcript),
            Self::Rejected => None,
        }
    }
}

/// Verifier at the start of a blinded equality session.
#[derive(Clone, Debug)]
pub struct BlindedVerifier {
    params: GroupParameters,
    statement: EqualityStatement,
}

impl BlindedVerifier {
    /// Creates a verifier for `statement`.
    pub fn new(params: GroupParameters, statement: EqualityStatement) -> Result<Self> {
        statement.validate(&params)?;
        Ok(Self { params, statement })
    }

    /// Blinds the relation and the prover's first message, and derives the
    /// challenge for the prover.
    pub fn receive_random_data<R: CryptoRng + RngCore + ?Sized>(
        self,
        data: EqualityRandomData,
        rng: &mut R,
    ) -> Result<(BlindedVerifierAwaitingProof, Challenge)> {
        let params = &self.params;
        let statement = &self.statement;
        params.validate_member("x1", &data.x1)?;
        params.validate_member("x2", &data.x2)?;

        let blinding = Blinding {
            // k = 1 would publish g2 itself.
            k: random_range(rng, &BigUint::from(2u32), params.q())?,
            a: params.random_exponent(rng)?,
            b: params.random_exponent(rng)?,
        };

        let g2_blinded = params.exponentiate(statement.g2(), &blinding.k)?;
        let t2_blinded = params.exponentiate(statement.t2(), &blinding.k)?;

        let x1_blinded = params.multiply(
            &data.x1,
            &params.multiply(
                &params.exponentiate(statement.g1(), &blinding.a)?,
                &params.exponentiate(statement.t1(), &blinding.b)?,
            )?,
        )?;
        let x2_k = params.exponentiate(&data.x2, &blinding.k)?;
        let x2_blinded = params.multiply(
            &x2_k,
            &params.multiply(
                &params.exponentiate(&g2_blinded, &blinding.a)?,
                &params.exponentiate(&t2_blinded, &blinding.b)?,
            )?,
        )?;

        let public_challenge = fiat_shamir_challenge(
            params,
            statement.g1(),
            statement.t1(),
            &g2_blinded,
            &t2_blinded,
            &x1_blinded,
            &x2_blinded,
        );
        let c = params.add_exponents(&public_challenge, &blinding.b);
        debug!("blinded verifier sent challenge");

        Ok((
            BlindedVerifierAwaitingProof {
                core: self,
                x1: data.x1,
                x2_k,
                g2_blinded,
                t2_blinded,
                blinding,
                challenge: c.clone(),
                public_challenge,
            },
            Challenge { c },
        ))
    }
}

struct Blinding {
    k: BigUint,
    a: BigUint,
    b: BigUint,
}

/// Verifier holding the blinding factors, waiting for `z`.
pub struct BlindedVerifierAwaitingProof {
    core: BlindedVerifier,
    x1: BigUint,
    x2_k: BigUint,
    g2_blinded: BigUint,
    t2_blinded: BigUint,
    blinding: Blinding,
    challenge: BigUint,
    public_challenge: BigUint,
}

impl BlindedVerifierAwaitingProof {
    /// Returns `g2'`.
    pub fn g2_blinded(&self) -> &BigUint {
        &self.g2_blinded
    }

    /// Returns `t2'`.
    pub fn t2_blinded(&self) -> &BigUint {
        &self.t2_blinded
    }

    /// Checks `z` against the blinded pair and, on success, returns the
    /// publishable transcript.
    pub fn verify(self, proof: &ProofData) -> Result<BlindedVerdict> {
        let params = &self.core.params;
        let statement = &self.core.statement;
        params.validate_exponent(&proof.z)?;

        let first = schnorr_relation_holds(
            params,
            statement.g1(),
            statement.t1(),
            &self.x1,
            &self.challenge,
            &proof.z,
        )?;
        let second = schnorr_relation_holds(
            params,
            &self.g2_blinded,
            &self.t2_blinded,
            &self.x2_k,
            &self.challenge,
            &proof.z,
        )?;

        if !(first && second) {
            warn!(first, second, "blinded dlog equality proof rejected");
            return Ok(BlindedVerdict::Rejected);
        }

        let transcript = PublishableTranscript {
            g1: statement.g1().clone(),
            t1: statement.t1().clone(),
            g2_blinded: self.g2_blinded,
            t2_blinded: self.t2_blinded,
            challenge: self.public_challenge,
            z: params.add_exponents(&proof.z, &self.blinding.a),
        };
        info!("blinded dlog equality proof accepted, transcript ready");
        Ok(BlindedVerdict::Accepted(transcript))
    }
}

impl fmt::Debug for BlindedVerifierAwaitingProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlindedVerifierAwaitingProof")
            .field("g2_blinded", &self.g2_blinded)
            .field("t2_blinded", &self.t2_blinded)
            .finish_non_exhaustive()
    }
}

impl PublishableTranscript {
    /// Re-verifies the transcript with no interaction.
    ///
    /// Deterministic: the same transcript always yields the same verdict.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if a field is out of range or a generator is
    /// not in the order-`q` subgroup.
    pub fn verify(&self, params: &GroupParameters) -> Result<Verdict> {
        EqualityStatement::new(
            self.g1.clone(),
            self.t1.clone(),
            self.g2_blinded.clone(),
            self.t2_blinded.clone(),
        )
        .validate(params)?;
        params.validate_exponent(&self.challenge)?;
        params.validate_exponent(&self.z)?;

        let x1 = params.multiply(
            &params.exponentiate(&self.g1, &self.z)?,
            &params.modular_inverse(&params.exponentiate(&self.t1, &self.challenge)?)?,
        )?;
        let x2 = params.multiply(
            &params.exponentiate(&self.g2_blinded, &self.z)?,
            &params.modular_inverse(&params.exponentiate(&self.t2_blinded, &self.challenge)?)?,
        )?;

        let recomputed = fiat_shamir_challenge(
            params,
            &self.g1,
            &self.t1,
            &self.g2_blinded,
            &self.t2_blinded,
            &x1,
            &x2,
        );
        Ok(Verdict::from_check(recomputed == self.challenge))
    }
}

/// Verifies `transcript` and that it is about `(g1, t1, g2', t2')`.
pub fn verify_blinded_transcript(
    params: &GroupParameters,
    transcript: &PublishableTranscript,
    g1: &BigUint,
    t1: &BigUint,
    g2_blinded: &BigUint,
    t2_blinded: &BigUint,
) -> Result<Verdict> {
    if transcript.g1 != *g1
        || transcript.t1 != *t1
        || transcript.g2_blinded != *g2_blinded
        || transcript.t2_blinded != *t2_blinded
    {
        return Err(Error::InvalidInput(
            "transcript is about a different relation".to_string(),
        ));
    }
    let verdict = transcript.verify(params)?;
    debug!(?verdict, "blinded transcript re-verified");
    Ok(verdict)
}

fn fiat_shamir_challenge(
    params: &GroupParameters,
    g1: &BigUint,
    t1: &BigUint,
    g2_blinded: &BigUint,
    t2_blinded: &BigUint,
    x1: &BigUint,
    x2: &BigUint,
) -> BigUint {
    let mut transcript = Transcript::new();
    transcript.append_group(params);
    transcript.append_relation(g1, t1, g2_blinded, t2_blinded);
    transcript.append_commitment(x1, x2);
    transcript.challenge_exponent(params.q())
}
