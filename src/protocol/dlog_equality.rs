//! Proof that one secret is the discrete log of `t1` to base `g1` and of
//! `t2` to base `g2`.
//!
//! ```text
//! P -> V  x1 = g1^r, x2 = g2^r
//! V -> P  c random in [0, q)
//! P -> V  z = r + c*s mod q
//! V: g1^z == t1^c * x1  and  g2^z == t2^c * x2
//! ```

use core::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use super::{Challenge, EqualityRandomData, EqualityStatement, ProofData, Verdict, Witness};
use crate::{GroupParameters, Result};

/// Prover at the start of an equality session.
#[derive(Debug)]
pub struct EqualityProver {
    params: GroupParameters,
    statement: EqualityStatement,
    witness: Witness,
}

impl EqualityProver {
    /// Creates a prover for `statement`.
    ///
    /// The statement is validated; whether the witness actually satisfies it
    /// is left to the verifier.
    pub fn new(
        params: GroupParameters,
        statement: EqualityStatement,
        witness: Witness,
    ) -> Result<Self> {
        statement.validate(&params)?;
        Ok(Self {
            params,
            statement,
            witness,
        })
    }

    /// Returns the statement being proven.
    pub fn statement(&self) -> &EqualityStatement {
        &self.statement
    }

    /// Draws the nonce `r` and sends `(g1^r, g2^r)`.
    pub fn commit<R: CryptoRng + RngCore + ?Sized>(
        self,
        rng: &mut R,
    ) -> Result<(EqualityProverAwaitingChallenge, EqualityRandomData)> {
        let r = self.params.random_exponent(rng)?;
        let x1 = self.params.exponentiate(self.statement.g1(), &r)?;
        let x2 = self.params.exponentiate(self.statement.g2(), &r)?;
        debug!("equality prover sent proof random data");
        Ok((
            EqualityProverAwaitingChallenge { core: self, r },
            EqualityRandomData { x1, x2 },
        ))
    }
}

/// Prover holding its nonce, waiting for the challenge.
pub struct EqualityProverAwaitingChallenge {
    core: EqualityProver,
    r: BigUint,
}

impl fmt::Debug for EqualityProverAwaitingChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityProverAwaitingChallenge")
            .field("statement", &self.core.statement)
            .finish_non_exhaustive()
    }
}

impl EqualityProverAwaitingChallenge {
    /// Answers `c` with `z = r + c*s mod q`.
    pub fn respond(self, challenge: &Challenge) -> Result<ProofData> {
        let params = &self.core.params;
        params.validate_exponent(&challenge.c)?;
        let cs = params.multiply_exponents(&challenge.c, self.core.witness.secret());
        let z = params.add_exponents(&self.r, &cs);
        debug!("equality prover sent proof data");
        Ok(ProofData { z, trapdoor: None })
    }
}

/// Verifier at the start of a plain equality session.
#[derive(Clone, Debug)]
pub struct EqualityVerifier {
    params: GroupParameters,
    statement: EqualityStatement,
}

impl EqualityVerifier {
    /// Creates a verifier for `statement`, rejecting generators outside the
    /// subgroup.
    pub fn new(params: GroupParameters, statement: EqualityStatement) -> Result<Self> {
        statement.validate(&params)?;
        Ok(Self { params, statement })
    }

    /// Stores `(x1, x2)` and replies with a random challenge.
    pub fn receive_random_data<R: CryptoRng + RngCore + ?Sized>(
        self,
        data: EqualityRandomData,
        rng: &mut R,
    ) -> Result<(EqualityVerifierAwaitingProof, Challenge)> {
        self.params.validate_member("x1", &data.x1)?;
        self.params.validate_member("x2", &data.x2)?;
        let c = self.params.random_exponent(rng)?;
        debug!("equality verifier sent challenge");
        Ok((
            EqualityVerifierAwaitingProof {
                core: self,
                data,
                challenge: c.clone(),
            },
            Challenge { c },
        ))
    }
}

/// Verifier waiting for `z`.
#[derive(Debug)]
pub struct EqualityVerifierAwaitingProof {
    core: EqualityVerifier,
    data: EqualityRandomData,
    challenge: BigUint,
}

impl EqualityVerifierAwaitingProof {
    /// Accepts iff `g1^z == t1^c * x1` and `g2^z == t2^c * x2`.
    pub fn verify(self, proof: &ProofData) -> Result<Verdict> {
        let params = &self.core.params;
        let statement = &self.core.statement;
        params.validate_exponent(&proof.z)?;

        let first = schnorr_relation_holds(
            params,
            statement.g1(),
            statement.t1(),
            &self.data.x1,
            &self.challenge,
            &proof.z,
        )?;
        let second = schnorr_relation_holds(
            params,
            statement.g2(),
            statement.t2(),
            &self.data.x2,
            &self.challenge,
            &proof.z,
        )?;

        let verdict = Verdict::from_check(first && second);
        match verdict {
            Verdict::Accepted => info!("dlog equality proof accepted"),
            Verdict::Rejected => warn!(first, second, "dlog equality proof rejected"),
        }
        Ok(verdict)
    }
}

/// `base^z == target^c * x (mod p)`.
pub(crate) fn schnorr_relation_holds(
    params: &GroupParameters,
    base: &BigUint,
    target: &BigUint,
    x: &BigUint,
    c: &BigUint,
    z: &BigUint,
) -> Result<bool> {
    let lhs = params.exponentiate(base, z)?;
    let target_c = params.exponentiate(target, c)?;
    Ok(lhs == params.multiply(&target_c, x)?)
}
