//! Protocol gadgets shared by every proof in the engine.
//!
//! This module contains the data structures the provers and verifiers pass
//! around: the secret witness, the equality statement, the variant tag of
//! the Schnorr protocol and the verdict of a verification.

use core::fmt;
use core::str::FromStr;

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::primitives::encoding::hex_biguint;
use crate::{Error, GroupParameters, Result};

/// Secret witness: the discrete logarithm the prover knows.
///
/// Always lies in `[0, q)`. `Debug` output is redacted.
#[derive(Clone)]
pub struct Witness {
    s: BigUint,
}

impl Witness {
    /// Creates a witness, rejecting values outside `[0, q)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dlog_zkpok::{GroupParameters, Witness};
    ///
    /// let params = GroupParameters::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap();
    /// assert!(Witness::new(&params, 6u32.into()).is_ok());
    /// assert!(Witness::new(&params, 11u32.into()).is_err());
    /// ```
    pub fn new(params: &GroupParameters, s: BigUint) -> Result<Self> {
        params.validate_exponent(&s)?;
        Ok(Self { s })
    }

    /// Creates a witness from an arbitrary integer reduced modulo `q`.
    pub fn from_integer(params: &GroupParameters, value: &BigUint) -> Self {
        Self {
            s: params.reduce_exponent(value),
        }
    }

    /// Returns the public value `base^s`.
    pub fn public_value(&self, params: &GroupParameters, base: &BigUint) -> Result<BigUint> {
        params.exponentiate(base, &self.s)
    }

    /// Returns a reference to the secret exponent.
    pub(crate) fn secret(&self) -> &BigUint {
        &self.s
    }
}

impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Witness(<redacted>)")
    }
}

/// Which strength of the Schnorr protocol a session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVariant {
    /// Plain sigma protocol: random challenge after the prover's commitment.
    #[serde(rename = "Sigma")]
    Sigma,
    /// Zero-knowledge variant; same message flow as [`ProtocolVariant::Sigma`].
    #[serde(rename = "ZKP")]
    Zkp,
    /// Proof of knowledge: the challenge is fixed by a Pedersen commitment
    /// before the prover's randomness is revealed.
    #[serde(rename = "ZKPOK")]
    Zkpok,
}

impl ProtocolVariant {
    /// All variants, in increasing strength.
    pub const ALL: [ProtocolVariant; 3] = [Self::Sigma, Self::Zkp, Self::Zkpok];

    /// Whether the challenge is bound by a Pedersen commitment.
    pub fn commits_challenge(self) -> bool {
        matches!(self, Self::Zkpok)
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sigma => "Sigma",
            Self::Zkp => "ZKP",
            Self::Zkpok => "ZKPOK",
        };
        f.write_str(name)
    }
}

impl FromStr for ProtocolVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sigma" => Ok(Self::Sigma),
            "zkp" => Ok(Self::Zkp),
            "zkpok" => Ok(Self::Zkpok),
            _ => Err(Error::InvalidParameters(format!(
                "unknown protocol variant '{s}' (expected Sigma, ZKP or ZKPOK)"
            ))),
        }
    }
}

/// Outcome of a completed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// All verification equations held.
    Accepted,
    /// At least one verification equation failed.
    Rejected,
}

impl Verdict {
    /// Accepts iff `holds`.
    pub fn from_check(holds: bool) -> Self {
        if holds {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    /// Whether the proof was accepted.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Maps [`Verdict::Rejected`] to [`Error::VerificationFailed`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected => Err(Error::VerificationFailed(
                "verification equations do not hold".to_string(),
            )),
        }
    }
}

/// Public statement of a discrete-log equality proof.
///
/// Claims a single secret `s` with `t1 = g1^s` and `t2 = g2^s`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityStatement {
    #[serde(with = "hex_biguint")]
    g1: BigUint,
    #[serde(with = "hex_biguint")]
    t1: BigUint,
    #[serde(with = "hex_biguint")]
    g2: BigUint,
    #[serde(with = "hex_biguint")]
    t2: BigUint,
}

impl EqualityStatement {
    /// Creates a statement from its public values.
    pub fn new(g1: BigUint, t1: BigUint, g2: BigUint, t2: BigUint) -> Self {
        Self { g1, t1, g2, t2 }
    }

    /// Computes the statement for `witness` under the two generators.
    pub fn from_witness(
        params: &GroupParameters,
        witness: &Witness,
        g1: BigUint,
        g2: BigUint,
    ) -> Result<Self> {
        let t1 = witness.public_value(params, &g1)?;
        let t2 = witness.public_value(params, &g2)?;
        Ok(Self { g1, t1, g2, t2 })
    }

    /// Returns the first generator.
    pub fn g1(&self) -> &BigUint {
        &self.g1
    }

    /// Returns `t1 = g1^s`.
    pub fn t1(&self) -> &BigUint {
        &self.t1
    }

    /// Returns the second generator.
    pub fn g2(&self) -> &BigUint {
        &self.g2
    }

    /// Returns `t2 = g2^s`.
    pub fn t2(&self) -> &BigUint {
        &self.t2
    }

    /// Checks that the generators are non-identity subgroup elements and that
    /// the targets lie in the subgroup.
    pub fn validate(&self, params: &GroupParameters) -> Result<()> {
        for (name, generator) in [("g1", &self.g1), ("g2", &self.g2)] {
            if generator.is_one() || !params.contains(generator) {
                return Err(Error::InvalidInput(format!(
                    "{name} is not a generator of the order-q subgroup"
                )));
            }
        }
        for (name, target) in [("t1", &self.t1), ("t2", &self.t2)] {
            params.validate_member(name, target)?;
        }
        Ok(())
    }
}
