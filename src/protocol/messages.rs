//! Messages exchanged between prover and verifier.
//!
//! Only the semantic fields are fixed. The serde encoding (hex strings for
//! integers) is a convenience for transports, not a normative wire format.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::Verdict;
use crate::primitives::encoding::{hex_biguint, hex_biguint_opt};

/// Pedersen opening message `h = g^a` sent by the prover's receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningMessage {
    /// Opening `h`, an element of the order-q subgroup.
    #[serde(with = "hex_biguint")]
    pub h: BigUint,
}

/// Commitment `c = g^x * h^r` to the verifier's challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentReply {
    /// Commitment `c`.
    #[serde(with = "hex_biguint")]
    pub c: BigUint,
}

/// First Schnorr message: `x = g^r` and the claimed public value `b = g^s`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrRandomData {
    /// Nonce commitment `x`.
    #[serde(with = "hex_biguint")]
    pub x: BigUint,
    /// Public value `b` whose discrete log is being proven.
    #[serde(with = "hex_biguint")]
    pub b: BigUint,
}

/// First equality message: `x1 = g1^r`, `x2 = g2^r`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityRandomData {
    /// Nonce commitment to base `g1`.
    #[serde(with = "hex_biguint")]
    pub x1: BigUint,
    /// Nonce commitment to base `g2`.
    #[serde(with = "hex_biguint")]
    pub x2: BigUint,
}

/// Decommitment of the pre-committed challenge `px` with randomness `pr`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReveal {
    /// Committed challenge.
    #[serde(with = "hex_biguint")]
    pub px: BigUint,
    /// Commitment randomness.
    #[serde(with = "hex_biguint")]
    pub pr: BigUint,
}

/// Challenge chosen after the prover's first message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge in `[0, q)`.
    #[serde(with = "hex_biguint")]
    pub c: BigUint,
}

/// Challenge as delivered to a Schnorr prover, depending on the variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifierChallenge {
    /// Sigma / ZKP: a fresh random challenge.
    Plain(Challenge),
    /// ZKPOK: the opened commitment.
    Reveal(ChallengeReveal),
}

/// Final prover message: `z = r + c*s mod q`, plus the trapdoor for ZKPOK.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofData {
    /// Response `z`.
    #[serde(with = "hex_biguint")]
    pub z: BigUint,
    /// Trapdoor `a` of the opening `h = g^a`; present only for ZKPOK.
    #[serde(default, with = "hex_biguint_opt")]
    pub trapdoor: Option<BigUint>,
}

/// Blinded equality transcript that can be published and re-verified.
///
/// Carries `g2' = g2^k`, `t2' = t2^k` in place of the original pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishableTranscript {
    /// First base, unchanged.
    #[serde(with = "hex_biguint")]
    pub g1: BigUint,
    /// First target, unchanged.
    #[serde(with = "hex_biguint")]
    pub t1: BigUint,
    /// `g2^k`.
    #[serde(with = "hex_biguint")]
    pub g2_blinded: BigUint,
    /// `t2^k`.
    #[serde(with = "hex_biguint")]
    pub t2_blinded: BigUint,
    /// Fiat-Shamir challenge `c'` over the blinded values.
    #[serde(with = "hex_biguint")]
    pub challenge: BigUint,
    /// Shifted response `z' = z + a`.
    #[serde(with = "hex_biguint")]
    pub z: BigUint,
}

/// Envelope carried by a [`Channel`](crate::channel::Channel).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// ZKPOK prover opens the challenge commitment.
    Opening(OpeningMessage),
    /// ZKPOK verifier commits to its challenge.
    CommitmentReply(CommitmentReply),
    /// Schnorr first message.
    SchnorrRandomData(SchnorrRandomData),
    /// Equality first message.
    EqualityRandomData(EqualityRandomData),
    /// ZKPOK challenge decommitment.
    ChallengeReveal(ChallengeReveal),
    /// Plain challenge.
    Challenge(Challenge),
    /// Prover response.
    ProofData(ProofData),
    /// Verifier's verdict, sent after the last check.
    Outcome(Verdict),
    /// The sender gave up on the session.
    Abort {
        /// Why the sender aborted.
        reason: String,
    },
}

impl Message {
    /// Short name of the message kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opening(_) => "OpeningMessage",
            Self::CommitmentReply(_) => "CommitmentReply",
            Self::SchnorrRandomData(_) | Self::EqualityRandomData(_) => "ProofRandomData",
            Self::ChallengeReveal(_) => "ChallengeReveal",
            Self::Challenge(_) => "Challenge",
            Self::ProofData(_) => "ProofData",
            Self::Outcome(_) => "Outcome",
            Self::Abort { .. } => "Abort",
        }
    }
}

impl From<VerifierChallenge> for Message {
    fn from(challenge: VerifierChallenge) -> Self {
        match challenge {
            VerifierChallenge::Plain(c) => Self::Challenge(c),
            VerifierChallenge::Reveal(r) => Self::ChallengeReveal(r),
        }
    }
}
