//! Fiat-Shamir transcript for publishable equality proofs.
//!
//! Provides domain-separated, transcript-based challenge generation using Merlin.

use merlin::Transcript as MerlinTranscript;
use num_bigint::BigUint;

use super::group::GroupParameters;

/// Protocol label for transcript initialization.
const PROTOCOL_LABEL: &[u8] = b"DLog Equality Blinded Transcript v1";

/// Domain separation tag for protocol name.
const PROTOCOL_DST: &[u8] = b"dlog-equality-blinded";

/// Domain separation tag for challenge generation.
const CHALLENGE_DST: &[u8] = b"challenge";

/// Number of extra bits for statistical security in challenge reduction.
const EXTRA_SECURITY_BITS: usize = 128;

/// Transcript wrapper for Fiat-Shamir transformation.
pub struct Transcript(MerlinTranscript);

impl Transcript {
    /// Creates a new transcript bound to the protocol label.
    pub fn new() -> Self {
        let mut transcript = MerlinTranscript::new(PROTOCOL_LABEL);
        transcript.append_message(b"protocol", PROTOCOL_DST);
        Self(transcript)
    }

    /// Appends the group parameters `(p, q, g)`.
    pub fn append_group(&mut self, params: &GroupParameters) {
        self.append_integer(b"p", params.p());
        self.append_integer(b"q", params.q());
        self.append_integer(b"g", params.g());
    }

    /// Appends the (blinded) relation `(g1, t1, g2', t2')`.
    pub fn append_relation(
        &mut self,
        g1: &BigUint,
        t1: &BigUint,
        g2_blinded: &BigUint,
        t2_blinded: &BigUint,
    ) {
        self.append_integer(b"g1", g1);
        self.append_integer(b"t1", t1);
        self.append_integer(b"g2-blinded", g2_blinded);
        self.append_integer(b"t2-blinded", t2_blinded);
    }

    /// Appends the (blinded) proof commitments `(x1', x2')`.
    pub fn append_commitment(&mut self, x1: &BigUint, x2: &BigUint) {
        self.append_integer(b"x1", x1);
        self.append_integer(b"x2", x2);
    }

    fn append_integer(&mut self, label: &'static [u8], value: &BigUint) {
        self.0.append_message(label, &value.to_bytes_be());
    }

    /// Derives a challenge in `[0, q)`.
    ///
    /// Draws 128 bits beyond the width of `q` so the reduction bias is negligible.
    pub fn challenge_exponent(&mut self, q: &BigUint) -> BigUint {
        let byte_len = (q.bits() as usize + EXTRA_SECURITY_BITS).div_ceil(8);
        let mut buf = vec![0u8; byte_len];
        self.0.challenge_bytes(CHALLENGE_DST, &mut buf);
        BigUint::from_bytes_be(&buf) % q
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
