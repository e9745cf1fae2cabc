//! Pedersen commitments used to bind a verifier's challenge in advance.
//!
//! The receiver publishes `h = g^a` for a trapdoor `a` it keeps. The
//! committer answers with `c = g^x * h^r`. Without `a` the committer cannot
//! open `c` to any `x' != x` (binding under discrete-log hardness), and `c`
//! is uniformly distributed whatever `x` is (hiding).
//!
//! Each side is a chain of consuming states, so an opening or a commitment
//! can only be used once:
//!
//! ```text
//! receiver:  PedersenReceiver -- set_commitment --> CommittedReceiver
//! committer: PedersenCommitter -- reply --> IssuedCommitment -- decommit --> ChallengeReveal
//! ```

use core::fmt;

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::{ChallengeReveal, CommitmentReply, OpeningMessage};
use crate::{Error, GroupParameters, Result};

/// Receiver side after sending its opening message.
pub struct PedersenReceiver {
    params: GroupParameters,
    trapdoor: BigUint,
    h: BigUint,
}

impl PedersenReceiver {
    /// Draws a fresh trapdoor `a` and returns the opening message `h = g^a`.
    pub fn open<R: CryptoRng + RngCore + ?Sized>(
        params: GroupParameters,
        rng: &mut R,
    ) -> Result<(Self, OpeningMessage)> {
        let trapdoor = params.random_nonzero_exponent(rng)?;
        let h = params.exponentiate_generator(&trapdoor)?;
        debug!("pedersen opening message issued");

        let message = OpeningMessage { h: h.clone() };
        Ok((
            Self {
                params,
                trapdoor,
                h,
            },
            message,
        ))
    }

    /// Returns `h`.
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Stores the committer's commitment for later checking.
    pub fn set_commitment(self, reply: CommitmentReply) -> Result<CommittedReceiver> {
        self.params.validate_member("commitment c", &reply.c)?;
        Ok(CommittedReceiver {
            params: self.params,
            trapdoor: self.trapdoor,
            h: self.h,
            commitment: reply.c,
        })
    }
}

impl fmt::Debug for PedersenReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PedersenReceiver")
            .field("h", &self.h)
            .finish_non_exhaustive()
    }
}

/// Receiver side holding a commitment it has not yet seen opened.
pub struct CommittedReceiver {
    params: GroupParameters,
    trapdoor: BigUint,
    h: BigUint,
    commitment: BigUint,
}

impl CommittedReceiver {
    /// Returns the stored commitment.
    pub fn commitment(&self) -> &BigUint {
        &self.commitment
    }

    /// Recomputes `g^x * h^r` and compares it to the stored commitment.
    ///
    /// # Errors
    ///
    /// [`InvalidInput`](crate::Error::InvalidInput) if `r` or `x` lie outside `[0, q)`.
    pub fn check_decommitment(&self, r: &BigUint, x: &BigUint) -> Result<bool> {
        let recomputed = commit_with(&self.params, &self.h, x, r)?;
        let valid = recomputed == self.commitment;
        if !valid {
            warn!("pedersen decommitment does not match stored commitment");
        }
        Ok(valid)
    }

    /// Releases the trapdoor, ending the receiver's session.
    pub fn into_trapdoor(self) -> BigUint {
        self.trapdoor
    }
}

impl fmt::Debug for CommittedReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommittedReceiver")
            .field("h", &self.h)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

/// Committer side, configured with the group.
#[derive(Clone, Debug)]
pub struct PedersenCommitter {
    params: GroupParameters,
}

impl PedersenCommitter {
    /// Creates a committer over `params`.
    pub fn new(params: GroupParameters) -> Self {
        Self { params }
    }

    /// Commits to `x` under the receiver's `h` with fresh randomness `r`.
    ///
    /// Returns the retained opening together with `c = g^x * h^r`. An `h`
    /// of 1 is refused since `c = g^x` would expose `x`.
    pub fn reply<R: CryptoRng + RngCore + ?Sized>(
        self,
        opening: &OpeningMessage,
        x: BigUint,
        rng: &mut R,
    ) -> Result<(IssuedCommitment, CommitmentReply)> {
        self.params.validate_member("opening h", &opening.h)?;
        if opening.h.is_one() {
            return Err(Error::InvalidInput(
                "opening message h must not be the identity".to_string(),
            ));
        }
        self.params.validate_exponent(&x)?;

        let r = self.params.random_exponent(rng)?;
        let c = commit_with(&self.params, &opening.h, &x, &r)?;
        debug!("pedersen commitment issued");

        Ok((
            IssuedCommitment {
                h: opening.h.clone(),
                x,
                r,
            },
            CommitmentReply { c },
        ))
    }
}

/// Committer side after issuing a commitment; holds the opening `(x, r)`.
pub struct IssuedCommitment {
    h: BigUint,
    x: BigUint,
    r: BigUint,
}

impl IssuedCommitment {
    /// Returns the receiver's `h` this commitment was made under.
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Returns the committed value.
    pub fn committed_value(&self) -> &BigUint {
        &self.x
    }

    /// Reveals `(x, r)`, consuming the commitment.
    pub fn decommit(self) -> ChallengeReveal {
        ChallengeReveal {
            px: self.x,
            pr: self.r,
        }
    }
}

impl fmt::Debug for IssuedCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCommitment")
            .field("h", &self.h)
            .finish_non_exhaustive()
    }
}

/// `g^x * h^r mod p`.
pub fn commit_with(
    params: &GroupParameters,
    h: &BigUint,
    x: &BigUint,
    r: &BigUint,
) -> Result<BigUint> {
    let gx = params.exponentiate_generator(x)?;
    let hr = params.exponentiate(h, r)?;
    params.multiply(&gx, &hr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecureRng;

    fn params() -> GroupParameters {
        // q = 1019, p = 2q + 1 = 2039, g = 4
        GroupParameters::new(2039u32.into(), 1019u32.into(), 4u32.into()).unwrap()
    }

    #[test]
    fn honest_decommitment_checks() {
        let mut rng = SecureRng::new();
        let params = params();

        let (receiver, opening) = PedersenReceiver::open(params.clone(), &mut rng).unwrap();
        let (issued, reply) = PedersenCommitter::new(params)
            .reply(&opening, 77u32.into(), &mut rng)
            .unwrap();
        let receiver = receiver.set_commitment(reply).unwrap();

        let reveal = issued.decommit();
        assert_eq!(reveal.px, BigUint::from(77u32));
        assert!(receiver.check_decommitment(&reveal.pr, &reveal.px).unwrap());
    }

    #[test]
    fn wrong_value_fails_decommitment() {
        let mut rng = SecureRng::new();
        let params = params();

        let (receiver, opening) = PedersenReceiver::open(params.clone(), &mut rng).unwrap();
        let (issued, reply) = PedersenCommitter::new(params)
            .reply(&opening, 77u32.into(), &mut rng)
            .unwrap();
        let receiver = receiver.set_commitment(reply).unwrap();

        let reveal = issued.decommit();
        let other = BigUint::from(78u32);
        assert!(!receiver.check_decommitment(&reveal.pr, &other).unwrap());
    }

    #[test]
    fn out_of_range_decommitment_is_invalid_input() {
        let mut rng = SecureRng::new();
        let params = params();
        let q = params.q().clone();

        let (receiver, opening) = PedersenReceiver::open(params.clone(), &mut rng).unwrap();
        let (_issued, reply) = PedersenCommitter::new(params)
            .reply(&opening, 5u32.into(), &mut rng)
            .unwrap();
        let receiver = receiver.set_commitment(reply).unwrap();

        assert!(matches!(
            receiver.check_decommitment(&q, &BigUint::one()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn committer_rejects_out_of_range_value() {
        let mut rng = SecureRng::new();
        let params = params();
        let q = params.q().clone();

        let (_receiver, opening) = PedersenReceiver::open(params.clone(), &mut rng).unwrap();
        assert!(PedersenCommitter::new(params)
            .reply(&opening, q, &mut rng)
            .is_err());
    }

    #[test]
    fn committer_refuses_identity_opening() {
        let mut rng = SecureRng::new();
        let opening = OpeningMessage { h: BigUint::one() };
        assert!(matches!(
            PedersenCommitter::new(params()).reply(&opening, 3u32.into(), &mut rng),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn trapdoor_opens_h() {
        let mut rng = SecureRng::new();
        let params = params();

        let (receiver, opening) = PedersenReceiver::open(params.clone(), &mut rng).unwrap();
        let (_issued, reply) = PedersenCommitter::new(params.clone())
            .reply(&opening, 3u32.into(), &mut rng)
            .unwrap();
        let trapdoor = receiver.set_commitment(reply).unwrap().into_trapdoor();
        assert_eq!(params.exponentiate_generator(&trapdoor).unwrap(), opening.h);
    }
}
