//! Zero-knowledge proofs of knowledge of discrete logarithms.
//!
//! The crate works in the order-`q` subgroup of `Z_p^*` and provides
//! - parameter generation for an `N`-bit `q` and an `L`-bit `p`
//! - Pedersen commitments
//! - Schnorr identification as a sigma protocol, as zero-knowledge proof and
//!   as a proof of knowledge with a committed challenge
//! - a proof that two public values share one discrete log, plain or with a
//!   blinded, publishable transcript
//!
//! Protocol parties are chains of consuming session states; a nonce or
//! trapdoor cannot outlive its session. The [`channel`] module runs whole
//! sessions over a message transport.
//!
//! ```rust
//! use dlog_zkpok::{
//!     generate_parameters, ProtocolVariant, SchnorrProver, SchnorrVerifier, SecureRng, Verdict,
//!     Witness,
//! };
//!
//! let mut rng = SecureRng::new();
//! let params = generate_parameters(8, 16).unwrap();
//! let witness = Witness::from_integer(&params, &200u32.into());
//!
//! let prover = SchnorrProver::new(params.clone(), ProtocolVariant::Sigma, witness);
//! let verifier = SchnorrVerifier::new(params, ProtocolVariant::Sigma);
//!
//! let (prover, data) = prover.commit(&mut rng).unwrap();
//! let verifier = verifier.await_random_data().unwrap();
//! let (verifier, challenge) = verifier.receive_random_data(data, &mut rng).unwrap();
//! let proof = prover.respond(challenge).unwrap();
//! assert_eq!(verifier.verify(&proof).unwrap(), Verdict::Accepted);
//! ```

#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod error;
pub mod primitives;
pub mod protocol;

pub use channel::{Channel, InProcessChannel};
pub use config::EngineConfig;
pub use error::Error;
pub use primitives::{
    derive_generator, generate_parameters, generate_parameters_with_rng, is_probable_prime,
    random_generator, GroupParameters, SecureRng, Transcript,
};
pub use protocol::{
    verify_blinded_transcript, BlindedVerdict, BlindedVerifier, EqualityProver,
    EqualityStatement, EqualityVerifier, PedersenCommitter, PedersenReceiver, ProtocolVariant,
    PublishableTranscript, SchnorrProver, SchnorrVerifier, Verdict, Witness,
};

/// Result type for proof engine operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::protocol::dlog_equality::schnorr_relation_holds;

    #[test]
    fn equality_relation_with_small_numbers() {
        let params = GroupParameters::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap();
        let (g1, g2) = (BigUint::from(4u32), BigUint::from(9u32));

        let s = BigUint::from(6u32);
        let r = BigUint::from(7u32);

        let t1 = params.exponentiate(&g1, &s).unwrap();
        let t2 = params.exponentiate(&g2, &s).unwrap();
        assert_eq!(t1, BigUint::from(2u32));
        assert_eq!(t2, BigUint::from(3u32));

        let x1 = params.exponentiate(&g1, &r).unwrap();
        let x2 = params.exponentiate(&g2, &r).unwrap();
        assert_eq!(x1, BigUint::from(8u32));
        assert_eq!(x2, BigUint::from(4u32));

        let c = BigUint::from(4u32);
        let z = params.add_exponents(&r, &params.multiply_exponents(&c, &s));
        assert_eq!(z, BigUint::from(9u32));

        assert!(schnorr_relation_holds(&params, &g1, &t1, &x1, &c, &z).unwrap());
        assert!(schnorr_relation_holds(&params, &g2, &t2, &x2, &c, &z).unwrap());
    }
}
