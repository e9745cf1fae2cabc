/// Blinded equality proof with a publishable transcript.
pub mod blinded;
/// Plain discrete-log equality proof.
pub mod dlog_equality;
/// Witness, statement, variant tag and verdict.
pub mod gadgets;
/// Messages exchanged between the parties.
pub mod messages;
/// Pedersen commitments binding the verifier's challenge.
pub mod pedersen;
/// Schnorr identification (Sigma, ZKP, ZKPOK).
pub mod schnorr;

pub use blinded::{
    verify_blinded_transcript, BlindedVerdict, BlindedVerifier, BlindedVerifierAwaitingProof,
};
pub use dlog_equality::{
    EqualityProver, EqualityProverAwaitingChallenge, EqualityVerifier,
    EqualityVerifierAwaitingProof,
};
pub use gadgets::{EqualityStatement, ProtocolVariant, Verdict, Witness};
pub use messages::{
    Challenge, ChallengeReveal, CommitmentReply, EqualityRandomData, Message, OpeningMessage,
    ProofData, PublishableTranscript, SchnorrRandomData, VerifierChallenge,
};
pub use pedersen::{CommittedReceiver, IssuedCommitment, PedersenCommitter, PedersenReceiver};
pub use schnorr::{
    ProverAwaitingChallenge, ProverAwaitingCommitment, SchnorrProver, SchnorrVerifier,
    VerifierAwaitingProof, VerifierAwaitingRandomData,
};
