//! Error types for the discrete-log proof engine.

/// Main error types for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bit-length preconditions or group invariants were violated.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The entropy source could not produce randomness.
    ///
    /// Retryable: start a fresh session once the source recovers.
    #[error("Randomness failure: {0}")]
    RandomnessFailure(String),

    /// An exponent was outside `[0, q)`, an element was not a residue of `p`,
    /// or a message arrived that the current protocol step does not accept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The revealed challenge does not open the commitment received earlier.
    #[error("Commitment mismatch: revealed challenge does not open the stored commitment")]
    CommitmentMismatch,

    /// The final verification equations did not hold.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// The channel carrying protocol messages is broken.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// The peer aborted the session.
    #[error("Session cancelled by peer: {0}")]
    Cancelled(String),
}
