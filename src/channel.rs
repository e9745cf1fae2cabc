//! Message channel between prover and verifier, and drivers that run a whole
//! session over one.
//!
//! A [`Channel`] is bidirectional, ordered and blocking. Each driver walks its
//! party through the protocol, failing with
//! - [`Error::Cancelled`] when the peer sends [`Message::Abort`]
//! - [`Error::TransportFailure`] when the peer's end is gone
//! - [`Error::InvalidInput`] when a message arrives out of order
//!
//! Local failures are reported to the peer with a best-effort `Abort` before
//! they are returned. After the final check the verifier sends its verdict as
//! [`Message::Outcome`], so both drivers return the same [`Verdict`].

use rand::{CryptoRng, RngCore};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::protocol::{
    BlindedVerdict, BlindedVerifier, EqualityProver, EqualityVerifier, Message, SchnorrProver,
    SchnorrVerifier, Verdict, VerifierChallenge,
};
use crate::{Error, Result};

/// Ordered, blocking, bidirectional message transport.
pub trait Channel {
    /// Sends a message to the peer.
    fn send(&mut self, message: Message) -> Result<()>;

    /// Blocks until the next message from the peer arrives.
    fn recv(&mut self) -> Result<Message>;
}

/// In-process channel end backed by unbounded tokio queues.
///
/// `recv` blocks the calling thread, so use it from plain threads or
/// `tokio::task::spawn_blocking`, never directly inside an async task.
#[derive(Debug)]
pub struct InProcessChannel {
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl InProcessChannel {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }
}

impl Channel for InProcessChannel {
    fn send(&mut self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| Error::TransportFailure("peer closed the channel".to_string()))
    }

    fn recv(&mut self) -> Result<Message> {
        self.rx
            .blocking_recv()
            .ok_or_else(|| Error::TransportFailure("peer closed the channel".to_string()))
    }
}

fn receive<C: Channel + ?Sized>(channel: &mut C) -> Result<Message> {
    match channel.recv()? {
        Message::Abort { reason } => {
            warn!(%reason, "peer aborted the session");
            Err(Error::Cancelled(reason))
        }
        message => {
            debug!(kind = message.kind(), "received message");
            Ok(message)
        }
    }
}

fn unexpected(expected: &str, received: &Message) -> Error {
    Error::InvalidInput(format!(
        "expected {expected}, received {}",
        received.kind()
    ))
}

/// Tells the peer about a local failure before returning it.
fn abort_on_error<C: Channel + ?Sized, T>(channel: &mut C, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        if !matches!(error, Error::TransportFailure(_) | Error::Cancelled(_)) {
            let _ = channel.send(Message::Abort {
                reason: error.to_string(),
            });
        }
    }
    result
}

fn receive_outcome<C: Channel + ?Sized>(channel: &mut C) -> Result<Verdict> {
    match receive(channel)? {
        Message::Outcome(verdict) => Ok(verdict),
        other => Err(unexpected("Outcome", &other)),
    }
}

/// Runs the prover side of a Schnorr session.
pub fn prove_schnorr<C, R>(channel: &mut C, prover: SchnorrProver, rng: &mut R) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let result = prove_schnorr_steps(channel, prover, rng);
    abort_on_error(channel, result)
}

fn prove_schnorr_steps<C, R>(
    channel: &mut C,
    prover: SchnorrProver,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let (prover, data) = if prover.variant().commits_challenge() {
        let (prover, opening) = prover.open(rng)?;
        channel.send(Message::Opening(opening))?;
        let reply = match receive(channel)? {
            Message::CommitmentReply(reply) => reply,
            other => return Err(unexpected("CommitmentReply", &other)),
        };
        prover.receive_commitment(reply, rng)?
    } else {
        prover.commit(rng)?
    };
    channel.send(Message::SchnorrRandomData(data))?;

    let challenge = match receive(channel)? {
        Message::Challenge(c) => VerifierChallenge::Plain(c),
        Message::ChallengeReveal(reveal) => VerifierChallenge::Reveal(reveal),
        other => return Err(unexpected("Challenge", &other)),
    };
    let proof = prover.respond(challenge)?;
    channel.send(Message::ProofData(proof))?;

    receive_outcome(channel)
}

/// Runs the verifier side of a Schnorr session.
pub fn verify_schnorr<C, R>(
    channel: &mut C,
    verifier: SchnorrVerifier,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let result = verify_schnorr_steps(channel, verifier, rng);
    abort_on_error(channel, result)
}

fn verify_schnorr_steps<C, R>(
    channel: &mut C,
    verifier: SchnorrVerifier,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let verifier = if verifier.variant().commits_challenge() {
        let opening = match receive(channel)? {
            Message::Opening(opening) => opening,
            other => return Err(unexpected("OpeningMessage", &other)),
        };
        let (verifier, reply) = verifier.receive_opening(&opening, rng)?;
        channel.send(Message::CommitmentReply(reply))?;
        verifier
    } else {
        verifier.await_random_data()?
    };

    let data = match receive(channel)? {
        Message::SchnorrRandomData(data) => data,
        other => return Err(unexpected("ProofRandomData", &other)),
    };
    let (verifier, challenge) = verifier.receive_random_data(data, rng)?;
    channel.send(challenge.into())?;

    let proof = match receive(channel)? {
        Message::ProofData(proof) => proof,
        other => return Err(unexpected("ProofData", &other)),
    };
    let verdict = verifier.verify(&proof)?;
    channel.send(Message::Outcome(verdict))?;
    Ok(verdict)
}

/// Runs the prover side of a plain or blinded equality session.
///
/// The prover's messages are the same for both; only the verifier differs.
pub fn prove_dlog_equality<C, R>(
    channel: &mut C,
    prover: EqualityProver,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let result = prove_dlog_equality_steps(channel, prover, rng);
    abort_on_error(channel, result)
}

fn prove_dlog_equality_steps<C, R>(
    channel: &mut C,
    prover: EqualityProver,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let (prover, data) = prover.commit(rng)?;
    channel.send(Message::EqualityRandomData(data))?;

    let challenge = match receive(channel)? {
        Message::Challenge(c) => c,
        other => return Err(unexpected("Challenge", &other)),
    };
    let proof = prover.respond(&challenge)?;
    channel.send(Message::ProofData(proof))?;

    receive_outcome(channel)
}

/// Runs the verifier side of a plain equality session.
pub fn verify_dlog_equality<C, R>(
    channel: &mut C,
    verifier: EqualityVerifier,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let result = verify_dlog_equality_steps(channel, verifier, rng);
    abort_on_error(channel, result)
}

fn verify_dlog_equality_steps<C, R>(
    channel: &mut C,
    verifier: EqualityVerifier,
    rng: &mut R,
) -> Result<Verdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let data = match receive(channel)? {
        Message::EqualityRandomData(data) => data,
        other => return Err(unexpected("ProofRandomData", &other)),
    };
    let (verifier, challenge) = verifier.receive_random_data(data, rng)?;
    channel.send(Message::Challenge(challenge))?;

    let proof = match receive(channel)? {
        Message::ProofData(proof) => proof,
        other => return Err(unexpected("ProofData", &other)),
    };
    let verdict = verifier.verify(&proof)?;
    channel.send(Message::Outcome(verdict))?;
    Ok(verdict)
}

/// Runs the verifier side of a blinded equality session.
///
/// The prover only learns accept or reject; the transcript stays with the
/// caller.
pub fn verify_dlog_equality_blinded<C, R>(
    channel: &mut C,
    verifier: BlindedVerifier,
    rng: &mut R,
) -> Result<BlindedVerdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let result = verify_dlog_equality_blinded_steps(channel, verifier, rng);
    abort_on_error(channel, result)
}

fn verify_dlog_equality_blinded_steps<C, R>(
    channel: &mut C,
    verifier: BlindedVerifier,
    rng: &mut R,
) -> Result<BlindedVerdict>
where
    C: Channel + ?Sized,
    R: CryptoRng + RngCore + ?Sized,
{
    let data = match receive(channel)? {
        Message::EqualityRandomData(data) => data,
        other => return Err(unexpected("ProofRandomData", &other)),
    };
    let (verifier, challenge) = verifier.receive_random_data(data, rng)?;
    channel.send(Message::Challenge(challenge))?;

    let proof = match receive(channel)? {
        Message::ProofData(proof) => proof,
        other => return Err(unexpected("ProofData", &other)),
    };
    let verdict = verifier.verify(&proof)?;
    channel.send(Message::Outcome(verdict.verdict()))?;
    Ok(verdict)
}
