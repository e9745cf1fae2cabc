//! Core mathematical building blocks of the proof engine.
//!
//! This module contains the discrete-log group and everything that works on
//! it without knowing about any protocol:
//! - **rng**: Secure randomness and big-integer sampling
//! - **group**: Group parameters and modular arithmetic
//! - **params**: Parameter generation and primality testing via `crypto-primes`
//! - **transcript**: Fiat-Shamir transform for publishable transcripts
//! - **encoding**: Hex serde adapters for big integers

/// Hex serde adapters for big integers.
pub mod encoding;
/// Group parameters and modular arithmetic.
pub mod group;
/// Parameter generation.
pub mod params;
/// Secure randomness.
pub mod rng;
/// Transcript for Fiat-Shamir transform.
pub mod transcript;

pub use group::GroupParameters;
pub use params::{
    derive_generator, generate_parameters, generate_parameters_with_rng, is_probable_prime,
    random_generator,
};
pub use rng::SecureRng;
pub use transcript::Transcript;
