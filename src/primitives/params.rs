//! Generation of discrete-log group parameters of a requested strength.
//!
//! Follows the DSA approach: a random `N`-bit prime `q`, then a search for an
//! `L`-bit prime `p` with `p = 1 (mod q)`, then `g = h^((p-1)/q)` for the
//! smallest `h >= 2` giving `g != 1`.

use crypto_bigint::{BoxedUint, Limb};
use crypto_primes::RandomPrimeWithRng;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use super::group::GroupParameters;
use super::rng::{random_odd_candidate, random_range, SecureRng};
use crate::{Error, Result};

/// `p` candidates drawn per `q` are bounded by this factor times `L`.
const P_CANDIDATES_PER_MODULUS_BIT: usize = 4;

/// Generates group parameters with an `N`-bit subgroup order and `L`-bit modulus.
///
/// # Errors
///
/// - [`Error::InvalidParameters`] unless `N` and `L` are positive multiples of 8 with `N < L`
/// - [`Error::RandomnessFailure`] if the entropy source fails
///
/// # Examples
///
/// ```rust
/// use dlog_zkpok::generate_parameters;
///
/// let params = generate_parameters(8, 16).unwrap();
/// assert_eq!(params.q().bits(), 8);
/// ```
pub fn generate_parameters(subgroup_bits: usize, modulus_bits: usize) -> Result<GroupParameters> {
    generate_parameters_with_rng(&mut SecureRng::new(), subgroup_bits, modulus_bits)
}

/// Same as [`generate_parameters`] with a caller-supplied RNG.
pub fn generate_parameters_with_rng<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    subgroup_bits: usize,
    modulus_bits: usize,
) -> Result<GroupParameters> {
    check_bit_lengths(subgroup_bits, modulus_bits)?;

    let one = BigUint::one();
    let mut q_attempts = 0usize;

    let (p, q) = 'search: loop {
        let q = random_odd_candidate(rng, subgroup_bits / 8)?;
        if !is_probable_prime(rng, &q)? {
            continue;
        }
        q_attempts += 1;

        for _ in 0..P_CANDIDATES_PER_MODULUS_BIT * modulus_bits {
            let candidate = random_odd_candidate(rng, modulus_bits / 8)?;
            // Shift the candidate down onto the residue class 1 mod q.
            let rem = &candidate % &q;
            let p = candidate + &one - rem;
            if p.bits() as usize != modulus_bits {
                continue;
            }
            if is_probable_prime(rng, &p)? {
                break 'search (p, q);
            }
        }

        debug!(q_attempts, "exhausted modulus candidates, resampling q");
    };

    let g = derive_generator(&p, &q)?;
    let params = GroupParameters::new(p, q, g)?;

    info!(
        subgroup_bits,
        modulus_bits,
        q_attempts,
        q = %params.q(),
        p = %params.p(),
        g = %params.g(),
        "generated group parameters"
    );

    Ok(params)
}

/// Checks the `N`/`L` preconditions of parameter generation.
pub fn check_bit_lengths(subgroup_bits: usize, modulus_bits: usize) -> Result<()> {
    if subgroup_bits == 0 || modulus_bits == 0 {
        return Err(Error::InvalidParameters(
            "bit lengths must be positive".to_string(),
        ));
    }
    if subgroup_bits % 8 != 0 || modulus_bits % 8 != 0 {
        return Err(Error::InvalidParameters(format!(
            "bit lengths must be multiples of 8 (N = {subgroup_bits}, L = {modulus_bits})"
        )));
    }
    if subgroup_bits >= modulus_bits {
        return Err(Error::InvalidParameters(format!(
            "subgroup bits must be smaller than modulus bits (N = {subgroup_bits}, L = {modulus_bits})"
        )));
    }
    Ok(())
}

/// Returns `h^((p-1)/q) mod p` for the smallest `h >= 2` where that is not 1.
pub fn derive_generator(p: &BigUint, q: &BigUint) -> Result<BigUint> {
    let one = BigUint::one();
    if q <= &one || p <= q {
        return Err(Error::InvalidParameters(
            "derivation needs 1 < q < p".to_string(),
        ));
    }
    let (cofactor, rem) = (p - &one).div_rem(q);
    if !rem.is_zero() {
        return Err(Error::InvalidParameters(
            "q must divide p - 1".to_string(),
        ));
    }

    let mut h = BigUint::from(2u32);
    while &h < p {
        let g = h.modpow(&cofactor, p);
        if !g.is_one() {
            return Ok(g);
        }
        h += 1u32;
    }

    Err(Error::InvalidParameters(
        "no generator of the order-q subgroup exists".to_string(),
    ))
}

/// Draws a uniformly random generator of the order-`q` subgroup.
///
/// Two independent draws give generators with no known discrete-log relation,
/// as needed by the equality proofs.
pub fn random_generator<R: CryptoRng + RngCore + ?Sized>(
    params: &GroupParameters,
    rng: &mut R,
) -> Result<BigUint> {
    let one = BigUint::one();
    let p_minus_one = params.p() - &one;
    let cofactor = &p_minus_one / params.q();
    let two = BigUint::from(2u32);

    loop {
        let h = random_range(rng, &two, &p_minus_one)?;
        let g = h.modpow(&cofactor, params.p());
        if !g.is_one() {
            return Ok(g);
        }
    }
}

/// Probabilistic primality test backed by `crypto-primes`.
///
/// `n` is converted to a variable-width `BoxedUint`, which then goes through a
/// Baillie-PSW test plus one Miller-Rabin round with a random base.
pub fn is_probable_prime<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    n: &BigUint,
) -> Result<bool> {
    // The random-base round needs room for a base in [3, n - 2].
    if n <= &BigUint::from(7u32) {
        return Ok([2u32, 3, 5, 7].iter().any(|small| n == &BigUint::from(*small)));
    }
    let candidate = to_boxed_uint(n)?;
    Ok(candidate.is_prime_with_rng(&mut &mut *rng))
}

fn to_boxed_uint(n: &BigUint) -> Result<BoxedUint> {
    let bytes = n.to_bytes_be();
    let precision = (bytes.len() as u32 * 8).div_ceil(Limb::BITS) * Limb::BITS;
    BoxedUint::from_be_slice(&bytes, precision).map_err(|err| {
        Error::InvalidParameters(format!("cannot convert candidate for primality test: {err:?}"))
    })
}
