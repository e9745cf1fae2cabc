//! Cryptographically secure randomness and big-integer sampling.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::{Error, Result};

/// Cryptographically secure random number generator.
///
/// This is a thin wrapper around `OsRng` that provides a consistent interface
/// for cryptographic randomness throughout the library.
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

fn fill<R: RngCore + ?Sized>(rng: &mut R, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf)
        .map_err(|e| Error::RandomnessFailure(e.to_string()))
}

/// Samples an integer uniformly from `[0, bound)` by rejection sampling.
///
/// Entropy-source failures surface as [`Error::RandomnessFailure`] instead of
/// panicking.
pub fn random_below<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(Error::InvalidInput(
            "sampling bound must be positive".to_string(),
        ));
    }

    let bits = bound.bits() as usize;
    let mut buf = vec![0u8; bits.div_ceil(8)];
    let excess = buf.len() * 8 - bits;

    loop {
        fill(rng, &mut buf)?;
        buf[0] &= 0xFF >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Samples an integer uniformly from `[low, high)`.
pub fn random_range<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low >= high {
        return Err(Error::InvalidInput(
            "empty sampling range".to_string(),
        ));
    }
    Ok(random_below(rng, &(high - low))? + low)
}

/// Draws an odd candidate of exactly `bytes * 8` bits (top and bottom bits set).
pub fn random_odd_candidate<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    bytes: usize,
) -> Result<BigUint> {
    let mut buf = vec![0u8; bytes];
    fill(rng, &mut buf)?;
    if let Some(last) = buf.last_mut() {
        *last |= 1;
    }
    if let Some(first) = buf.first_mut() {
        *first |= 0x80;
    }
    Ok(BigUint::from_bytes_be(&buf))
}

#[cfg(test)]
mod tests {
    use num_integer::Integer;

    use super::*;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> core::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn random_below_stays_in_range() {
        let mut rng = SecureRng::new();
        let bound = BigUint::from(11u32);
        for _ in 0..200 {
            assert!(random_below(&mut rng, &bound).unwrap() < bound);
        }
    }

    #[test]
    fn random_below_rejects_zero_bound() {
        let mut rng = SecureRng::new();
        assert!(matches!(
            random_below(&mut rng, &BigUint::zero()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn random_range_respects_lower_bound() {
        let mut rng = SecureRng::new();
        let low = BigUint::from(2u32);
        let high = BigUint::from(5u32);
        for _ in 0..100 {
            let v = random_range(&mut rng, &low, &high).unwrap();
            assert!(v >= low && v < high);
        }
    }

    #[test]
    fn odd_candidate_has_exact_width() {
        let mut rng = SecureRng::new();
        for _ in 0..50 {
            let c = random_odd_candidate(&mut rng, 2).unwrap();
            assert_eq!(c.bits(), 16);
            assert!(c.is_odd());
        }
    }

    #[test]
    fn entropy_failure_is_reported() {
        let err = random_below(&mut BrokenRng, &BigUint::from(100u32)).unwrap_err();
        assert!(matches!(err, Error::RandomnessFailure(_)));

        let err = random_odd_candidate(&mut BrokenRng, 4).unwrap_err();
        assert!(matches!(err, Error::RandomnessFailure(_)));
    }
}
