//! Prime-order subgroup parameters and the modular arithmetic over them.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::encoding::hex_biguint;
use super::rng::{random_below, random_range};
use crate::{Error, Result};

/// Public parameters `(p, q, g)` of a discrete-log group.
///
/// `p` is the prime modulus, `q` the prime order of the subgroup of `Z_p^*`
/// generated by `g`. Construction through [`GroupParameters::new`] enforces
/// `q | p - 1`, `g != 1` and `g^q = 1 (mod p)`; deserialization goes through
/// the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupParameters")]
pub struct GroupParameters {
    #[serde(with = "hex_biguint")]
    p: BigUint,
    #[serde(with = "hex_biguint")]
    q: BigUint,
    #[serde(with = "hex_biguint")]
    g: BigUint,
}

/// Unchecked wire form of [`GroupParameters`].
#[derive(Deserialize)]
struct RawGroupParameters {
    #[serde(with = "hex_biguint")]
    p: BigUint,
    #[serde(with = "hex_biguint")]
    q: BigUint,
    #[serde(with = "hex_biguint")]
    g: BigUint,
}

impl TryFrom<RawGroupParameters> for GroupParameters {
    type Error = Error;

    fn try_from(raw: RawGroupParameters) -> Result<Self> {
        Self::new(raw.p, raw.q, raw.g)
    }
}

impl GroupParameters {
    /// Creates parameters after checking the group invariants.
    ///
    /// Primality of `p` and `q` is not re-tested here; parameters coming from
    /// [`generate_parameters`](crate::generate_parameters) are prime by
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] if any invariant fails.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        let one = BigUint::one();
        if p <= BigUint::from(3u32) || p.is_even() {
            return Err(Error::InvalidParameters(
                "modulus p must be an odd prime greater than 3".to_string(),
            ));
        }
        if q <= one || q >= p {
            return Err(Error::InvalidParameters(
                "subgroup order q must satisfy 1 < q < p".to_string(),
            ));
        }
        if !((&p - &one) % &q).is_zero() {
            return Err(Error::InvalidParameters(
                "q must divide p - 1".to_string(),
            ));
        }
        if g.is_zero() || g.is_one() || g >= p {
            return Err(Error::InvalidParameters(
                "generator g must lie in [2, p)".to_string(),
            ));
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(Error::InvalidParameters(
                "generator g does not have order q".to_string(),
            ));
        }

        Ok(Self { p, q, g })
    }

    /// Returns the modulus `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Returns the subgroup order `q`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Returns the generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Checks that `e` lies in `[0, q)`.
    pub fn validate_exponent(&self, e: &BigUint) -> Result<()> {
        if e >= &self.q {
            return Err(Error::InvalidInput(
                "exponent must be less than the subgroup order".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks that `e` is a nonzero residue modulo `p`.
    pub fn validate_element(&self, e: &BigUint) -> Result<()> {
        if e.is_zero() || e >= &self.p {
            return Err(Error::InvalidInput(
                "element must be a nonzero residue modulo p".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns whether `e` belongs to the order-`q` subgroup.
    pub fn contains(&self, e: &BigUint) -> bool {
        self.validate_element(e).is_ok() && e.modpow(&self.q, &self.p).is_one()
    }

    /// Checks that the received value `name` lies in the order-`q` subgroup.
    ///
    /// Residues outside it carry a component of order dividing `(p-1)/q`,
    /// which lets a prover satisfy a verification equation for a share of
    /// challenges without knowing any discrete log.
    pub fn validate_member(&self, name: &str, e: &BigUint) -> Result<()> {
        if !self.contains(e) {
            return Err(Error::InvalidInput(format!(
                "{name} is not in the order-q subgroup"
            )));
        }
        Ok(())
    }

    /// Computes `base^exponent mod p`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `exponent >= q` or `base` is not a residue.
    pub fn exponentiate(&self, base: &BigUint, exponent: &BigUint) -> Result<BigUint> {
        self.validate_exponent(exponent)?;
        self.validate_element(base)?;
        Ok(base.modpow(exponent, &self.p))
    }

    /// Computes `g^exponent mod p`.
    pub fn exponentiate_generator(&self, exponent: &BigUint) -> Result<BigUint> {
        self.exponentiate(&self.g, exponent)
    }

    /// Computes `a * b mod p`.
    pub fn multiply(&self, a: &BigUint, b: &BigUint) -> Result<BigUint> {
        self.validate_element(a)?;
        self.validate_element(b)?;
        Ok((a * b) % &self.p)
    }

    /// Computes `a^-1 mod p`.
    pub fn modular_inverse(&self, a: &BigUint) -> Result<BigUint> {
        self.validate_element(a)?;
        // p is prime, so a^(p-2) is the inverse of any nonzero residue.
        let exponent = &self.p - BigUint::from(2u32);
        Ok(a.modpow(&exponent, &self.p))
    }

    /// Computes `a + b mod q`.
    pub fn add_exponents(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.q
    }

    /// Computes `a * b mod q`.
    pub fn multiply_exponents(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.q
    }

    /// Reduces an arbitrary integer into `[0, q)`.
    pub fn reduce_exponent(&self, e: &BigUint) -> BigUint {
        e % &self.q
    }

    /// Draws a fresh exponent uniformly from `[0, q)`.
    pub fn random_exponent<R: CryptoRng + RngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        random_below(rng, &self.q)
    }

    /// Draws a fresh exponent uniformly from `[1, q)`.
    pub fn random_nonzero_exponent<R: CryptoRng + RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<BigUint> {
        random_range(rng, &BigUint::one(), &self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecureRng;

    // p = 23, q = 11, g = 4 (the subgroup of quadratic residues mod 23).
    fn small_group() -> GroupParameters {
        GroupParameters::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap()
    }

    #[test]
    fn rejects_broken_invariants() {
        let p = BigUint::from(23u32);
        let q = BigUint::from(11u32);

        assert!(GroupParameters::new(p.clone(), 7u32.into(), 4u32.into()).is_err());
        assert!(GroupParameters::new(p.clone(), q.clone(), 1u32.into()).is_err());
        // 5 generates the full group of order 22.
        assert!(GroupParameters::new(p.clone(), q.clone(), 5u32.into()).is_err());
        assert!(GroupParameters::new(24u32.into(), q, 4u32.into()).is_err());
    }

    #[test]
    fn exponentiate_matches_known_values() {
        let group = small_group();
        let y = group.exponentiate(group.g(), &6u32.into()).unwrap();
        assert_eq!(y, BigUint::from(2u32));
    }

    #[test]
    fn exponentiate_rejects_out_of_range_exponent() {
        let group = small_group();
        let err = group.exponentiate(group.g(), &11u32.into()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn operands_must_be_residues() {
        let group = small_group();
        assert!(group.multiply(&0u32.into(), &3u32.into()).is_err());
        assert!(group.multiply(&23u32.into(), &3u32.into()).is_err());
        assert!(group.exponentiate(&30u32.into(), &1u32.into()).is_err());
        assert!(group.modular_inverse(&0u32.into()).is_err());
    }

    #[test]
    fn inverse_multiplies_to_one() {
        let group = small_group();
        for a in 1u32..23 {
            let a = BigUint::from(a);
            let inv = group.modular_inverse(&a).unwrap();
            assert!(group.multiply(&a, &inv).unwrap().is_one());
        }
    }

    #[test]
    fn subgroup_membership() {
        let group = small_group();
        assert!(group.contains(&4u32.into()));
        assert!(group.contains(&1u32.into()));
        assert!(!group.contains(&5u32.into()));
        assert!(!group.contains(&0u32.into()));
    }

    #[test]
    fn validate_member_names_the_value() {
        let group = small_group();
        assert!(group.validate_member("b", &2u32.into()).is_ok());
        // 22 = -1 has order 2.
        let err = group.validate_member("b", &22u32.into()).unwrap_err();
        assert!(matches!(&err, Error::InvalidInput(msg) if msg.starts_with("b ")));
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let group: GroupParameters = toml::from_str("p = \"17\"\nq = \"0b\"\ng = \"04\"\n").unwrap();
        assert_eq!(group, small_group());

        for broken in [
            "p = \"17\"\nq = \"00\"\ng = \"04\"\n",
            "p = \"17\"\nq = \"0b\"\ng = \"01\"\n",
            "p = \"17\"\nq = \"0b\"\ng = \"05\"\n",
        ] {
            assert!(toml::from_str::<GroupParameters>(broken).is_err(), "{broken}");
        }
    }

    #[test]
    fn random_exponents_below_order() {
        let group = small_group();
        let mut rng = SecureRng::new();
        for _ in 0..100 {
            assert!(group.random_exponent(&mut rng).unwrap() < *group.q());
            assert!(!group.random_nonzero_exponent(&mut rng).unwrap().is_zero());
        }
    }
}
