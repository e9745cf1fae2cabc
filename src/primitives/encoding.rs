//! Hex string encoding of big integers for serde.
//!
//! Used as `#[serde(with = "crate::primitives::encoding::hex_biguint")]`.

use num_bigint::BigUint;

/// Encodes a big integer as big-endian lowercase hex.
pub fn to_hex(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

/// Decodes big-endian hex, accepting an optional `0x` prefix and odd lengths.
pub fn from_hex(s: &str) -> Result<BigUint, hex::FromHexError> {
    let digits = s.trim().trim_start_matches("0x");
    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))?
    } else {
        hex::decode(digits)?
    };
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Serde adapter for `BigUint` fields.
pub mod hex_biguint {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes `value` as a hex string.
    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_hex(value))
    }

    /// Reads a hex string, with or without `0x`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<BigUint>` fields.
pub mod hex_biguint_opt {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes `Some` as a hex string and `None` as a missing value.
    pub fn serialize<S>(value: &Option<BigUint>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&super::to_hex(v)),
            None => serializer.serialize_none(),
        }
    }

    /// Reads an optional hex string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigUint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::from_hex(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
