//! Serde helpers for the ledger's JSON number and byte formats.
//!
//! The ledger writes every integer as a `0x`-prefixed hex quantity with no
//! leading zeros (`"0x0"`, `"0x3b9aca00"`) and byte strings as `0x` hex.
//! Amounts and prices are the exception: those are base-10 strings.
//! When reading we are more forgiving: decimal strings and plain JSON
//! numbers are accepted as well, since hand-written requests use them.
//!
//! Use with `#[serde(with = "crate::encoding::hexfmt::quantity")]` and friends.

use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityInput {
    Number(u64),
    Text(String),
}

fn parse_biguint(text: &str) -> Result<BigUint, String> {
    let text = text.trim();
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    if digits.is_empty() {
        return Err(format!("empty quantity {:?}", text));
    }
    BigUint::from_str_radix(digits, radix).map_err(|e| format!("invalid quantity {:?}: {}", text, e))
}

/// Formats a big integer as a hex quantity.
pub fn biguint_to_quantity(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// `u64` as a hex quantity.
pub mod quantity {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match QuantityInput::deserialize(deserializer)? {
            QuantityInput::Number(n) => Ok(n),
            QuantityInput::Text(s) => {
                let big = parse_biguint(&s).map_err(serde::de::Error::custom)?;
                u64::try_from(big)
                    .map_err(|_| serde::de::Error::custom(format!("quantity {:?} overflows u64", s)))
            }
        }
    }
}

/// Arbitrary-precision integer as a hex quantity.
pub mod big_quantity {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&biguint_to_quantity(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        match QuantityInput::deserialize(deserializer)? {
            QuantityInput::Number(n) => Ok(BigUint::from(n)),
            QuantityInput::Text(s) => parse_biguint(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Arbitrary-precision integer as a base-10 string, the ledger's format
/// for amounts and prices.
pub mod decimal {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        super::big_quantity::deserialize(deserializer)
    }
}

/// Byte string as `0x` hex. `null` and `""` read as empty.
pub mod bytes {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let stripped = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(&text);
        hex::decode(stripped).map_err(serde::de::Error::custom)
    }
}
