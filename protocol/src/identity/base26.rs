//! Base-26 codec used by branded addresses.
//!
//! The alphabet skips characters that are easy to confuse when read aloud
//! or handwritten (`0`, `1`, `E`, `I`, `L`, `M`, `O`, `U`, `V`, `X`), so the
//! digit for zero is `8`. Input bytes are read as one big-endian integer.
//! The encoded form is fixed width for a given input length, which keeps
//! every branded address the same length.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

/// Digit alphabet, index = digit value.
pub const ALPHABET: &[u8; 26] = b"83456729ABCDFGHJKNPQRSTWYZ";

const BASE: u32 = 26;

/// Error for a character outside [`ALPHABET`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid base-26 character {0:?}")]
pub struct InvalidCharacter(pub char);

/// Number of digits emitted for `byte_len` input bytes:
/// `ceil(8 * byte_len / log2(26))`.
pub fn encoded_width(byte_len: usize) -> usize {
    ((byte_len * 8) as f64 / (BASE as f64).log2()).ceil() as usize
}

/// Encodes `bytes` as fixed-width base-26 text, left-padded with the zero
/// digit.
pub fn encode(bytes: &[u8]) -> String {
    let width = encoded_width(bytes.len());
    let mut value = BigUint::from_bytes_be(bytes);
    let mut digits = Vec::with_capacity(width);
    let base = BigUint::from(BASE);

    while !value.is_zero() {
        let rem = (&value % &base).to_usize().unwrap_or_default();
        digits.push(ALPHABET[rem]);
        value /= &base;
    }
    while digits.len() < width {
        digits.push(ALPHABET[0]);
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decodes base-26 text into the minimal big-endian bytes of its value.
/// A string of zero digits (or the empty string) decodes to no bytes.
///
/// Matching is exact: callers upper-case first if they accept lower case.
pub fn decode(text: &str) -> Result<Vec<u8>, InvalidCharacter> {
    let mut value = BigUint::zero();
    for c in text.chars() {
        let digit = digit_value(c).ok_or(InvalidCharacter(c))?;
        value = value * BASE + digit;
    }
    if value.is_zero() {
        return Ok(Vec::new());
    }
    Ok(value.to_bytes_be())
}

fn digit_value(c: char) -> Option<u32> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&d| d == c as u8)
        .map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_for_address_payload() {
        assert_eq!(encoded_width(21), 36);
        assert_eq!(encoded_width(1), 2);
        assert_eq!(encoded_width(0), 0);
    }

    #[test]
    fn zero_bytes_encode_to_zero_digits() {
        assert_eq!(encode(&[0u8; 21]), "8".repeat(36));
        assert_eq!(decode(&"8".repeat(36)).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn small_values() {
        assert_eq!(encode(&[1]), "83");
        assert_eq!(encode(&[25]), "8Z");
        assert_eq!(encode(&[26]), "38");
        assert_eq!(decode("38").unwrap(), vec![26]);
        assert_eq!(decode("Z").unwrap(), vec![25]);
    }

    #[test]
    fn decode_strips_leading_zero_bytes() {
        let encoded = encode(&[0, 0, 7, 9]);
        assert_eq!(decode(&encoded).unwrap(), vec![7, 9]);
    }

    #[test]
    fn invalid_characters_rejected() {
        assert_eq!(decode("80"), Err(InvalidCharacter('0')));
        assert_eq!(decode("8a"), Err(InvalidCharacter('a')));
        assert_eq!(decode("8É"), Err(InvalidCharacter('É')));
    }

    #[test]
    fn alphabet_has_no_duplicates() {
        let mut sorted = ALPHABET.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 26);
    }
}
