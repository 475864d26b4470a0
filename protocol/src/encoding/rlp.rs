//! # Recursive Length Prefix
//!
//! The canonical serialization behind every transaction hash and the
//! transaction wire format. Two encoders that disagree on a single byte
//! produce different hashes, so the encoder here is deliberately boring
//! and the decoder is strict: anything that is not the *one* canonical
//! encoding of its value is rejected.
//!
//! ```text
//! single byte < 0x80        -> itself
//! string, len < 56          -> 0x80 + len, bytes
//! string, len >= 56         -> 0xb7 + len(len), len (BE), bytes
//! list,   payload < 56      -> 0xc0 + len, payload
//! list,   payload >= 56     -> 0xf7 + len(len), len (BE), payload
//! ```
//!
//! Integers are strings of their minimal big-endian bytes; zero is the
//! empty string.

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

use crate::config::ADDRESS_LENGTH;
use crate::identity::Address;

const STRING_OFFSET: u8 = 0x80;
const LONG_STRING_OFFSET: u8 = 0xb7;
const LIST_OFFSET: u8 = 0xc0;
const LONG_LIST_OFFSET: u8 = 0xf7;
const SHORT_LIMIT: usize = 56;

/// Deepest list nesting the decoder accepts. A transaction needs two.
pub const MAX_DEPTH: usize = 16;

/// Errors from the strict decoder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RlpError {
    /// Input ended before the announced length.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// Bytes left over after the top-level item.
    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),

    /// A length or value that has a shorter canonical encoding.
    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    /// Expected a string, found a list, or the other way round.
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        /// What the caller asked for.
        expected: &'static str,
        /// What was there.
        found: &'static str,
    },

    /// A string that does not fit the target type.
    #[error("value too large for {0}")]
    Overflow(&'static str),

    /// A list with the wrong number of fields.
    #[error("expected {expected} list items, got {got}")]
    ItemCount {
        /// Required number of items.
        expected: usize,
        /// Number of items present.
        got: usize,
    },

    /// A string field that must be valid UTF-8 is not.
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    /// Lists nested deeper than [`MAX_DEPTH`].
    #[error("lists nested deeper than {MAX_DEPTH}")]
    TooDeep,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn length_bytes(len: usize) -> Vec<u8> {
    let raw = (len as u64).to_be_bytes();
    let skip = raw.iter().take_while(|b| **b == 0).count();
    raw[skip..].to_vec()
}

fn encode_header(len: usize, short: u8, long: u8, out: &mut Vec<u8>) {
    if len < SHORT_LIMIT {
        out.push(short + len as u8);
    } else {
        let len_bytes = length_bytes(len);
        out.push(long + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

/// Encodes a byte string.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < STRING_OFFSET {
        return data.to_vec();
    }
    let mut out = Vec::with_capacity(data.len() + 9);
    encode_header(data.len(), STRING_OFFSET, LONG_STRING_OFFSET, &mut out);
    out.extend_from_slice(data);
    out
}

/// Encodes text as its UTF-8 bytes.
pub fn encode_str(s: &str) -> Vec<u8> {
    encode_bytes(s.as_bytes())
}

/// Encodes an unsigned integer as its minimal big-endian bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let raw = value.to_be_bytes();
    let skip = raw.iter().take_while(|b| **b == 0).count();
    encode_bytes(&raw[skip..])
}

/// Encodes an arbitrary-precision integer. Zero is the empty string.
pub fn encode_biguint(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return encode_bytes(&[]);
    }
    encode_bytes(&value.to_bytes_be())
}

/// Encodes an optional address. Absent is the empty string, which can
/// never collide with a present (always 20-byte) address.
pub fn encode_address(addr: Option<&Address>) -> Vec<u8> {
    match addr {
        Some(a) => encode_bytes(a.as_bytes()),
        None => encode_bytes(&[]),
    }
}

/// Wraps already-encoded items in a list header.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_len + 9);
    encode_header(payload_len, LIST_OFFSET, LONG_LIST_OFFSET, &mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded item borrowing from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem<'a> {
    /// A byte string.
    Bytes(&'a [u8]),
    /// A list of items.
    List(Vec<RlpItem<'a>>),
}

impl<'a> RlpItem<'a> {
    fn kind(&self) -> &'static str {
        match self {
            RlpItem::Bytes(_) => "string",
            RlpItem::List(_) => "list",
        }
    }

    /// The raw bytes of a string item.
    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            other => Err(RlpError::UnexpectedKind {
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    /// The elements of a list item.
    pub fn as_list(&self) -> Result<&[RlpItem<'a>], RlpError> {
        match self {
            RlpItem::List(items) => Ok(items),
            other => Err(RlpError::UnexpectedKind {
                expected: "list",
                found: other.kind(),
            }),
        }
    }

    /// The elements of a list item, which must have exactly `n` of them.
    pub fn as_list_of(&self, n: usize) -> Result<&[RlpItem<'a>], RlpError> {
        let items = self.as_list()?;
        if items.len() != n {
            return Err(RlpError::ItemCount {
                expected: n,
                got: items.len(),
            });
        }
        Ok(items)
    }

    fn integer_bytes(&self) -> Result<&'a [u8], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::NonCanonical("integer with leading zero"));
        }
        Ok(bytes)
    }

    /// A `u64` integer.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.integer_bytes()?;
        if bytes.len() > 8 {
            return Err(RlpError::Overflow("u64"));
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// A `u16` integer.
    pub fn as_u16(&self) -> Result<u16, RlpError> {
        u16::try_from(self.as_u64()?).map_err(|_| RlpError::Overflow("u16"))
    }

    /// A `u8` integer.
    pub fn as_u8(&self) -> Result<u8, RlpError> {
        u8::try_from(self.as_u64()?).map_err(|_| RlpError::Overflow("u8"))
    }

    /// An arbitrary-precision integer.
    pub fn as_biguint(&self) -> Result<BigUint, RlpError> {
        Ok(BigUint::from_bytes_be(self.integer_bytes()?))
    }

    /// A UTF-8 string.
    pub fn as_string(&self) -> Result<String, RlpError> {
        String::from_utf8(self.as_bytes()?.to_vec()).map_err(|_| RlpError::InvalidUtf8)
    }

    /// An optional address: empty string is `None`, 20 bytes is `Some`.
    pub fn as_address(&self) -> Result<Option<Address>, RlpError> {
        let bytes = self.as_bytes()?;
        match bytes.len() {
            0 => Ok(None),
            ADDRESS_LENGTH => Ok(Some(Address::from_slice(bytes))),
            _ => Err(RlpError::UnexpectedKind {
                expected: "20-byte address",
                found: "string of another length",
            }),
        }
    }
}

/// Decodes exactly one item spanning all of `input`.
pub fn decode(input: &[u8]) -> Result<RlpItem<'_>, RlpError> {
    let (item, rest) = decode_item(input, 0)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }
    Ok(item)
}

fn decode_item(input: &[u8], depth: usize) -> Result<(RlpItem<'_>, &[u8]), RlpError> {
    let (&prefix, after) = input.split_first().ok_or(RlpError::UnexpectedEnd)?;

    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(&input[..1]), after)),
        0x80..=0xbf => {
            let (len, body) = read_length(prefix, STRING_OFFSET, LONG_STRING_OFFSET, after)?;
            let (data, rest) = take(body, len)?;
            if len == 1 && data[0] < STRING_OFFSET {
                return Err(RlpError::NonCanonical("single byte wrapped in string header"));
            }
            Ok((RlpItem::Bytes(data), rest))
        }
        _ => {
            if depth == MAX_DEPTH {
                return Err(RlpError::TooDeep);
            }
            let (len, body) = read_length(prefix, LIST_OFFSET, LONG_LIST_OFFSET, after)?;
            let (mut payload, rest) = take(body, len)?;
            let mut items = Vec::new();
            while !payload.is_empty() {
                let (item, remaining) = decode_item(payload, depth + 1)?;
                items.push(item);
                payload = remaining;
            }
            Ok((RlpItem::List(items), rest))
        }
    }
}

fn read_length(prefix: u8, short: u8, long: u8, input: &[u8]) -> Result<(usize, &[u8]), RlpError> {
    if prefix <= long {
        return Ok(((prefix - short) as usize, input));
    }
    let len_of_len = (prefix - long) as usize;
    let (len_bytes, rest) = take(input, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical("length with leading zero"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::Overflow("length"));
    }
    let len = len_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
    if len < SHORT_LIMIT {
        return Err(RlpError::NonCanonical("long header for short payload"));
    }
    Ok((len, rest))
}

fn take(input: &[u8], n: usize) -> Result<(&[u8], &[u8]), RlpError> {
    if input.len() < n {
        return Err(RlpError::UnexpectedEnd);
    }
    Ok(input.split_at(n))
}
