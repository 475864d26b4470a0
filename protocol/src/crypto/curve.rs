//! secp256k1 domain parameters (SEC 2, section 2.4.1).
//!
//! The heavy lifting (scalar multiplication, signing, recovery) is done by
//! libsecp256k1 through the `secp256k1` crate. The parameters here are the
//! arbitrary-precision view of the same curve, used for range checks on
//! signature values and for validating points that come back from recovery.
//! They are built once per process and never change afterwards.

use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;

use crate::config::{UNCOMPRESSED_POINT_MARKER, UNCOMPRESSED_PUBKEY_LENGTH};

/// Domain parameters of a short Weierstrass curve `y^2 = x^3 + B` over `F_P`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParams {
    /// Order of the underlying prime field.
    pub p: BigUint,
    /// Order of the base point.
    pub n: BigUint,
    /// `N / 2`, the upper bound for canonical (low-S) signatures.
    pub half_n: BigUint,
    /// Constant term of the curve equation.
    pub b: BigUint,
    /// Base point x coordinate.
    pub gx: BigUint,
    /// Base point y coordinate.
    pub gy: BigUint,
    /// Size of the underlying field in bits.
    pub bit_size: usize,
}

static SECP256K1: Lazy<CurveParams> = Lazy::new(|| {
    let n = hex_int("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
    CurveParams {
        p: hex_int("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F"),
        half_n: &n >> 1,
        n,
        b: BigUint::from(7u32),
        gx: hex_int("79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"),
        gy: hex_int("483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"),
        bit_size: 256,
    }
});

// Only ever called on the literals above.
fn hex_int(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

/// The process-wide secp256k1 parameters.
pub fn secp256k1() -> &'static CurveParams {
    &SECP256K1
}

impl CurveParams {
    /// Byte length of a field element.
    pub fn byte_len(&self) -> usize {
        (self.bit_size + 7) >> 3
    }

    /// Returns `true` if `(x, y)` is an affine point on the curve with
    /// both coordinates reduced modulo `P`.
    pub fn is_on_curve(&self, x: &BigUint, y: &BigUint) -> bool {
        if x >= &self.p || y >= &self.p {
            return false;
        }
        let lhs = (y * y) % &self.p;
        let rhs = (x * x * x + &self.b) % &self.p;
        lhs == rhs
    }

    /// Parses an uncompressed point and checks that it lies on the curve.
    /// Returns `None` for anything else, including the point at infinity.
    pub fn unmarshal(&self, bytes: &[u8]) -> Option<(BigUint, BigUint)> {
        let len = self.byte_len();
        if bytes.len() != UNCOMPRESSED_PUBKEY_LENGTH || bytes[0] != UNCOMPRESSED_POINT_MARKER {
            return None;
        }
        let x = BigUint::from_bytes_be(&bytes[1..1 + len]);
        let y = BigUint::from_bytes_be(&bytes[1 + len..]);
        if x.is_zero() && y.is_zero() {
            return None;
        }
        self.is_on_curve(&x, &y).then_some((x, y))
    }
}
