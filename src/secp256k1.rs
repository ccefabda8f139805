//! The secp256k1 curve and ECDSA public-key recovery, the math behind the
//! ECRECOVER precompile.

use std::sync::LazyLock;

use ethereum_types::H160;
use sha3::{Digest, Keccak256};

use crate::arith::{ModArith, U256};
use crate::ecc::{self, AffinePoint, CurveParams, FieldElement};

type Address = H160;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Secp256k1;

static FP: LazyLock<ModArith<4>> = LazyLock::new(|| ModArith::new(Secp256k1::FIELD_PRIME));
static FR: LazyLock<ModArith<4>> = LazyLock::new(|| ModArith::new(Secp256k1::ORDER));

impl CurveParams for Secp256k1 {
    const A_IS_MINUS_3: bool = false;
    const FIELD_PRIME: U256 =
        U256::from_be_hex("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f");
    const ORDER: U256 =
        U256::from_be_hex("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
    const B: U256 = U256::from_u64(7);

    fn fp() -> &'static ModArith<4> {
        &FP
    }
}

/// The Montgomery context of the scalar field (the curve order n).
pub fn fr() -> &'static ModArith<4> {
    &FR
}

pub type Fp = FieldElement<Secp256k1>;

pub fn generator() -> AffinePoint<Secp256k1> {
    AffinePoint::new(
        Fp::from_uint(&U256::from_be_hex(
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        )),
        Fp::from_uint(&U256::from_be_hex(
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        )),
    )
}

/// Square root in the secp256k1 base field.
///
/// The field prime satisfies p ≡ 3 (mod 4), so a square root of x, when one
/// exists, is x^((p+1)/4). Returns `None` for quadratic non-residues.
pub fn field_sqrt(x: &Fp) -> Option<Fp> {
    // (p + 1) / 4 == ⌊p/4⌋ + 1 because p ≡ 3 (mod 4).
    let exp = Secp256k1::FIELD_PRIME.shr(2).wrapping_add(&U256::ONE);
    let candidate = x.pow(&exp);
    if candidate.square() == *x {
        Some(candidate)
    } else {
        None
    }
}

/// The y coordinate with the requested parity for a given x coordinate, or
/// `None` when x is not on the curve.
pub fn calculate_y(x: &Fp, y_parity: bool) -> Option<Fp> {
    let b = Fp::from_uint(&Secp256k1::B);
    let y = field_sqrt(&(x.square() * *x + b))?;
    if y.to_uint().is_odd() == y_parity {
        Some(y)
    } else {
        Some(-y)
    }
}

/// Converts an uncompressed public key to an Ethereum address: the last
/// 20 bytes of the Keccak-256 hash of `x ‖ y`.
pub fn to_address(pt: &AffinePoint<Secp256k1>) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(pt.to_bytes());
    Address::from_slice(&hasher.finalize()[12..])
}

/// Recovers the public key of an ECDSA signature over secp256k1.
///
/// The x coordinate of the nonce point is taken to be `r` itself; the
/// `r + n` candidate is not considered, matching the Ethereum precompile.
pub fn ecdsa_recover(
    hash: &[u8; 32],
    r_bytes: &[u8; 32],
    s_bytes: &[u8; 32],
    parity: bool,
) -> Option<AffinePoint<Secp256k1>> {
    let n = fr();
    let order = *n.modulus();

    let r = U256::from_be_bytes(r_bytes);
    let s = U256::from_be_bytes(s_bytes);
    if r.is_zero() || r >= order || s.is_zero() || s >= order {
        return None;
    }

    // Reconstruct the nonce point R = (r, ±y).
    let x = Fp::from_uint(&r);
    let y = calculate_y(&x, parity)?;
    let nonce = AffinePoint::new(x, y);

    // The message hash as a scalar; one conditional subtraction suffices
    // because the hash is below 2n.
    let mut z = U256::from_be_bytes(hash);
    if z >= order {
        z = z.wrapping_sub(&order);
    }

    // Q = r⁻¹·(s·R − z·G) = [-z·r⁻¹]G ⊕ [s·r⁻¹]R.
    let r_inv = n.inv(&n.to_mont(&r));
    let u1 = n.neg(&n.from_mont(&n.mul(&n.to_mont(&z), &r_inv)));
    let u2 = n.from_mont(&n.mul(&n.to_mont(&s), &r_inv));

    let q = ecc::msm2(&u1, &generator(), &u2, &nonce);
    if q.is_infinity() {
        return None;
    }
    Some(ecc::to_affine(&q))
}

/// Full ECRECOVER: recovers the signer and converts it to an address.
pub fn ecrecover(
    hash: &[u8; 32],
    r_bytes: &[u8; 32],
    s_bytes: &[u8; 32],
    parity: bool,
) -> Option<Address> {
    let pt = ecdsa_recover(hash, r_bytes, s_bytes, parity)?;
    Some(to_address(&pt))
}
