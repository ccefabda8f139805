//! ECDSA signature verification on the secp256r1 (NIST P-256) curve, the
//! math behind the P256VERIFY precompile of EIP-7951.

use std::sync::LazyLock;

use crate::arith::{ModArith, U256};
use crate::ecc::{self, AffinePoint, CurveParams, FieldElement};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Secp256r1;

static FP: LazyLock<ModArith<4>> = LazyLock::new(|| ModArith::new(Secp256r1::FIELD_PRIME));
static FR: LazyLock<ModArith<4>> = LazyLock::new(|| ModArith::new(Secp256r1::ORDER));

impl CurveParams for Secp256r1 {
    // a = p − 3 for this curve.
    const A_IS_MINUS_3: bool = true;
    const FIELD_PRIME: U256 =
        U256::from_be_hex("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
    const ORDER: U256 =
        U256::from_be_hex("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551");
    const B: U256 =
        U256::from_be_hex("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b");

    fn fp() -> &'static ModArith<4> {
        &FP
    }
}

pub type Fp = FieldElement<Secp256r1>;

pub fn generator() -> AffinePoint<Secp256r1> {
    AffinePoint::new(
        Fp::from_uint(&U256::from_be_hex(
            "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
        )),
        Fp::from_uint(&U256::from_be_hex(
            "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
        )),
    )
}

fn is_on_curve(p: &AffinePoint<Secp256r1>) -> bool {
    // y² == x³ + a·x + b with a = −3.
    let one = Fp::one();
    let three = one + one + one;
    let b = Fp::from_uint(&Secp256r1::B);
    p.y.square() == p.x.square() * p.x - three * p.x + b
}

/// ECDSA verification per EIP-7951.
///
/// Follows the standard equation: with `u₁ = z·s⁻¹` and `u₂ = r·s⁻¹` modulo
/// the curve order, the signature is valid iff the x coordinate of
/// `u₁·G ⊕ u₂·Q` is congruent to `r`.
pub fn verify(hash: &[u8; 32], r: &U256, s: &U256, qx: &U256, qy: &U256) -> bool {
    let n = &*FR;
    let order = *n.modulus();

    // r and s must be within [1, n-1].
    if r.is_zero() || *r >= order || s.is_zero() || *s >= order {
        return false;
    }

    // The public key must have canonical coordinates, must not be the
    // identity, and must lie on the curve.
    if *qx >= Secp256r1::FIELD_PRIME || *qy >= Secp256r1::FIELD_PRIME {
        return false;
    }
    let q = AffinePoint::new(Fp::from_uint(qx), Fp::from_uint(qy));
    if q.is_infinity() {
        return false;
    }
    if !is_on_curve(&q) {
        return false;
    }

    // z is the hash read as a 256-bit integer; the curve order exceeds 2²⁵⁵,
    // so no reduction is needed before the modular multiplication below.
    let z = U256::from_be_bytes(hash);
    let z = if z >= order { z.wrapping_sub(&order) } else { z };

    // u₁ = z·s⁻¹ mod n, u₂ = r·s⁻¹ mod n.
    let s_inv = n.inv(&n.to_mont(s));
    let u1 = n.from_mont(&n.mul(&n.to_mont(&z), &s_inv));
    let u2 = n.from_mont(&n.mul(&n.to_mont(r), &s_inv));

    // R = u₁·G ⊕ u₂·Q; an infinity result cannot match any valid r.
    let big_r = ecc::msm2(&u1, &generator(), &u2, &q);
    if big_r.is_infinity() {
        return false;
    }

    // Accept iff x₁ ≡ r (mod n); one conditional subtraction reduces x₁.
    let mut x1 = ecc::to_affine(&big_r).x.to_uint();
    if x1 >= order {
        x1 = x1.wrapping_sub(&order);
    }
    x1 == *r
}
