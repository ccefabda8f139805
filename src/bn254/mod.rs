//! The BN254 (alt_bn128) curve group, its extension-field tower and the ate
//! pairing, behind the ECADD/ECMUL/ECPAIRING precompiles of EIP-196/197.

pub mod fp12;
pub mod fp2;
pub mod fp6;
pub mod pairing;

use std::sync::LazyLock;

use crate::arith::{BigUint, ModArith, U256};
use crate::ecc::{self, AffinePoint, CurveParams, FieldElement};

type U512 = BigUint<8>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bn254;

static FP: LazyLock<ModArith<4>> = LazyLock::new(|| ModArith::new(Bn254::FIELD_PRIME));

impl CurveParams for Bn254 {
    const A_IS_MINUS_3: bool = false;
    const FIELD_PRIME: U256 =
        U256::from_be_hex("30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd47");
    const ORDER: U256 =
        U256::from_be_hex("30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001");
    const B: U256 = U256::from_u64(3);

    fn fp() -> &'static ModArith<4> {
        &FP
    }
}

pub type Fp = FieldElement<Bn254>;

/// Endomorphism parameters: the eigenvalue λ of `(x, y) ↦ (β·x, y)` on the
/// scalar field, the matching cube root of unity β in the base field, and a
/// short basis of the lattice `{(a, b) : a + b·λ ≡ 0 (mod n)}` given as
/// `(X1, −Y1)` and `(X2, Y2)`.
pub const LAMBDA: U256 = U256::from_be_hex("b3c4d79d41a917585bfc41088d8daaa78b17ea66b99c90dd");
pub const BETA: U256 = U256::from_be_hex("59e26bcea0d48bacd4f263f1acdb5c4f5763473177fffffe");
const X1: U256 = U256::from_be_hex("6f4d8248eeb859fd95b806bca6f338ee");
const MINUS_Y1: U256 = U256::from_be_hex("6f4d8248eeb859fbf83e9682e87cfd45");
const X2: U256 = U256::from_be_hex("6f4d8248eeb859fc8211bbeb7d4f1128");
const Y2: U256 = U256::from_be_hex("6f4d8248eeb859fd0be4e1541221250b");

pub fn generator() -> AffinePoint<Bn254> {
    AffinePoint::new(
        Fp::from_uint(&U256::ONE),
        Fp::from_uint(&U256::from_u64(2)),
    )
}

/// Validates curve group membership: `y² == x³ + 3`, with `(0, 0)` accepted
/// as the point at infinity.
pub fn validate(pt: &AffinePoint<Bn254>) -> bool {
    let yy = pt.y.square();
    let xxx = pt.x.square() * pt.x;
    let on_curve = yy == xxx + Fp::from_uint(&Bn254::B);
    on_curve || pt.is_infinity()
}

/// Point addition in the curve group.
pub fn add(p: &AffinePoint<Bn254>, q: &AffinePoint<Bn254>) -> AffinePoint<Bn254> {
    ecc::add_affine(p, q)
}

/// Scalar multiplication `[c]P` through the GLV endomorphism: the scalar is
/// split into two half-length parts driving one Straus–Shamir pass over `P`
/// and `(β·x, ±y)`.
pub fn mul(pt: &AffinePoint<Bn254>, c: &U256) -> AffinePoint<Bn254> {
    let mut c = *c;
    loop {
        let (reduced, less) = c.overflowing_sub(&Bn254::ORDER);
        if less {
            break;
        }
        c = reduced;
    }

    let ((k1_neg, k1), (k2_neg, k2)) = decompose(&c);

    let p1 = if k1_neg { -*pt } else { *pt };
    let endo = AffinePoint::new(pt.x * Fp::from_uint(&BETA), pt.y);
    let p2 = if k2_neg { -endo } else { endo };

    ecc::to_affine(&ecc::msm2(&k1, &p1, &k2, &p2))
}

fn widen(x: &U256) -> U512 {
    let a = x.as_limbs();
    U512::from_limbs([a[0], a[1], a[2], a[3], 0, 0, 0, 0])
}

fn narrow(x: &U512) -> U256 {
    let a = x.as_limbs();
    debug_assert!(a[4..].iter().all(|&w| w == 0));
    U256::from_limbs([a[0], a[1], a[2], a[3]])
}

fn mul_512(a: &U256, b: &U256) -> U512 {
    let (lo, hi) = a.mul_wide(b);
    let lo = lo.as_limbs();
    let hi = hi.as_limbs();
    U512::from_limbs([lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]])
}

fn round_div(a: &U512, d: &U512) -> U512 {
    let (q, r) = a.div_rem(d);
    if r.wrapping_add(&r) > *d {
        q.wrapping_add(&U512::ONE)
    } else {
        q
    }
}

/// Splits a reduced scalar `c` into `(k₁, k₂)` with `k₁ + k₂·λ ≡ c (mod n)`
/// and both magnitudes near √n, by Babai rounding against the lattice basis.
/// Each half comes back as a sign flag plus magnitude.
fn decompose(c: &U256) -> ((bool, U256), (bool, U256)) {
    let det = mul_512(&X1, &Y2).wrapping_add(&mul_512(&X2, &MINUS_Y1));

    // The rational solution of (c, 0) = α·v1 + β·v2, rounded to integers.
    let m1 = narrow(&round_div(&mul_512(c, &Y2), &det));
    let m2 = narrow(&round_div(&mul_512(c, &MINUS_Y1), &det));

    // k₁ = c − m1·X1 − m2·X2
    let s = mul_512(&m1, &X1).wrapping_add(&mul_512(&m2, &X2));
    let c_wide = widen(c);
    let k1 = if s <= c_wide {
        (false, narrow(&c_wide.wrapping_sub(&s)))
    } else {
        (true, narrow(&s.wrapping_sub(&c_wide)))
    };

    // k₂ = m1·Y1 − m2·Y2
    let t1 = mul_512(&m1, &MINUS_Y1);
    let t2 = mul_512(&m2, &Y2);
    let k2 = if t2 <= t1 {
        (false, narrow(&t1.wrapping_sub(&t2)))
    } else {
        (true, narrow(&t2.wrapping_sub(&t1)))
    };

    (k1, k2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::to_affine;

    #[test]
    fn generator_is_valid() {
        assert!(validate(&generator()));
        assert!(validate(&AffinePoint::infinity()));
        let off = AffinePoint::new(Fp::from_uint(&U256::ONE), Fp::zero());
        assert!(!validate(&off));
    }

    #[test]
    fn decompose_satisfies_the_lattice_identity() {
        let n = ModArith::new(Bn254::ORDER);
        let lambda = n.to_mont(&LAMBDA);
        for c in [
            U256::ZERO,
            U256::ONE,
            U256::from_u64(0xdead_beef),
            Bn254::ORDER.wrapping_sub(&U256::ONE),
            U256::from_be_hex("2a3c4d79d41a917585bfc41088d8daaa78b17ea66b99c90dd5763473177fffff"),
        ] {
            let ((k1_neg, k1), (k2_neg, k2)) = decompose(&c);
            assert!(k1.bit_width() <= 129, "k1 too large for {c:?}");
            assert!(k2.bit_width() <= 129, "k2 too large for {c:?}");

            // k1 + k2·λ ≡ c (mod n), respecting the signs.
            let k1_mod = if k1_neg { n.neg(&k1) } else { k1 };
            let k2_l = n.from_mont(&n.mul(&n.to_mont(&k2), &lambda));
            let k2_mod = if k2_neg { n.neg(&k2_l) } else { k2_l };
            assert_eq!(n.add(&k1_mod, &k2_mod), c, "identity failed for {c:?}");
        }
    }

    #[test]
    fn glv_mul_matches_the_plain_ladder() {
        let g = generator();
        for c in [
            U256::ONE,
            U256::from_u64(2),
            U256::from_u64(0x1234_5678_9abc_def0),
            U256::from_be_hex("0e4437ed6010e88286f547fa90abfe4c4221208ac9df506c61571b4ae8ac47f7"),
            Bn254::ORDER.wrapping_sub(&U256::ONE),
        ] {
            assert_eq!(
                mul(&g, &c),
                to_affine(&ecc::mul(&g, &c)),
                "scalar {c:?}"
            );
        }
    }

    #[test]
    fn mul_by_zero_and_order_gives_infinity() {
        let g = generator();
        assert!(mul(&g, &U256::ZERO).is_infinity());
        assert!(mul(&g, &Bn254::ORDER).is_infinity());
    }

    #[test]
    fn mul_by_order_minus_one_negates() {
        let g = generator();
        let c = Bn254::ORDER.wrapping_sub(&U256::ONE);
        assert_eq!(mul(&g, &c), -g);
    }

    #[test]
    fn mul_of_infinity_stays_at_infinity() {
        let inf = AffinePoint::infinity();
        assert!(mul(&inf, &U256::from_u64(7)).is_infinity());
    }
}
