//! The quadratic extension Fp2 = Fp[i]/(i² + 1) of the BN254 base field.

use core::ops::{Add, Mul, Neg, Sub};
use std::sync::LazyLock;

use super::{Bn254, Fp};
use crate::arith::U256;
use crate::ecc::CurveParams;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fp2 {
    pub c0: Fp,
    pub c1: Fp,
}

impl Fp2 {
    pub fn new(c0: Fp, c1: Fp) -> Self {
        Self { c0, c1 }
    }

    pub fn zero() -> Self {
        Self::new(Fp::zero(), Fp::zero())
    }

    pub fn one() -> Self {
        Self::new(Fp::one(), Fp::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    /// The Frobenius endomorphism on Fp2 is plain conjugation.
    pub fn conjugate(&self) -> Self {
        Self::new(self.c0, -self.c1)
    }

    pub fn mul_by_fp(&self, s: Fp) -> Self {
        Self::new(self.c0 * s, self.c1 * s)
    }

    /// Multiplication by the Fp6 non-residue ξ = 9 + i.
    pub fn mul_by_xi(&self) -> Self {
        let t0 = self.c0 + self.c0;
        let t0 = t0 + t0;
        let t0 = t0 + t0 + self.c0; // 9·c0
        let t1 = self.c1 + self.c1;
        let t1 = t1 + t1;
        let t1 = t1 + t1 + self.c1; // 9·c1
        Self::new(t0 - self.c1, t1 + self.c0)
    }

    /// `(c0 − c1·i) / (c0² + c1²)`; zero for a non-invertible input.
    pub fn inv(&self) -> Self {
        let norm = self.c0.square() + self.c1.square();
        let t = norm.inv();
        Self::new(self.c0 * t, -(self.c1 * t))
    }

    pub fn pow(&self, exp: &U256) -> Self {
        let mut ret = Self::one();
        for i in (0..exp.bit_width()).rev() {
            ret = ret.square();
            if exp.bit(i) {
                ret = ret * *self;
            }
        }
        ret
    }
}

impl Add for Fp2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.c0 + rhs.c0, self.c1 + rhs.c1)
    }
}

impl Sub for Fp2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.c0 - rhs.c0, self.c1 - rhs.c1)
    }
}

impl Neg for Fp2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.c0, -self.c1)
    }
}

impl Mul for Fp2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        // (a0 + a1·i)(b0 + b1·i) with i² = −1.
        let t0 = self.c0 * rhs.c0;
        let t1 = self.c1 * rhs.c1;
        let t2 = (self.c0 + self.c1) * (rhs.c0 + rhs.c1);
        Self::new(t0 - t1, t2 - t0 - t1)
    }
}

/// Frobenius multipliers shared by the Fp6/Fp12 maps and the twist
/// endomorphism: the first four powers of ξ^((p−1)/6).
pub(crate) struct FrobeniusCoeffs {
    /// ξ^((p−1)/6): Fp12 Frobenius coefficient on the c1 half.
    pub fp12_c1: Fp2,
    /// ξ^((p−1)/3): Fp6 Frobenius coefficient on c1, and the x multiplier
    /// of the ψ endomorphism on the twist.
    pub fp6_c1: Fp2,
    /// ξ^((p−1)/2): the y multiplier of ψ.
    pub twist_y: Fp2,
    /// ξ^(2(p−1)/3): Fp6 Frobenius coefficient on c2.
    pub fp6_c2: Fp2,
}

pub(crate) fn frobenius_coeffs() -> &'static FrobeniusCoeffs {
    static COEFFS: LazyLock<FrobeniusCoeffs> = LazyLock::new(|| {
        let xi = Fp2::new(Fp::from_uint(&U256::from_u64(9)), Fp::one());
        let (exp, _) = Bn254::FIELD_PRIME
            .wrapping_sub(&U256::ONE)
            .div_rem(&U256::from_u64(6));
        let fp12_c1 = xi.pow(&exp);
        let fp6_c1 = fp12_c1.square();
        let twist_y = fp6_c1 * fp12_c1;
        let fp6_c2 = fp6_c1.square();
        FrobeniusCoeffs {
            fp12_c1,
            fp6_c1,
            twist_y,
            fp6_c2,
        }
    });
    &COEFFS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fp2 {
        Fp2::new(
            Fp::from_uint(&U256::from_u64(0x1234_5678_9abc)),
            Fp::from_uint(&U256::from_be_hex(
                "0deadbeef00000000000000000000000000000000000000000000000000000c5",
            )),
        )
    }

    #[test]
    fn mul_and_inv_are_inverse() {
        let a = sample();
        assert_eq!(a * a.inv(), Fp2::one());
        assert!(Fp2::zero().inv().is_zero());
    }

    #[test]
    fn square_matches_mul() {
        let a = sample();
        assert_eq!(a.square(), a * a);
    }

    #[test]
    fn mul_by_xi_matches_generic_mul() {
        let a = sample();
        let xi = Fp2::new(Fp::from_uint(&U256::from_u64(9)), Fp::one());
        assert_eq!(a.mul_by_xi(), a * xi);
    }

    #[test]
    fn conjugation_fixes_the_norm() {
        let a = sample();
        let norm = a * a.conjugate();
        assert!(norm.c1.is_zero());
    }

    #[test]
    fn frobenius_coefficient_has_order_six_over_xi() {
        // (ξ^((p−1)/6))⁶ = ξ^(p−1) = ξ^(p)·ξ⁻¹, and ξ^p = conj(ξ).
        let c = frobenius_coeffs();
        let sixth = c.fp6_c2 * c.fp6_c1;
        let xi = Fp2::new(Fp::from_uint(&U256::from_u64(9)), Fp::one());
        assert_eq!(sixth * xi, xi.conjugate());
    }
}
