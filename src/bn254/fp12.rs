//! The degree-twelve tower Fp12 = Fp6[w]/(w² − v), the target field of the
//! BN254 pairing.

use core::ops::{Mul, Neg};

use super::fp2::{frobenius_coeffs, Fp2};
use super::fp6::Fp6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fp12 {
    pub c0: Fp6,
    pub c1: Fp6,
}

impl Fp12 {
    pub fn new(c0: Fp6, c1: Fp6) -> Self {
        Self { c0, c1 }
    }

    pub fn one() -> Self {
        Self::new(Fp6::one(), Fp6::zero())
    }

    pub fn is_one(&self) -> bool {
        *self == Self::one()
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    /// Conjugation over Fp6; for elements of the cyclotomic subgroup this is
    /// the inverse.
    pub fn conjugate(&self) -> Self {
        Self::new(self.c0, -self.c1)
    }

    pub fn inv(&self) -> Self {
        let t = (self.c0 * self.c0 - (self.c1 * self.c1).mul_by_nonresidue()).inv();
        Self::new(self.c0 * t, -(self.c1 * t))
    }

    /// One application of the Frobenius endomorphism.
    pub fn frobenius(&self) -> Self {
        let c0 = self.c0.frobenius();
        let c1 = self.c1.frobenius();
        let gamma = frobenius_coeffs().fp12_c1;
        Self::new(
            c0,
            Fp6::new(c1.c0 * gamma, c1.c1 * gamma, c1.c2 * gamma),
        )
    }

    pub fn frobenius_pow(&self, power: usize) -> Self {
        let mut ret = *self;
        for _ in 0..power {
            ret = ret.frobenius();
        }
        ret
    }

    /// Sparse multiplication by an element with non-zero coefficients at
    /// positions 0, 3 and 4 of the Fp2 basis: `c0 + (d0 + d1·v)·w`. This is
    /// the shape of a Miller-loop line evaluation.
    pub fn mul_by_034(&self, c0: Fp2, d0: Fp2, d1: Fp2) -> Self {
        let a = Fp6::new(self.c0.c0 * c0, self.c0.c1 * c0, self.c0.c2 * c0);
        let b = self.c1.mul_by_01(d0, d1);
        let e = (self.c0 + self.c1).mul_by_01(c0 + d0, d1);
        Self::new(a + b.mul_by_nonresidue(), e - (a + b))
    }

    pub fn pow_u64(&self, exp: u64) -> Self {
        let mut ret = Self::one();
        let mut base = *self;
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                ret = ret * base;
            }
            base = base.square();
            e >>= 1;
        }
        ret
    }
}

impl Mul for Fp12 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let t0 = self.c0 * rhs.c0;
        let t1 = self.c1 * rhs.c1;
        let c0 = t0 + t1.mul_by_nonresidue();
        let c1 = (self.c0 + self.c1) * (rhs.c0 + rhs.c1) - t0 - t1;
        Self::new(c0, c1)
    }
}

impl Neg for Fp12 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.c0, -self.c1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::U256;
    use crate::bn254::{Bn254, Fp};
    use crate::ecc::CurveParams;

    fn fe(v: u64) -> Fp {
        Fp::from_uint(&U256::from_u64(v))
    }

    fn sample() -> Fp12 {
        Fp12::new(
            Fp6::new(
                Fp2::new(fe(2), fe(3)),
                Fp2::new(fe(5), fe(7)),
                Fp2::new(fe(11), fe(13)),
            ),
            Fp6::new(
                Fp2::new(fe(17), fe(19)),
                Fp2::new(fe(23), fe(29)),
                Fp2::new(fe(31), fe(37)),
            ),
        )
    }

    fn pow(base: &Fp12, exp: &U256) -> Fp12 {
        let mut ret = Fp12::one();
        for i in (0..exp.bit_width()).rev() {
            ret = ret.square();
            if exp.bit(i) {
                ret = ret * *base;
            }
        }
        ret
    }

    #[test]
    fn mul_and_inv_are_inverse() {
        let a = sample();
        assert!((a * a.inv()).is_one());
    }

    #[test]
    fn frobenius_matches_pow_p() {
        let a = sample();
        assert_eq!(a.frobenius(), pow(&a, &Bn254::FIELD_PRIME));
    }

    #[test]
    fn mul_by_034_matches_generic_mul() {
        let a = sample();
        let c0 = Fp2::new(fe(41), fe(43));
        let d0 = Fp2::new(fe(47), fe(53));
        let d1 = Fp2::new(fe(59), fe(61));
        let sparse = Fp12::new(
            Fp6::new(c0, Fp2::zero(), Fp2::zero()),
            Fp6::new(d0, d1, Fp2::zero()),
        );
        assert_eq!(a.mul_by_034(c0, d0, d1), a * sparse);
    }

    #[test]
    fn pow_u64_matches_repeated_squaring() {
        let a = sample();
        assert_eq!(a.pow_u64(1), a);
        assert_eq!(a.pow_u64(2), a.square());
        assert_eq!(a.pow_u64(5), a.square().square() * a);
    }
}
