//! The sextic extension Fp6 = Fp2[v]/(v³ − ξ) with ξ = 9 + i.

use core::ops::{Add, Mul, Neg, Sub};

use super::fp2::{frobenius_coeffs, Fp2};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fp6 {
    pub c0: Fp2,
    pub c1: Fp2,
    pub c2: Fp2,
}

impl Fp6 {
    pub fn new(c0: Fp2, c1: Fp2, c2: Fp2) -> Self {
        Self { c0, c1, c2 }
    }

    pub fn zero() -> Self {
        Self::new(Fp2::zero(), Fp2::zero(), Fp2::zero())
    }

    pub fn one() -> Self {
        Self::new(Fp2::one(), Fp2::zero(), Fp2::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero() && self.c2.is_zero()
    }

    /// Multiplication by v; the coefficient rotation with a ξ correction.
    pub fn mul_by_nonresidue(&self) -> Self {
        Self::new(self.c2.mul_by_xi(), self.c0, self.c1)
    }

    /// Sparse multiplication by `b0 + b1·v`.
    pub fn mul_by_01(&self, b0: Fp2, b1: Fp2) -> Self {
        let t0 = self.c0 * b0;
        let t1 = self.c1 * b1;
        let c0 = t0 + ((self.c1 + self.c2) * b1 - t1).mul_by_xi();
        let c1 = (self.c0 + self.c1) * (b0 + b1) - t0 - t1;
        let c2 = (self.c0 + self.c2) * b0 - t0 + t1;
        Self::new(c0, c1, c2)
    }

    /// Inversion by the standard cubic-extension formula; zero for a
    /// non-invertible input.
    pub fn inv(&self) -> Self {
        let c0 = self.c0.square() - (self.c1 * self.c2).mul_by_xi();
        let c1 = self.c2.square().mul_by_xi() - self.c0 * self.c1;
        let c2 = self.c1.square() - self.c0 * self.c2;
        let t = (self.c0 * c0 + (self.c2 * c1 + self.c1 * c2).mul_by_xi()).inv();
        Self::new(c0 * t, c1 * t, c2 * t)
    }

    /// One application of the Frobenius endomorphism.
    pub fn frobenius(&self) -> Self {
        let coeffs = frobenius_coeffs();
        Self::new(
            self.c0.conjugate(),
            self.c1.conjugate() * coeffs.fp6_c1,
            self.c2.conjugate() * coeffs.fp6_c2,
        )
    }
}

impl Add for Fp6 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.c0 + rhs.c0, self.c1 + rhs.c1, self.c2 + rhs.c2)
    }
}

impl Sub for Fp6 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.c0 - rhs.c0, self.c1 - rhs.c1, self.c2 - rhs.c2)
    }
}

impl Neg for Fp6 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.c0, -self.c1, -self.c2)
    }
}

impl Mul for Fp6 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        // Karatsuba over the cubic extension with v³ = ξ.
        let t0 = self.c0 * rhs.c0;
        let t1 = self.c1 * rhs.c1;
        let t2 = self.c2 * rhs.c2;
        let c0 = t0 + ((self.c1 + self.c2) * (rhs.c1 + rhs.c2) - t1 - t2).mul_by_xi();
        let c1 = (self.c0 + self.c1) * (rhs.c0 + rhs.c1) - t0 - t1 + t2.mul_by_xi();
        let c2 = (self.c0 + self.c2) * (rhs.c0 + rhs.c2) - t0 - t2 + t1;
        Self::new(c0, c1, c2)
    }
}
