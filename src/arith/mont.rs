use super::uint::BigUint;

/// Computes the inverse of an odd number modulo 2⁶⁴: `inv·a ≡ 1 (mod 2⁶⁴)`.
///
/// Newton–Raphson iteration starting from the inverse mod 2; each step
/// doubles the number of correct bits, so six steps cover 64 bits. All
/// arithmetic wraps modulo 2⁶⁴.
pub const fn inv_mod_u64(a: u64) -> u64 {
    debug_assert!(a % 2 == 1);
    let mut inv = 1u64;
    let mut i = 0;
    while i < 6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(inv)));
        i += 1;
    }
    inv
}

/// `(hi, lo)` of `a·b + t + c`; the word-level step of operand scanning.
#[inline(always)]
pub(crate) const fn addmul(t: u64, a: u64, b: u64, c: u64) -> (u64, u64) {
    let p = a as u128 * b as u128 + t as u128 + c as u128;
    ((p >> 64) as u64, p as u64)
}

/// Montgomery modular arithmetic context for an odd modulus of `N` limbs.
///
/// Holds the modulus, `R² mod modulus` for `R = 2^(64·N)`, and the negated
/// 64-bit modulus inverse. A context is a pure value object: it can be
/// duplicated and shared across threads freely.
#[derive(Clone, Debug)]
pub struct ModArith<const N: usize> {
    modulus: BigUint<N>,
    r_squared: BigUint<N>,
    mod_inv: u64,
}

impl<const N: usize> ModArith<N> {
    pub fn new(modulus: BigUint<N>) -> Self {
        debug_assert!(modulus.is_odd());
        debug_assert!(modulus > BigUint::from_u64(2));
        // R² mod m via multi-precision division of the 2N-limb power of two.
        let r = BigUint::reduce_wide(&BigUint::ZERO, &BigUint::ONE, &modulus);
        let (lo, hi) = r.mul_wide(&r);
        let r_squared = BigUint::reduce_wide(&lo, &hi, &modulus);
        // N' = -m₀⁻¹ so that m·N' ≡ -1 (mod 2⁶⁴).
        let mod_inv = inv_mod_u64(modulus.as_limbs()[0]).wrapping_neg();
        Self {
            modulus,
            r_squared,
            mod_inv,
        }
    }

    pub fn modulus(&self) -> &BigUint<N> {
        &self.modulus
    }

    /// Converts a value to Montgomery form: `mul(x, R²) = x·R mod m`.
    pub fn to_mont(&self, x: &BigUint<N>) -> BigUint<N> {
        self.mul(x, &self.r_squared)
    }

    /// Converts a Montgomery-form value back: `mul(x, 1) = x·R⁻¹ mod m`.
    pub fn from_mont(&self, x: &BigUint<N>) -> BigUint<N> {
        self.mul(x, &BigUint::ONE)
    }

    /// Montgomery multiplication `x·y·R⁻¹ mod m` by Coarsely Integrated
    /// Operand Scanning: each operand-scanning pass is followed by one
    /// reduction step that zeroes the lowest accumulator limb and shifts it
    /// out.
    pub fn mul(&self, x: &BigUint<N>, y: &BigUint<N>) -> BigUint<N> {
        let x = x.as_limbs();
        let y = y.as_limbs();
        let m = self.modulus.as_limbs();

        // The accumulator is N+1 limbs: `t` plus the running top limb.
        let mut t = [0u64; N];
        let mut t_top = 0u64;
        for i in 0..N {
            let mut c = 0u64;
            for (j, t_j) in t.iter_mut().enumerate() {
                let (hi, lo) = addmul(*t_j, x[j], y[i], c);
                *t_j = lo;
                c = hi;
            }
            let (sum, carry) = t_top.overflowing_add(c);
            t_top = sum;
            let d = carry as u64;

            // t + k·m has a zero low limb by choice of k; shift it out.
            let k = t[0].wrapping_mul(self.mod_inv);
            let (hi, _) = addmul(t[0], k, m[0], 0);
            let mut c = hi;
            for j in 1..N {
                let (hi, lo) = addmul(t[j], k, m[j], c);
                t[j - 1] = lo;
                c = hi;
            }
            let (sum, carry) = t_top.overflowing_add(c);
            t[N - 1] = sum;
            t_top = d + carry as u64;
        }

        let value = BigUint::from_limbs(t);
        if t_top != 0 || value >= self.modulus {
            value.wrapping_sub(&self.modulus)
        } else {
            value
        }
    }

    /// Modular addition. Requires `x < m` and `y < m`; the operands may be in
    /// Montgomery or plain form.
    pub fn add(&self, x: &BigUint<N>, y: &BigUint<N>) -> BigUint<N> {
        let (sum, carry) = x.overflowing_add(y);
        let (reduced, borrow) = sum.overflowing_sub(&self.modulus);
        if !carry && borrow {
            sum
        } else {
            reduced
        }
    }

    /// Modular subtraction. Requires `x < m` and `y < m`.
    pub fn sub(&self, x: &BigUint<N>, y: &BigUint<N>) -> BigUint<N> {
        let (diff, borrow) = x.overflowing_sub(y);
        if borrow {
            diff.wrapping_add(&self.modulus)
        } else {
            diff
        }
    }

    pub fn neg(&self, x: &BigUint<N>) -> BigUint<N> {
        self.sub(&BigUint::ZERO, x)
    }

    /// Modular inversion of a Montgomery-form value; the result is in
    /// Montgomery form. Returns zero when the input is not invertible.
    ///
    /// Binary extended Euclidean algorithm, Algorithm 1 of
    /// "Optimized Binary GCD for Modular Inversion"
    /// (https://eprint.iacr.org/2020/972.pdf). Seeding the Bézout coefficient
    /// with R² instead of 1 folds the missing R² factor into the result, so
    /// an input x·R directly yields x⁻¹·R.
    pub fn inv(&self, x: &BigUint<N>) -> BigUint<N> {
        // ½ mod m as ⌊m/2⌋ + 1, rewritten from (m+1)/2 to avoid the overflow.
        let inv2 = self.modulus.shr1().wrapping_add(&BigUint::ONE);

        let mut a = *x;
        let mut b = self.modulus;
        let mut u = self.r_squared;
        let mut v = BigUint::ZERO;

        while !a.is_zero() {
            if a.is_odd() {
                let (diff, less) = a.overflowing_sub(&b);
                if less {
                    b = a;
                    a = diff.wrapping_neg();
                    core::mem::swap(&mut u, &mut v);
                } else {
                    a = diff;
                }
                u = self.sub(&u, &v);
            }

            // a is even here, so halving is exact.
            a = a.shr1();

            // u/2 mod m: ⌊u/2⌋, plus ½ mod m back when u was odd.
            let u_odd = u.is_odd();
            u = u.shr1();
            if u_odd {
                u = u.wrapping_add(&inv2);
            }
        }

        if b == BigUint::ONE {
            v
        } else {
            BigUint::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::U256;

    const BN254_P: &str = "30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd47";
    const SECP256K1_N: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn inv_mod_u64_small() {
        for a in [1u64, 3, 5, 0xfffffffefffffc2f, u64::MAX] {
            assert_eq!(a.wrapping_mul(inv_mod_u64(a)), 1, "a = {a:#x}");
        }
    }

    #[test]
    fn mont_roundtrip() {
        let m = ModArith::new(U256::from_be_hex(BN254_P));
        for x in [
            U256::ZERO,
            U256::ONE,
            U256::from_u64(0xdeadbeef),
            U256::from_be_hex(BN254_P).wrapping_sub(&U256::ONE),
        ] {
            assert_eq!(m.from_mont(&m.to_mont(&x)), x);
        }
    }

    #[test]
    fn mul_matches_plain_product() {
        let m = ModArith::new(U256::from_be_hex(BN254_P));
        let x = U256::from_u64(0x1_0000_0001);
        let y = U256::from_u64(0xffff_fffd);
        let got = m.from_mont(&m.mul(&m.to_mont(&x), &m.to_mont(&y)));
        assert_eq!(got, U256::from_u64(0x1_0000_0001 * 0xffff_fffd));
    }

    #[test]
    fn add_sub_wrap_the_modulus() {
        let modulus = U256::from_be_hex(SECP256K1_N);
        let m = ModArith::new(modulus);
        let a = modulus.wrapping_sub(&U256::ONE);
        assert_eq!(m.add(&a, &U256::ONE), U256::ZERO);
        assert_eq!(m.sub(&U256::ZERO, &U256::ONE), a);
        assert_eq!(m.neg(&U256::ONE), a);
        assert_eq!(m.neg(&U256::ZERO), U256::ZERO);
    }

    #[test]
    fn inv_finds_the_multiplicative_inverse() {
        for modulus in [U256::from_be_hex(BN254_P), U256::from_be_hex(SECP256K1_N)] {
            let m = ModArith::new(modulus);
            for x in [
                U256::ONE,
                U256::from_u64(2),
                U256::from_u64(0x6e140df1_74323111),
                modulus.wrapping_sub(&U256::ONE),
            ] {
                let xm = m.to_mont(&x);
                let inv = m.inv(&xm);
                assert_eq!(m.from_mont(&m.mul(&xm, &inv)), U256::ONE, "x = {x:?}");
            }
        }
    }

    #[test]
    fn inv_of_non_invertible_is_zero() {
        // 3 · 5 · 7 is not coprime with 21.
        let m = ModArith::new(U256::from_u64(105));
        assert_eq!(m.inv(&m.to_mont(&U256::from_u64(21))), U256::ZERO);
        assert_eq!(m.inv(&m.to_mont(&U256::ZERO)), U256::ZERO);
    }
}
