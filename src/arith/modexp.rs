//! Size-dispatched modular exponentiation for variable-width big-endian
//! inputs, the arithmetic behind the MODEXP precompile.
//!
//! The modulus shape picks the algorithm: an odd modulus runs a Montgomery
//! ladder with Almost Montgomery Multiplication, a power-of-two modulus runs
//! plain wrapping square-and-multiply under a bit mask, and a general even
//! modulus combines both halves with the Koç reconstruction
//! (https://cetinkayakoc.net/docs/j34.pdf).

use super::mont::{addmul, inv_mod_u64};
use super::uint::BigUint;

pub const MODEXP_MAX_INPUT_SIZE: usize = 1024;

/// View of the exponent bytes exposing the bit pattern.
///
/// Leading zero bytes are trimmed; `bit_width` is 0 for a zero exponent.
pub struct Exponent<'a> {
    data: &'a [u8],
    bit_width: usize,
}

impl<'a> Exponent<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let data = &bytes[start..];
        let bit_width = match data.first() {
            Some(&b) => 8 - b.leading_zeros() as usize + (data.len() - 1) * 8,
            None => 0,
        };
        Self { data, bit_width }
    }

    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// The bit at `index`, counting from the least significant bit.
    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.bit_width);
        let byte = self.data[self.data.len() - 1 - index / 8];
        (byte >> (index % 8)) & 1 != 0
    }
}

/// Almost Montgomery Multiplication: CIOS without the per-iteration
/// conditional subtraction. The result stays in `[0, 2·mod)` in plain form,
/// so a chain of these needs a single reduction at the very end.
/// Multiplying by the plain integer 1 converts out of Montgomery form.
///
/// See "Efficient Software Implementations of Modular Exponentiation"
/// (https://eprint.iacr.org/2011/239.pdf).
fn mul_amm<const N: usize>(
    x: &BigUint<N>,
    y: &BigUint<N>,
    modulus: &BigUint<N>,
    mod_inv: u64,
) -> BigUint<N> {
    let x = x.as_limbs();
    let y = y.as_limbs();
    let m = modulus.as_limbs();

    let mut t = [0u64; N];
    let mut t_carry = false;
    for i in 0..N {
        let mut c = 0u64;
        for (j, t_j) in t.iter_mut().enumerate() {
            let (hi, lo) = addmul(*t_j, x[j], y[i], c);
            *t_j = lo;
            c = hi;
        }
        let (sum1, d1) = c.overflowing_add(t_carry as u64);

        let k = t[0].wrapping_mul(mod_inv);
        let c2 = ((m[0] as u128 * k as u128 + t[0] as u128) >> 64) as u64;
        let mut c = c2;
        for j in 1..N {
            let (hi, lo) = addmul(t[j], k, m[j], c);
            t[j - 1] = lo;
            c = hi;
        }
        let (sum2, d2) = sum1.overflowing_add(c);
        t[N - 1] = sum2;
        debug_assert!(!(d1 && d2));
        t_carry = d1 | d2;
    }

    let value = BigUint::from_limbs(t);
    if t_carry {
        value.wrapping_sub(modulus)
    } else {
        value
    }
}

fn modexp_odd<const N: usize>(
    base: &BigUint<N>,
    exp: &Exponent,
    modulus: &BigUint<N>,
) -> BigUint<N> {
    debug_assert!(exp.bit_width() != 0); // zero exponent is handled by the dispatch
    debug_assert!(modulus.is_odd());

    let mod_inv = inv_mod_u64(modulus.as_limbs()[0]).wrapping_neg();

    // base·R mod m, the Montgomery form of the base.
    let base_mont = BigUint::reduce_wide(&BigUint::ZERO, base, modulus);

    let mut ret = base_mont;
    for i in (1..exp.bit_width()).rev() {
        ret = mul_amm(&ret, &ret, modulus, mod_inv);
        if exp.bit(i - 1) {
            ret = mul_amm(&ret, &base_mont, modulus, mod_inv);
        }
    }

    let ret = mul_amm(&ret, &BigUint::ONE, modulus, mod_inv);
    if ret >= *modulus {
        ret.wrapping_sub(modulus)
    } else {
        ret
    }
}

fn modexp_pow2<const N: usize>(base: &BigUint<N>, exp: &Exponent, k: u32) -> BigUint<N> {
    debug_assert!(k != 0); // a modulus of 1 runs the odd path

    let mut ret = BigUint::ONE;
    for i in (0..exp.bit_width()).rev() {
        ret = ret.wrapping_mul(&ret);
        if exp.bit(i) {
            ret = ret.wrapping_mul(base);
        }
    }
    ret.bitand(&BigUint::low_bits_mask(k))
}

/// Inverse of an odd value modulo 2ᵏ by Newton–Raphson doubling over
/// progressively wider views; the caller masks the result to `k` bits.
fn modinv_pow2<const N: usize>(x: &BigUint<N>, k: u32) -> BigUint<N> {
    debug_assert!(x.is_odd());
    debug_assert!(k <= BigUint::<N>::BITS);

    let mut inv = BigUint::from_u64(inv_mod_u64(x.as_limbs()[0]));
    let mut correct_bits = 64;
    while correct_bits < k {
        let t = BigUint::from_u64(2).wrapping_sub(&x.wrapping_mul(&inv));
        inv = inv.wrapping_mul(&t);
        correct_bits *= 2;
    }
    inv
}

/// `base^exp mod (mod_odd · 2ᵏ)` recombined from the two coprime halves.
fn modexp_even<const N: usize>(
    base: &BigUint<N>,
    exp: &Exponent,
    mod_odd: &BigUint<N>,
    k: u32,
) -> BigUint<N> {
    debug_assert!(k != 0);

    let x1 = modexp_odd(base, exp, mod_odd);
    let x2 = modexp_pow2(base, exp, k);

    let mod_odd_inv = modinv_pow2(mod_odd, k);
    let mask = BigUint::low_bits_mask(k);

    let y = x2
        .wrapping_sub(&x1)
        .wrapping_mul(&mod_odd_inv)
        .bitand(&mask);
    x1.wrapping_add(&y.wrapping_mul(mod_odd))
}

fn modexp_width<const N: usize>(
    base_bytes: &[u8],
    exp: &Exponent,
    mod_bytes: &[u8],
    output: &mut [u8],
) {
    let base = BigUint::<N>::from_be_bytes(base_bytes);
    let modulus = BigUint::<N>::from_be_bytes(mod_bytes);
    debug_assert!(!modulus.is_zero()); // zero modulus is handled by the caller

    let result = if exp.bit_width() == 0 {
        // A zero exponent gives 1, except modulo 1.
        if modulus == BigUint::ONE {
            BigUint::ZERO
        } else {
            BigUint::ONE
        }
    } else {
        let mod_tz = modulus.count_trailing_zeros();
        if mod_tz == 0 {
            modexp_odd(&base, exp, &modulus)
        } else {
            let mod_odd = modulus.shr(mod_tz);
            if mod_odd == BigUint::ONE {
                modexp_pow2(&base, exp, mod_tz)
            } else {
                modexp_even(&base, exp, &mod_odd, mod_tz)
            }
        }
    };

    result.write_be_bytes(output);
}

/// Computes `base^exp mod modulus` over big-endian byte strings, writing
/// `modulus.len()` big-endian bytes into `output`.
///
/// The caller must enforce the preconditions: base and modulus no longer than
/// [`MODEXP_MAX_INPUT_SIZE`] bytes, a non-zero modulus, and an output buffer
/// of the modulus length. The computation itself never fails.
pub fn modexp(base: &[u8], exp: &[u8], modulus: &[u8], output: &mut [u8]) {
    debug_assert!(base.len() <= MODEXP_MAX_INPUT_SIZE);
    debug_assert!(modulus.len() <= MODEXP_MAX_INPUT_SIZE);
    debug_assert_eq!(output.len(), modulus.len());

    let exp = Exponent::new(exp);

    // Pick the smallest statically instantiated width holding both operands.
    let size = base.len().max(modulus.len());
    if size <= 16 {
        modexp_width::<2>(base, &exp, modulus, output)
    } else if size <= 32 {
        modexp_width::<4>(base, &exp, modulus, output)
    } else if size <= 64 {
        modexp_width::<8>(base, &exp, modulus, output)
    } else if size <= 128 {
        modexp_width::<16>(base, &exp, modulus, output)
    } else if size <= 256 {
        modexp_width::<32>(base, &exp, modulus, output)
    } else {
        modexp_width::<128>(base, &exp, modulus, output)
    }
}
