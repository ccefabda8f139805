//! The optimal ate pairing on BN254, per EIP-197.
//!
//! G2 points live on the sextic twist `y² = x³ + 3/ξ` over Fp2. The Miller
//! loop walks the NAF digits of `6u + 2` for the curve parameter
//! `u = 4965661367192848881`, accumulating sparse line evaluations, and the
//! final exponentiation raises the result to `(p¹² − 1)/n`.

use std::sync::LazyLock;

use super::fp12::Fp12;
use super::fp2::{frobenius_coeffs, Fp2};
use super::{validate, Bn254, Fp};
use crate::arith::U256;
use crate::ecc::{AffinePoint, CurveParams};
use crate::errors::PrecompileError;

/// A point of the G2 group in affine coordinates over Fp2;
/// `(0, 0)` is the point at infinity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct G2Point {
    pub x: Fp2,
    pub y: Fp2,
}

impl G2Point {
    pub fn new(x: Fp2, y: Fp2) -> Self {
        Self { x, y }
    }

    pub fn infinity() -> Self {
        Self::new(Fp2::zero(), Fp2::zero())
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    fn neg(&self) -> Self {
        Self::new(self.x, -self.y)
    }
}

/// The twist curve coefficient b′ = 3/ξ.
fn twist_b() -> Fp2 {
    static TWIST_B: LazyLock<Fp2> = LazyLock::new(|| {
        let xi = Fp2::new(Fp::from_uint(&U256::from_u64(9)), Fp::one());
        let three = Fp2::new(Fp::from_uint(&U256::from_u64(3)), Fp::zero());
        three * xi.inv()
    });
    *TWIST_B
}

fn is_on_twist(q: &G2Point) -> bool {
    q.y.square() == q.x.square() * q.x + twist_b()
}

/// Jacobian arithmetic on the twist, used for the order-n subgroup check.
struct G2Jacobian {
    x: Fp2,
    y: Fp2,
    z: Fp2,
}

impl G2Jacobian {
    fn infinity() -> Self {
        Self {
            x: Fp2::zero(),
            y: Fp2::one(),
            z: Fp2::zero(),
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    // "dbl-2009-l" over Fp2; the twist has a = 0.
    fn dbl(&self) -> Self {
        let xx = self.x.square();
        let yy = self.y.square();
        let yyyy = yy.square();
        let t0 = self.x + yy;
        let t1 = t0.square();
        let t2 = t1 - xx;
        let t3 = t2 - yyyy;
        let d = t3 + t3;
        let e = xx + xx + xx;
        let f = e.square();
        let t4 = d + d;
        let x3 = f - t4;
        let t6 = d - x3;
        let y8 = yyyy + yyyy;
        let y8 = y8 + y8;
        let y8 = y8 + y8;
        let y3 = e * t6 - y8;
        let t10 = self.y * self.z;
        let z3 = t10 + t10;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    // "madd" over Fp2; the addend must not be the point at infinity.
    fn add_mixed(&self, q: &G2Point) -> Self {
        if self.is_infinity() {
            return Self {
                x: q.x,
                y: q.y,
                z: Fp2::one(),
            };
        }

        let z1z1 = self.z.square();
        let u2 = q.x * z1z1;
        let s2 = q.y * self.z * z1z1;
        let h = u2 - self.x;
        let t1 = h + h;
        let i = t1.square();
        let j = h * i;
        let t2 = s2 - self.y;

        if h.is_zero() && t2.is_zero() {
            return self.dbl();
        }

        let r = t2 + t2;
        let v = self.x * i;
        let t3 = r.square();
        let t4 = v + v;
        let x3 = t3 - j - t4;
        let t7 = self.y * j;
        let y3 = r * (v - x3) - (t7 + t7);
        let t10 = self.z * h;
        let z3 = t10 + t10;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }
}

/// Order-n subgroup membership: `[n]Q` must be the point at infinity.
fn is_in_subgroup(q: &G2Point) -> bool {
    let order = Bn254::ORDER;
    let mut r = G2Jacobian::infinity();
    for i in (0..order.bit_width()).rev() {
        r = r.dbl();
        if order.bit(i) {
            r = r.add_mixed(q);
        }
    }
    r.is_infinity()
}

/// The NAF digits of 6u + 2, least significant first.
const ATE_LOOP_COUNT: [i8; 65] = [
    0, 0, 0, 1, 0, 1, 0, -1, 0, 0, 1, -1, 0, 0, 1, 0, 0, 1, 1, 0, -1, 0, 0, 1, 0, -1, 0, 0, 0, 0,
    1, 1, 1, 0, 0, -1, 0, 0, 1, 0, 0, 0, 0, 0, -1, 0, 0, 1, 1, 0, 0, -1, 0, 0, 0, 1, 1, 0, -1, 0,
    0, 1, 0, 1, 1,
];

/// The BN254 curve parameter u.
const X: u64 = 4965661367192848881;

/// A line evaluated at a G2 step, still missing the G1 coordinates.
type LineCoeffs = (Fp2, Fp2, Fp2);

/// G2 point in homogeneous projective coordinates during the Miller loop.
struct HomProjective {
    x: Fp2,
    y: Fp2,
    z: Fp2,
}

impl HomProjective {
    fn double_step(&mut self, two_inv: Fp) -> LineCoeffs {
        let a = (self.x * self.y).mul_by_fp(two_inv);
        let b = self.y.square();
        let c = self.z.square();
        let c3 = c + c + c;
        let e = twist_b() * c3;
        let f = e + e + e;
        let g = (b + f).mul_by_fp(two_inv);
        let h = (self.y + self.z).square() - (b + c);
        let i = e - b;
        let j = self.x.square();
        let e_sq = e.square();

        self.x = a * (b - f);
        self.y = g.square() - (e_sq + e_sq + e_sq);
        self.z = b * h;

        (-h, j + j + j, i)
    }

    fn add_step(&mut self, q: &G2Point) -> LineCoeffs {
        let theta = self.y - q.y * self.z;
        let lambda = self.x - q.x * self.z;
        let c = theta.square();
        let d = lambda.square();
        let e = lambda * d;
        let f = self.z * c;
        let g = self.x * d;
        let h = e + f - (g + g);

        let y_old = self.y;
        self.x = lambda * h;
        self.y = theta * (g - h) - e * y_old;
        self.z = self.z * e;

        let j = theta * q.x - lambda * q.y;
        (lambda, -theta, j)
    }
}

/// The ψ endomorphism on the twist: coordinate-wise Frobenius with the
/// untwisting multipliers.
fn mul_by_char(q: &G2Point) -> G2Point {
    let coeffs = frobenius_coeffs();
    G2Point::new(
        q.x.conjugate() * coeffs.fp6_c1,
        q.y.conjugate() * coeffs.twist_y,
    )
}

/// Precomputes the line coefficients of the full Miller loop for one G2
/// point, including the two ψ-correction additions at the end.
fn prepare(q: &G2Point) -> Vec<LineCoeffs> {
    let two_inv = Fp::from_uint(&U256::from_u64(2)).inv();
    let mut coeffs = Vec::new();
    let mut r = HomProjective {
        x: q.x,
        y: q.y,
        z: Fp2::one(),
    };
    let neg_q = q.neg();

    for bit in ATE_LOOP_COUNT.iter().rev().skip(1) {
        coeffs.push(r.double_step(two_inv));
        match bit {
            1 => coeffs.push(r.add_step(q)),
            -1 => coeffs.push(r.add_step(&neg_q)),
            _ => {}
        }
    }

    let q1 = mul_by_char(q);
    let mut q2 = mul_by_char(&q1);
    q2.y = -q2.y;

    coeffs.push(r.add_step(&q1));
    coeffs.push(r.add_step(&q2));

    coeffs
}

/// Folds one line into the accumulator: the stored coefficients are scaled
/// by the G1 coordinates and applied as a sparse `mul_by_034`.
fn ell(f: Fp12, coeffs: &LineCoeffs, p: &AffinePoint<Bn254>) -> Fp12 {
    let c0 = coeffs.0.mul_by_fp(p.y);
    let c1 = coeffs.1.mul_by_fp(p.x);
    f.mul_by_034(c0, c1, coeffs.2)
}

fn miller_loop(pairs: &[(AffinePoint<Bn254>, Vec<LineCoeffs>)]) -> Fp12 {
    let mut f = Fp12::one();
    let mut idx = vec![0usize; pairs.len()];

    for i in (1..ATE_LOOP_COUNT.len()).rev() {
        if i != ATE_LOOP_COUNT.len() - 1 {
            f = f.square();
        }
        for (k, (p, coeffs)) in pairs.iter().enumerate() {
            f = ell(f, &coeffs[idx[k]], p);
            idx[k] += 1;
        }
        let bit = ATE_LOOP_COUNT[i - 1];
        if bit == 1 || bit == -1 {
            for (k, (p, coeffs)) in pairs.iter().enumerate() {
                f = ell(f, &coeffs[idx[k]], p);
                idx[k] += 1;
            }
        }
    }

    // The two ψ-correction lines.
    for _ in 0..2 {
        for (k, (p, coeffs)) in pairs.iter().enumerate() {
            f = ell(f, &coeffs[idx[k]], p);
            idx[k] += 1;
        }
    }

    f
}

/// `f^(−u)`: a cyclotomic power followed by conjugation (the inverse inside
/// the cyclotomic subgroup).
fn exp_by_neg_x(f: &Fp12) -> Fp12 {
    f.pow_u64(X).conjugate()
}

fn final_exponentiation(f: &Fp12) -> Fp12 {
    // Easy part: f^((p⁶−1)(p²+1)).
    let f1 = f.conjugate();
    let mut r = f1 * f.inv();
    let f2 = r;
    r = r.frobenius_pow(2);
    r = r * f2;

    // Hard part, in the standard addition-chain schedule.
    let y0 = exp_by_neg_x(&r);
    let y1 = y0.square();
    let y2 = y1.square();
    let mut y3 = y2 * y1;
    let y4 = exp_by_neg_x(&y3);
    let y5 = y4.square();
    let mut y6 = exp_by_neg_x(&y5);
    y3 = y3.conjugate();
    y6 = y6.conjugate();
    let y7 = y6 * y4;
    let y8 = y7 * y3;
    let y9 = y8 * y1;
    let y10 = y8 * y4;
    let y11 = y10 * r;
    let y12 = y9.frobenius();
    let y13 = y12 * y11;
    let y14 = y8.frobenius_pow(2) * y13;
    r = r.conjugate();
    let y15 = (r * y9).frobenius_pow(3);
    y15 * y14
}

/// Evaluates the pairing check `∏ e(G1ᵢ, G2ᵢ) == 1`.
///
/// Every G1 point must be on the curve (or the point at infinity) and every
/// G2 point on the twist and in the order-n subgroup; invalid points are an
/// error, not a `false` result. Pairs with a point at infinity contribute
/// the identity and are skipped. An empty input checks out trivially.
pub fn pairing_check(
    pairs: &[(AffinePoint<Bn254>, G2Point)],
) -> Result<bool, PrecompileError> {
    let mut prepared = Vec::new();
    for (p, q) in pairs {
        if !validate(p) {
            return Err(PrecompileError::PointNotOnCurve);
        }
        if !q.is_infinity() {
            if !is_on_twist(q) {
                return Err(PrecompileError::PointNotOnCurve);
            }
            if !is_in_subgroup(q) {
                return Err(PrecompileError::PointNotInSubgroup);
            }
        }
        if p.is_infinity() || q.is_infinity() {
            continue;
        }
        prepared.push((*p, prepare(q)));
    }

    if prepared.is_empty() {
        return Ok(true);
    }

    let f = final_exponentiation(&miller_loop(&prepared));
    Ok(f.is_one())
}
