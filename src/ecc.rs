//! Short-Weierstrass elliptic-curve machinery shared by every curve in the
//! crate: prime-field elements in Montgomery form, affine and Jacobian
//! points, the group law, scalar multiplication, and the Straus–Shamir
//! double-scalar multiplication.

use core::marker::PhantomData;
use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::arith::{ModArith, U256};

/// Static description of a curve `y² = x³ + a·x + b` over a prime field.
///
/// Only `a = 0` and `a = p − 3` appear among the supported curves; the flag
/// selects the matching doubling formula.
pub trait CurveParams: Copy + 'static {
    const A_IS_MINUS_3: bool;
    const FIELD_PRIME: U256;
    const ORDER: U256;
    const B: U256;

    /// The Montgomery context of the base field, shared process-wide.
    fn fp() -> &'static ModArith<4>;
}

/// An element of the base field of curve `C`, kept in Montgomery form.
pub struct FieldElement<C: CurveParams> {
    value: U256,
    _curve: PhantomData<C>,
}

impl<C: CurveParams> Clone for FieldElement<C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C: CurveParams> Copy for FieldElement<C> {}

impl<C: CurveParams> PartialEq for FieldElement<C> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<C: CurveParams> Eq for FieldElement<C> {}

impl<C: CurveParams> core::fmt::Debug for FieldElement<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Fe({:?})", self.to_uint())
    }
}

impl<C: CurveParams> FieldElement<C> {
    /// Wraps a raw value that is already in Montgomery form.
    pub(crate) fn wrap(value: U256) -> Self {
        Self {
            value,
            _curve: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::wrap(U256::ZERO)
    }

    pub fn one() -> Self {
        Self::wrap(C::fp().to_mont(&U256::ONE))
    }

    pub fn from_uint(value: &U256) -> Self {
        Self::wrap(C::fp().to_mont(value))
    }

    /// The canonical (plain-form) integer value.
    pub fn to_uint(&self) -> U256 {
        C::fp().from_mont(&self.value)
    }

    /// Loads a canonical big-endian field element; `None` if the encoded
    /// value is not below the field prime.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let value = U256::from_be_bytes(bytes);
        if value < C::FIELD_PRIME {
            Some(Self::from_uint(&value))
        } else {
            None
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.to_uint().write_be_bytes(&mut out);
        out
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    /// Multiplicative inverse; zero for a non-invertible input.
    pub fn inv(&self) -> Self {
        Self::wrap(C::fp().inv(&self.value))
    }

    /// `self^exp` by left-to-right square-and-multiply.
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

impl<C: CurveParams> Add for FieldElement<C> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::wrap(C::fp().add(&self.value, &rhs.value))
    }
}

impl<C: CurveParams> Sub for FieldElement<C> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::wrap(C::fp().sub(&self.value, &rhs.value))
    }
}

impl<C: CurveParams> Mul for FieldElement<C> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::wrap(C::fp().mul(&self.value, &rhs.value))
    }
}

impl<C: CurveParams> Neg for FieldElement<C> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::wrap(C::fp().neg(&self.value))
    }
}

impl<C: CurveParams> Div for FieldElement<C> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self * rhs.inv()
    }
}

/// A point in affine coordinates. `(0, 0)` encodes the point at infinity,
/// which is safe for the supported curves because their `b` is non-zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AffinePoint<C: CurveParams> {
    pub x: FieldElement<C>,
    pub y: FieldElement<C>,
}

impl<C: CurveParams> AffinePoint<C> {
    pub fn new(x: FieldElement<C>, y: FieldElement<C>) -> Self {
        Self { x, y }
    }

    pub fn infinity() -> Self {
        Self {
            x: FieldElement::zero(),
            y: FieldElement::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Loads `x ‖ y` from 64 canonical big-endian bytes; `None` if either
    /// coordinate is out of the field range. No curve membership check.
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[..32]);
        y.copy_from_slice(&bytes[32..]);
        Some(Self {
            x: FieldElement::from_bytes(&x)?,
            y: FieldElement::from_bytes(&y)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.x.to_bytes());
        out[32..].copy_from_slice(&self.y.to_bytes());
        out
    }
}

impl<C: CurveParams> Neg for AffinePoint<C> {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }
}

/// A point in Jacobian coordinates `(X, Y, Z)` standing for the affine
/// point `(X/Z², Y/Z³)`; `Z = 0` encodes the point at infinity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProjPoint<C: CurveParams> {
    pub x: FieldElement<C>,
    pub y: FieldElement<C>,
    pub z: FieldElement<C>,
}

impl<C: CurveParams> ProjPoint<C> {
    pub fn infinity() -> Self {
        Self {
            x: FieldElement::zero(),
            y: FieldElement::one(),
            z: FieldElement::zero(),
        }
    }

    pub fn from_affine(p: &AffinePoint<C>) -> Self {
        if p.is_infinity() {
            Self::infinity()
        } else {
            Self {
                x: p.x,
                y: p.y,
                z: FieldElement::one(),
            }
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

/// Converts a Jacobian point to affine coordinates.
///
/// The point at infinity maps to `(0, 0)` because the inverse of `z = 0`
/// is zero.
pub fn to_affine<C: CurveParams>(p: &ProjPoint<C>) -> AffinePoint<C> {
    let z_inv = p.z.inv();
    let zz_inv = z_inv * z_inv;
    let zzz_inv = zz_inv * z_inv;
    AffinePoint {
        x: p.x * zz_inv,
        y: p.y * zzz_inv,
    }
}

/// Point addition in affine coordinates using the classic slope formulas.
pub fn add_affine<C: CurveParams>(p: &AffinePoint<C>, q: &AffinePoint<C>) -> AffinePoint<C> {
    if p.is_infinity() {
        return *q;
    }
    if q.is_infinity() {
        return *p;
    }

    let mut dx = q.x - p.x;
    let mut dy = q.y - p.y;
    if dx.is_zero() {
        if !dy.is_zero() {
            // Opposite points add up to infinity.
            return AffinePoint::infinity();
        }

        // Coincident points: the tangent slope is (3x² + a) / 2y.
        let xx = p.x.square();
        dy = xx + xx + xx;
        if C::A_IS_MINUS_3 {
            let one = FieldElement::one();
            dy = dy - (one + one + one);
        }
        dx = p.y + p.y;
    }
    let slope = dy / dx;

    let xr = slope.square() - p.x - q.x;
    let yr = slope * (p.x - xr) - p.y;
    AffinePoint { x: xr, y: yr }
}

/// Point doubling in Jacobian coordinates.
///
/// "dbl-2009-l" for `a = 0` and "dbl-2001-b" for `a = p − 3`, from
/// https://www.hyperelliptic.org/EFD/g1p/auto-shortw-jacobian.html.
/// Both formulas map the point at infinity to itself.
pub fn dbl<C: CurveParams>(p: &ProjPoint<C>) -> ProjPoint<C> {
    let ProjPoint { x: x1, y: y1, z: z1 } = *p;

    if !C::A_IS_MINUS_3 {
        let xx = x1.square();
        let yy = y1.square();
        let yyyy = yy.square();
        let t0 = x1 + yy;
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
        let t9 = e * t6;
        let y3 = t9 - y8;
        let t10 = y1 * z1;
        let z3 = t10 + t10;
        ProjPoint { x: x3, y: y3, z: z3 }
    } else {
        let zz = z1.square();
        let yy = y1.square();
        let xyy = x1 * yy;
        let t0 = x1 - zz;
        let t1 = x1 + zz;
        let t2 = t0 * t1;
        let alpha = t2 + t2 + t2;
        let t3 = alpha.square();
        let xyy2 = xyy + xyy;
        let xyy4 = xyy2 + xyy2;
        let xyy8 = xyy4 + xyy4;
        let x3 = t3 - xyy8;
        let t5 = y1 + z1;
        let t6 = t5.square();
        let t7 = t6 - yy;
        let z3 = t7 - zz;
        let t9 = xyy4 - x3;
        let t10 = yy.square();
        let t11_2 = t10 + t10;
        let t11_4 = t11_2 + t11_2;
        let t11 = t11_4 + t11_4;
        let t12 = alpha * t9;
        let y3 = t12 - t11;
        ProjPoint { x: x3, y: y3, z: z3 }
    }
}

/// General point addition in Jacobian coordinates ("add-1998-cmo-2").
///
/// Handles every input: infinity operands, coincident points (delegated to
/// doubling), and mutual negations sharing an x coordinate (infinity).
pub fn add<C: CurveParams>(p: &ProjPoint<C>, q: &ProjPoint<C>) -> ProjPoint<C> {
    if p.is_infinity() {
        return *q;
    }
    if q.is_infinity() {
        return *p;
    }

    let ProjPoint { x: x1, y: y1, z: z1 } = *p;
    let ProjPoint { x: x2, y: y2, z: z2 } = *q;

    let z1z1 = z1.square();
    let z2z2 = z2.square();
    let u1 = x1 * z2z2;
    let u2 = x2 * z1z1;
    let z1z1z1 = z1 * z1z1;
    let z2z2z2 = z2 * z2z2;
    let s1 = y1 * z2z2z2;
    let s2 = y2 * z1z1z1;
    let h = u2 - u1;
    let r = s2 - s1;

    if h.is_zero() {
        if r.is_zero() {
            return dbl(p);
        }
        // Same x, opposite y: the sum is the point at infinity.
        return ProjPoint::infinity();
    }

    let hh = h.square();
    let hhh = h * hh;
    let v = u1 * hh;
    let t2 = r.square();
    let t3 = v + v;
    let t4 = t2 - hhh;
    let x3 = t4 - t3;
    let t5 = v - x3;
    let t6 = s1 * hhh;
    let t7 = r * t5;
    let y3 = t7 - t6;
    let t8 = z2 * h;
    let z3 = z1 * t8;

    ProjPoint { x: x3, y: y3, z: z3 }
}

/// Mixed addition: a Jacobian point plus an affine point ("madd"), modified
/// to support adding a point to itself.
pub fn add_mixed<C: CurveParams>(p: &ProjPoint<C>, q: &AffinePoint<C>) -> ProjPoint<C> {
    if q.is_infinity() {
        return *p;
    }
    if p.is_infinity() {
        return ProjPoint::from_affine(q);
    }

    let ProjPoint { x: x1, y: y1, z: z1 } = *p;
    let AffinePoint { x: x2, y: y2 } = *q;

    let z1z1 = z1.square();
    let u2 = x2 * z1z1;
    let z1z1z1 = z1 * z1z1;
    let s2 = y2 * z1z1z1;
    let h = u2 - x1;
    let t1 = h + h;
    let i = t1.square();
    let j = h * i;
    let t2 = s2 - y1;

    // p == q exactly when x1 == x2·z1² and y1 == y2·z1³.
    if h.is_zero() && t2.is_zero() {
        return dbl(p);
    }

    let r = t2 + t2;
    let v = x1 * i;
    let t3 = r.square();
    let t4 = v + v;
    let t5 = t3 - j;
    let x3 = t5 - t4;
    let t6 = v - x3;
    let t7 = y1 * j;
    let t8 = t7 + t7;
    let t9 = r * t6;
    let y3 = t9 - t8;
    let t10 = z1 * h;
    let z3 = t10 + t10;

    ProjPoint { x: x3, y: y3, z: z3 }
}

/// Scalar multiplication `[c]P` by left-to-right double-and-add.
///
/// The scalar is first reduced modulo the curve order by conditional
/// subtraction; with a reduced scalar the running accumulator can never
/// coincide with the addend, so the additions in the loop never have to fall
/// back to doubling.
pub fn mul<C: CurveParams>(p: &AffinePoint<C>, c: &U256) -> ProjPoint<C> {
    let mut c = *c;
    loop {
        let (reduced, less) = c.overflowing_sub(&C::ORDER);
        if less {
            break;
        }
        c = reduced;
    }

    let mut r = ProjPoint::infinity();
    for i in (0..c.bit_width()).rev() {
        r = dbl(&r);
        if c.bit(i) {
            r = add_mixed(&r, p);
        }
    }
    r
}

/// Double-scalar multiplication `[u]P ⊕ [v]Q` by the Straus–Shamir trick:
/// one shared double-and-add pass over a precomputed `{P, Q, P⊕Q}` table.
pub fn msm2<C: CurveParams>(
    u: &U256,
    p: &AffinePoint<C>,
    v: &U256,
    q: &AffinePoint<C>,
) -> ProjPoint<C> {
    let mut r = ProjPoint::infinity();

    let bit_width = u.bit_width().max(v.bit_width());
    if bit_width == 0 {
        return r;
    }

    // P ⊕ Q in affine form; correct even when P == Q.
    let h = add_affine(p, q);

    for i in (0..bit_width).rev() {
        r = dbl(&r);
        match (v.bit(i), u.bit(i)) {
            (false, false) => {}
            (false, true) => r = add_mixed(&r, p),
            (true, false) => r = add_mixed(&r, q),
            (true, true) => r = add_mixed(&r, &h),
        }
    }

    r
}
