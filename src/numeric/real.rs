//! Binary floating-point numbers of arbitrary precision.
//!
//! A finite non-zero [`Real`] is `±mant·2^exp` with an odd mantissa whose bit
//! length never exceeds the number's precision. Every operation takes a target
//! precision and a rounding direction and reports whether rounding happened.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

pub const MIN_PRECISION: u32 = 2;
pub const MAX_PRECISION: u32 = 1 << 24;

/// Results whose binary exponent leaves `[-EXPONENT_LIMIT, EXPONENT_LIMIT]`
/// overflow to infinity or underflow to zero.
pub const EXPONENT_LIMIT: i64 = 1 << 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Round {
    Nearest,
    Up,
    Down,
}

impl Round {
    /// Direction to use on the magnitude of a negated operand.
    pub fn reversed(self) -> Self {
        match self {
            Round::Nearest => Round::Nearest,
            Round::Up => Round::Down,
            Round::Down => Round::Up,
        }
    }
}

/// A rounded result together with its exactness.
#[derive(Clone, Debug)]
pub struct Rounded {
    pub value: Real,
    pub exact: bool,
}

impl Rounded {
    pub fn exact(value: Real) -> Self {
        Rounded { value, exact: true }
    }

    pub fn inexact(value: Real) -> Self {
        Rounded { value, exact: false }
    }

    pub fn into_value(self) -> Real {
        self.value
    }

    /// Marks the result inexact when an earlier step already rounded.
    pub fn and_exact(self, exact: bool) -> Self {
        Rounded {
            value: self.value,
            exact: self.exact && exact,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Real {
    prec: u32,
    repr: Repr,
}

#[derive(Clone, Debug)]
enum Repr {
    Nan,
    Inf { negative: bool },
    Zero,
    Finite {
        negative: bool,
        mant: BigUint,
        exp: i64,
    },
}

pub(crate) fn clamp_precision(prec: u32) -> u32 {
    prec.clamp(MIN_PRECISION, MAX_PRECISION)
}

fn bit_len(m: &BigUint) -> i64 {
    m.bits() as i64
}

impl Real {
    pub fn nan(prec: u32) -> Self {
        Real {
            prec: clamp_precision(prec),
            repr: Repr::Nan,
        }
    }

    pub fn infinity(negative: bool, prec: u32) -> Self {
        Real {
            prec: clamp_precision(prec),
            repr: Repr::Inf { negative },
        }
    }

    pub fn zero(prec: u32) -> Self {
        Real {
            prec: clamp_precision(prec),
            repr: Repr::Zero,
        }
    }

    pub fn one(prec: u32) -> Self {
        Real::from_parts(false, BigUint::one(), 0).with_precision(prec)
    }

    /// Exact conversion; the precision is the bit length of `n`.
    pub fn from_int(n: impl Into<BigInt>) -> Self {
        let n = n.into();
        let negative = n.is_negative();
        Real::from_parts(negative, n.magnitude().clone(), 0)
    }

    /// `n·2^exp`, exactly.
    pub fn dyadic(n: impl Into<BigInt>, exp: i64) -> Self {
        let n = n.into();
        let negative = n.is_negative();
        Real::from_parts(negative, n.magnitude().clone(), exp)
    }

    /// Exact conversion with precision 53.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Real::nan(53);
        }
        if value.is_infinite() {
            return Real::infinity(value < 0.0, 53);
        }
        if value == 0.0 {
            return Real::zero(53);
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mant, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        Real::from_parts(negative, BigUint::from(mant), exp).with_precision(53)
    }

    pub fn from_rational(value: &BigRational, prec: u32, rnd: Round) -> Rounded {
        let negative = value.is_negative();
        let numer = value.numer().magnitude().clone();
        let denom = value.denom().magnitude().clone();
        if numer.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        div_finite(negative, &numer, 0, false, &denom, 0, prec, rnd)
    }

    /// Builds an exact value; the precision is the mantissa's bit length.
    pub(crate) fn from_parts(negative: bool, mant: BigUint, exp: i64) -> Self {
        if mant.is_zero() {
            return Real::zero(MIN_PRECISION);
        }
        let prec = clamp_precision(mant.bits() as u32);
        round_finite(negative, mant, exp, false, prec, Round::Nearest).value
    }

    pub fn precision(&self) -> u32 {
        self.prec
    }

    /// Same value, relabelled with a precision at least its mantissa width.
    pub fn with_precision(mut self, prec: u32) -> Self {
        let needed = match &self.repr {
            Repr::Finite { mant, .. } => mant.bits() as u32,
            _ => MIN_PRECISION,
        };
        self.prec = clamp_precision(prec.max(needed));
        self
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.repr, Repr::Nan)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Inf { .. })
    }

    /// Neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        matches!(self.repr, Repr::Zero | Repr::Finite { .. })
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.repr, Repr::Zero)
    }

    /// `-1`, `0` or `1`; NaN has sign `0`.
    pub fn sign(&self) -> i32 {
        match &self.repr {
            Repr::Nan | Repr::Zero => 0,
            Repr::Inf { negative } | Repr::Finite { negative, .. } => {
                if *negative {
                    -1
                } else {
                    1
                }
            }
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sign() < 0
    }

    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::Zero => true,
            Repr::Finite { exp, .. } => *exp >= 0,
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(&self.repr, Repr::Finite { negative: false, mant, exp: 0 } if mant.is_one())
    }

    /// Exponent `e` with `2^(e-1) <= |self| < 2^e`, for finite non-zero values.
    pub fn exponent(&self) -> Option<i64> {
        match &self.repr {
            Repr::Finite { mant, exp, .. } => Some(exp + bit_len(mant)),
            _ => None,
        }
    }

    /// Bit length of the mantissa, `0` for zero and special values.
    pub fn significant_bits(&self) -> u32 {
        match &self.repr {
            Repr::Finite { mant, .. } => mant.bits() as u32,
            _ => 0,
        }
    }

    pub fn to_rational(&self) -> Option<BigRational> {
        match &self.repr {
            Repr::Zero => Some(BigRational::zero()),
            Repr::Finite {
                negative,
                mant,
                exp,
            } => {
                let sign = if *negative { Sign::Minus } else { Sign::Plus };
                let m = BigInt::from_biguint(sign, mant.clone());
                let r = if *exp >= 0 {
                    BigRational::from_integer(m << (*exp as usize))
                } else {
                    BigRational::new(m, BigInt::one() << ((-*exp) as usize))
                };
                Some(r)
            }
            _ => None,
        }
    }

    pub fn to_integer(&self) -> Option<BigInt> {
        match &self.repr {
            Repr::Zero => Some(BigInt::zero()),
            Repr::Finite {
                negative,
                mant,
                exp,
            } if *exp >= 0 => {
                let sign = if *negative { Sign::Minus } else { Sign::Plus };
                Some(BigInt::from_biguint(sign, mant.clone() << (*exp as usize)))
            }
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer().and_then(|n| n.to_i64())
    }

    /// Nearest double, with IEEE subnormals and overflow.
    pub fn to_f64(&self) -> f64 {
        let rounded = self
            .round_to_format(super::Format::Double, Round::Nearest)
            .value;
        match rounded.repr {
            Repr::Nan => f64::NAN,
            Repr::Inf { negative } => {
                if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            Repr::Zero => 0.0,
            Repr::Finite {
                negative,
                mant,
                exp,
            } => {
                let m = mant.to_f64().unwrap_or(f64::NAN);
                let v = ldexp(m, exp);
                if negative {
                    -v
                } else {
                    v
                }
            }
        }
    }

    /// Rounds to `prec` bits in direction `rnd`.
    pub fn round(&self, prec: u32, rnd: Round) -> Rounded {
        match &self.repr {
            Repr::Finite {
                negative,
                mant,
                exp,
            } => round_finite(*negative, mant.clone(), *exp, false, prec, rnd),
            _ => Rounded::exact(self.clone().with_precision(prec)),
        }
    }

    pub fn neg(&self, prec: u32, rnd: Round) -> Rounded {
        self.negated().round(prec, rnd)
    }

    pub fn abs(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_negative() {
            self.negated().round(prec, rnd)
        } else {
            self.round(prec, rnd)
        }
    }

    /// Exact negation, precision kept.
    pub fn negated(&self) -> Real {
        let repr = match &self.repr {
            Repr::Nan => Repr::Nan,
            Repr::Zero => Repr::Zero,
            Repr::Inf { negative } => Repr::Inf {
                negative: !negative,
            },
            Repr::Finite {
                negative,
                mant,
                exp,
            } => Repr::Finite {
                negative: !negative,
                mant: mant.clone(),
                exp: *exp,
            },
        };
        Real {
            prec: self.prec,
            repr,
        }
    }

    /// Exact multiplication by `2^k`.
    pub fn mul_2exp(&self, k: i64) -> Real {
        match &self.repr {
            Repr::Finite {
                negative,
                mant,
                exp,
            } => {
                let (sign, shifted) = (*negative, exp + k);
                round_finite(sign, mant.clone(), shifted, false, self.prec, Round::Nearest).value
            }
            _ => self.clone(),
        }
    }

    pub fn add(&self, other: &Real, prec: u32, rnd: Round) -> Rounded {
        match (&self.repr, &other.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Rounded::exact(Real::nan(prec)),
            (Repr::Inf { negative: a }, Repr::Inf { negative: b }) => {
                if a == b {
                    Rounded::exact(Real::infinity(*a, prec))
                } else {
                    Rounded::exact(Real::nan(prec))
                }
            }
            (Repr::Inf { negative }, _) | (_, Repr::Inf { negative }) => {
                Rounded::exact(Real::infinity(*negative, prec))
            }
            (Repr::Zero, _) => other.round(prec, rnd),
            (_, Repr::Zero) => self.round(prec, rnd),
            (
                Repr::Finite {
                    negative: an,
                    mant: am,
                    exp: ae,
                },
                Repr::Finite {
                    negative: bn,
                    mant: bm,
                    exp: be,
                },
            ) => add_finite((*an, am, *ae), (*bn, bm, *be), prec, rnd),
        }
    }

    pub fn sub(&self, other: &Real, prec: u32, rnd: Round) -> Rounded {
        self.add(&other.negated(), prec, rnd)
    }

    pub fn mul(&self, other: &Real, prec: u32, rnd: Round) -> Rounded {
        let negative = self.is_negative() != other.is_negative();
        match (&self.repr, &other.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Rounded::exact(Real::nan(prec)),
            (Repr::Inf { .. }, Repr::Zero) | (Repr::Zero, Repr::Inf { .. }) => {
                Rounded::exact(Real::nan(prec))
            }
            (Repr::Inf { .. }, _) | (_, Repr::Inf { .. }) => {
                Rounded::exact(Real::infinity(negative, prec))
            }
            (Repr::Zero, _) | (_, Repr::Zero) => Rounded::exact(Real::zero(prec)),
            (
                Repr::Finite {
                    mant: am, exp: ae, ..
                },
                Repr::Finite {
                    mant: bm, exp: be, ..
                },
            ) => round_finite(negative, am * bm, ae + be, false, prec, rnd),
        }
    }

    pub fn div(&self, other: &Real, prec: u32, rnd: Round) -> Rounded {
        let negative = self.is_negative() != other.is_negative();
        match (&self.repr, &other.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Rounded::exact(Real::nan(prec)),
            (Repr::Inf { .. }, Repr::Inf { .. }) | (Repr::Zero, Repr::Zero) => {
                Rounded::exact(Real::nan(prec))
            }
            (Repr::Inf { .. }, _) | (_, Repr::Zero) => {
                Rounded::exact(Real::infinity(negative, prec))
            }
            (_, Repr::Inf { .. }) | (Repr::Zero, _) => Rounded::exact(Real::zero(prec)),
            (
                Repr::Finite {
                    mant: am, exp: ae, ..
                },
                Repr::Finite {
                    mant: bm, exp: be, ..
                },
            ) => div_finite(negative, am, *ae, false, bm, *be, prec, rnd),
        }
    }

    pub fn sqrt(&self, prec: u32, rnd: Round) -> Rounded {
        match &self.repr {
            Repr::Nan | Repr::Inf { negative: true } => Rounded::exact(Real::nan(prec)),
            Repr::Inf { negative: false } => Rounded::exact(Real::infinity(false, prec)),
            Repr::Zero => Rounded::exact(Real::zero(prec)),
            Repr::Finite { negative: true, .. } => Rounded::exact(Real::nan(prec)),
            Repr::Finite { mant, exp, .. } => {
                let prec = clamp_precision(prec);
                let want = 2 * (prec as i64 + 2);
                let mut shift = (want - bit_len(mant) + 1).max(0);
                if (exp - shift).rem_euclid(2) != 0 {
                    shift += 1;
                }
                let scaled = mant << (shift as usize);
                let root = scaled.sqrt();
                let sticky = &root * &root != scaled;
                round_finite(false, root, (exp - shift) / 2, sticky, prec, rnd)
            }
        }
    }

    pub fn floor(&self, prec: u32, rnd: Round) -> Rounded {
        self.integral(Integral::Floor).round(prec, rnd)
    }

    pub fn ceil(&self, prec: u32, rnd: Round) -> Rounded {
        self.integral(Integral::Ceil).round(prec, rnd)
    }

    /// Round to the nearest integer, ties to even.
    pub fn nearest_int(&self, prec: u32, rnd: Round) -> Rounded {
        self.integral(Integral::Nearest).round(prec, rnd)
    }

    fn integral(&self, mode: Integral) -> Real {
        let (negative, mant, exp) = match &self.repr {
            Repr::Finite {
                negative,
                mant,
                exp,
            } if *exp < 0 => (*negative, mant, *exp),
            _ => return self.clone(),
        };
        let shift = (-exp) as usize;
        let q = mant >> shift;
        let rem = mant - (&q << shift);
        // the mantissa is odd, so a negative exponent always leaves a fraction
        let half = BigUint::one() << (shift - 1);
        let up = match mode {
            Integral::Floor => negative,
            Integral::Ceil => !negative,
            Integral::Nearest => match rem.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => q.is_odd(),
            },
        };
        let magnitude = if up { q + 1u32 } else { q };
        Real::from_parts(negative, magnitude, 0).with_precision(self.prec)
    }

    /// Numeric comparison; `None` when either side is NaN.
    pub fn compare(&self, other: &Real) -> Option<Ordering> {
        let (a, b) = (&self.repr, &other.repr);
        match (a, b) {
            (Repr::Nan, _) | (_, Repr::Nan) => None,
            (Repr::Inf { negative: x }, Repr::Inf { negative: y }) => Some(y.cmp(x)),
            (Repr::Inf { negative }, _) => Some(if *negative {
                Ordering::Less
            } else {
                Ordering::Greater
            }),
            (_, Repr::Inf { negative }) => Some(if *negative {
                Ordering::Greater
            } else {
                Ordering::Less
            }),
            _ => {
                let (sa, sb) = (self.sign(), other.sign());
                if sa != sb {
                    return Some(sa.cmp(&sb));
                }
                if sa == 0 {
                    return Some(Ordering::Equal);
                }
                let ord = self.cmp_abs(other);
                Some(if sa < 0 { ord.reverse() } else { ord })
            }
        }
    }

    /// Compares magnitudes of two finite values.
    pub(crate) fn cmp_abs(&self, other: &Real) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Zero, Repr::Zero) => Ordering::Equal,
            (Repr::Zero, _) => Ordering::Less,
            (_, Repr::Zero) => Ordering::Greater,
            (
                Repr::Finite {
                    mant: am, exp: ae, ..
                },
                Repr::Finite {
                    mant: bm, exp: be, ..
                },
            ) => {
                let (ta, tb) = (ae + bit_len(am), be + bit_len(bm));
                if ta != tb {
                    return ta.cmp(&tb);
                }
                let e = (*ae).min(*be);
                let a = am << ((ae - e) as usize);
                let b = bm << ((be - e) as usize);
                a.cmp(&b)
            }
            _ => Ordering::Equal,
        }
    }

    /// Exact sum with a precision wide enough to hold it.
    pub(crate) fn add_exact(&self, other: &Real) -> Real {
        let bits = exact_sum_bits(self, other);
        self.add(other, bits, Round::Nearest).value
    }

    pub(crate) fn sub_exact(&self, other: &Real) -> Real {
        self.add_exact(&other.negated())
    }

    pub(crate) fn mul_exact(&self, other: &Real) -> Real {
        let bits = self.significant_bits() + other.significant_bits();
        self.mul(other, bits.max(MIN_PRECISION), Round::Nearest).value
    }
}

fn exact_sum_bits(a: &Real, b: &Real) -> u32 {
    match (&a.repr, &b.repr) {
        (
            Repr::Finite {
                mant: am, exp: ae, ..
            },
            Repr::Finite {
                mant: bm, exp: be, ..
            },
        ) => {
            let top = (ae + bit_len(am)).max(be + bit_len(bm));
            let low = (*ae).min(*be);
            (top - low + 1).clamp(MIN_PRECISION as i64, MAX_PRECISION as i64) as u32
        }
        _ => a.significant_bits().max(b.significant_bits()).max(MIN_PRECISION),
    }
}

enum Integral {
    Floor,
    Ceil,
    Nearest,
}

impl PartialEq for Real {
    fn eq(&self, other: &Real) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Real) -> Option<Ordering> {
        self.compare(other)
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Real::from_int(value)
    }
}

/// Rounds `±mant·2^exp` to `prec` bits.
///
/// With `sticky` set the true magnitude lies strictly between `mant·2^exp` and
/// `(mant+1)·2^exp`; callers then supply at least `prec + 1` mantissa bits so
/// that round-to-nearest is decided correctly.
pub(crate) fn round_finite(
    negative: bool,
    mant: BigUint,
    exp: i64,
    sticky: bool,
    prec: u32,
    rnd: Round,
) -> Rounded {
    let prec = clamp_precision(prec);
    if mant.is_zero() {
        return Rounded::exact(Real::zero(prec));
    }
    let bits = mant.bits();
    let (mut mant, mut exp, inexact) = if bits > prec as u64 {
        let shift = (bits - prec as u64) as usize;
        let q = &mant >> shift;
        let rem = &mant - (&q << shift);
        let half = BigUint::one() << (shift - 1);
        let inexact = sticky || !rem.is_zero();
        let away = match rnd {
            Round::Nearest => match rem.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => sticky || q.is_odd(),
            },
            Round::Up => inexact && !negative,
            Round::Down => inexact && negative,
        };
        let q = if away { q + 1u32 } else { q };
        (q, exp + shift as i64, inexact)
    } else {
        let away = sticky
            && match rnd {
                Round::Nearest => false,
                Round::Up => !negative,
                Round::Down => negative,
            };
        let mant = if away { mant + 1u32 } else { mant };
        (mant, exp, sticky)
    };
    if let Some(tz) = mant.trailing_zeros() {
        if tz > 0 {
            mant >>= tz as usize;
            exp += tz as i64;
        }
    }
    let top = exp + bit_len(&mant);
    if top > EXPONENT_LIMIT {
        return Rounded::inexact(Real::infinity(negative, prec));
    }
    if top < -EXPONENT_LIMIT {
        return Rounded::inexact(Real::zero(prec));
    }
    Rounded {
        value: Real {
            prec,
            repr: Repr::Finite {
                negative,
                mant,
                exp,
            },
        },
        exact: !inexact,
    }
}

fn add_finite(
    a: (bool, &BigUint, i64),
    b: (bool, &BigUint, i64),
    prec: u32,
    rnd: Round,
) -> Rounded {
    let prec = clamp_precision(prec);
    let (top_a, top_b) = (a.2 + bit_len(a.1), b.2 + bit_len(b.1));
    let (big, small, top_small) = if top_a >= top_b {
        (a, b, top_b)
    } else {
        (b, a, top_a)
    };
    let top_big = big.2 + bit_len(big.1);
    let lowest = big.2.min(top_big - prec as i64 - 3);
    if top_small < lowest {
        // the smaller operand only decides the direction of rounding
        let m = big.1 << ((big.2 - lowest) as usize);
        let m = if big.0 == small.0 { m } else { m - 1u32 };
        return round_finite(big.0, m, lowest, true, prec, rnd);
    }
    let e = a.2.min(b.2);
    let signed = |(negative, mant, exp): (bool, &BigUint, i64)| {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, mant << ((exp - e) as usize))
    };
    let sum = signed(a) + signed(b);
    if sum.is_zero() {
        return Rounded::exact(Real::zero(prec));
    }
    round_finite(sum.is_negative(), sum.magnitude().clone(), e, false, prec, rnd)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn div_finite(
    negative: bool,
    am: &BigUint,
    ae: i64,
    a_sticky: bool,
    bm: &BigUint,
    be: i64,
    prec: u32,
    rnd: Round,
) -> Rounded {
    let prec = clamp_precision(prec);
    let k = (prec as i64 + 2 + bit_len(bm) - bit_len(am)).max(0);
    let numer = am << (k as usize);
    let (q, r) = numer.div_rem(bm);
    round_finite(negative, q, ae - be - k, a_sticky || !r.is_zero(), prec, rnd)
}

fn ldexp(mut value: f64, mut exp: i64) -> f64 {
    while exp > 1000 {
        value *= 2f64.powi(1000);
        exp -= 1000;
    }
    while exp < -1000 {
        value *= 2f64.powi(-1000);
        exp += 1000;
    }
    value * 2f64.powi(exp as i32)
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Nan => write!(f, "nan"),
            Repr::Inf { negative } => write!(f, "{}infty", if *negative { "-" } else { "" }),
            Repr::Zero => write!(f, "0"),
            Repr::Finite {
                negative,
                mant,
                exp,
            } => {
                let sign = if *negative { "-" } else { "" };
                if *exp >= 0 && *exp <= 256 {
                    write!(f, "{sign}{}", mant << (*exp as usize))
                } else if *exp < 0 && *exp >= -1100 {
                    let digits = (-*exp) as usize;
                    let scaled = mant * num_traits::pow(BigUint::from(5u32), digits);
                    let mut text = format!("{scaled:0>width$}", width = digits + 1);
                    text.insert(text.len() - digits, '.');
                    let text = text.trim_end_matches('0');
                    write!(f, "{sign}{text}")
                } else {
                    write!(f, "{sign}{mant}*2^({exp})")
                }
            }
        }
    }
}
