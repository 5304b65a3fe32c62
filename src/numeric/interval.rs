//! Closed intervals with outward-rounded endpoints.

use std::cmp::Ordering;

use super::format::Format;
use super::real::{Real, Round, Rounded};

#[derive(Clone, Debug)]
pub struct Interval {
    lo: Real,
    hi: Real,
}

/// Direction of an endpoint map.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Monotone {
    Increasing,
    Decreasing,
}

impl Interval {
    /// Builds `[lo, hi]`; swapped endpoints are reordered.
    pub fn new(lo: Real, hi: Real) -> Self {
        if lo.compare(&hi) == Some(Ordering::Greater) {
            Interval { lo: hi, hi: lo }
        } else {
            Interval { lo, hi }
        }
    }

    pub fn point(x: Real) -> Self {
        Interval {
            lo: x.clone(),
            hi: x,
        }
    }

    pub fn entire(prec: u32) -> Self {
        Interval {
            lo: Real::infinity(true, prec),
            hi: Real::infinity(false, prec),
        }
    }

    pub fn nan(prec: u32) -> Self {
        Interval::point(Real::nan(prec))
    }

    pub fn lo(&self) -> &Real {
        &self.lo
    }

    pub fn hi(&self) -> &Real {
        &self.hi
    }

    pub fn is_nan(&self) -> bool {
        self.lo.is_nan() || self.hi.is_nan()
    }

    pub fn is_point(&self) -> bool {
        self.lo.compare(&self.hi) == Some(Ordering::Equal)
    }

    pub fn is_bounded(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }

    pub fn contains(&self, x: &Real) -> bool {
        !matches!(self.lo.compare(x), Some(Ordering::Greater) | None)
            && !matches!(self.hi.compare(x), Some(Ordering::Less) | None)
    }

    pub fn contains_zero(&self) -> bool {
        self.contains(&Real::zero(2))
    }

    /// Midpoint rounded to nearest at `prec`.
    pub fn mid(&self, prec: u32) -> Real {
        if self.is_point() {
            return self.lo.round(prec, Round::Nearest).value;
        }
        let sum = self.lo.add(&self.hi, prec + 1, Round::Nearest).value;
        sum.mul_2exp(-1).round(prec, Round::Nearest).value
    }

    fn from_ends(lo: Rounded, hi: Rounded) -> Self {
        if lo.value.is_nan() || hi.value.is_nan() {
            return Interval::nan(lo.value.precision());
        }
        Interval::new(lo.value, hi.value)
    }

    fn map(&self, prec: u32, dir: Monotone, f: impl Fn(&Real, u32, Round) -> Rounded) -> Self {
        match dir {
            Monotone::Increasing => {
                Interval::from_ends(f(&self.lo, prec, Round::Down), f(&self.hi, prec, Round::Up))
            }
            Monotone::Decreasing => {
                Interval::from_ends(f(&self.hi, prec, Round::Down), f(&self.lo, prec, Round::Up))
            }
        }
    }

    pub fn neg(&self) -> Self {
        Interval {
            lo: self.hi.negated(),
            hi: self.lo.negated(),
        }
    }

    pub fn abs(&self, prec: u32) -> Self {
        if self.is_nan() {
            return Interval::nan(prec);
        }
        if !self.lo.is_negative() {
            return self.map(prec, Monotone::Increasing, |x, p, r| x.round(p, r));
        }
        if !self.hi.is_negative() && !self.hi.is_zero() {
            let top = self.lo.negated().max_with(&self.hi);
            return Interval::new(Real::zero(prec), top.round(prec, Round::Up).value);
        }
        self.neg().map(prec, Monotone::Increasing, |x, p, r| x.round(p, r))
    }

    pub fn add(&self, other: &Interval, prec: u32) -> Self {
        Interval::from_ends(
            self.lo.add(&other.lo, prec, Round::Down),
            self.hi.add(&other.hi, prec, Round::Up),
        )
    }

    pub fn sub(&self, other: &Interval, prec: u32) -> Self {
        self.add(&other.neg(), prec)
    }

    pub fn mul(&self, other: &Interval, prec: u32) -> Self {
        let corners = [
            (&self.lo, &other.lo),
            (&self.lo, &other.hi),
            (&self.hi, &other.lo),
            (&self.hi, &other.hi),
        ];
        let mut lo: Option<Real> = None;
        let mut hi: Option<Real> = None;
        for (a, b) in corners {
            let down = a.mul(b, prec, Round::Down).value;
            let up = a.mul(b, prec, Round::Up).value;
            if down.is_nan() || up.is_nan() {
                // 0·∞ corners bound nothing
                continue;
            }
            lo = Some(match lo {
                Some(l) => l.min_with(&down),
                None => down,
            });
            hi = Some(match hi {
                Some(h) => h.max_with(&up),
                None => up,
            });
        }
        match (lo, hi) {
            (Some(lo), Some(hi)) if !self.is_nan() && !other.is_nan() => Interval::new(lo, hi),
            _ => Interval::nan(prec),
        }
    }

    pub fn div(&self, other: &Interval, prec: u32) -> Self {
        if self.is_nan() || other.is_nan() {
            return Interval::nan(prec);
        }
        if other.contains_zero() {
            return Interval::entire(prec);
        }
        let recip = Interval::from_ends(
            Real::one(prec).div(&other.hi, prec, Round::Down),
            Real::one(prec).div(&other.lo, prec, Round::Up),
        );
        self.mul(&recip, prec)
    }

    pub fn sqrt(&self, prec: u32) -> Self {
        if self.hi.is_negative() {
            return Interval::nan(prec);
        }
        let lo = if self.lo.is_negative() {
            Real::zero(prec)
        } else {
            self.lo.sqrt(prec, Round::Down).value
        };
        Interval::new(lo, self.hi.sqrt(prec, Round::Up).value)
    }

    /// `self^other`, by the endpoint images when the base is positive.
    pub fn pow(&self, other: &Interval, prec: u32) -> Self {
        if self.is_nan() || other.is_nan() {
            return Interval::nan(prec);
        }
        if self.is_point() && other.is_point() {
            return Interval::from_ends(
                self.lo.pow(&other.lo, prec, Round::Down),
                self.lo.pow(&other.lo, prec, Round::Up),
            );
        }
        if self.lo.is_negative() || self.lo.is_zero() {
            return Interval::entire(prec);
        }
        let mut lo: Option<Real> = None;
        let mut hi: Option<Real> = None;
        for a in [&self.lo, &self.hi] {
            for b in [&other.lo, &other.hi] {
                let down = a.pow(b, prec, Round::Down).value;
                let up = a.pow(b, prec, Round::Up).value;
                lo = Some(lo.map_or(down.clone(), |l| l.min_with(&down)));
                hi = Some(hi.map_or(up.clone(), |h| h.max_with(&up)));
            }
        }
        match (lo, hi) {
            (Some(lo), Some(hi)) if !lo.is_nan() && !hi.is_nan() => Interval::new(lo, hi),
            _ => Interval::nan(prec),
        }
    }

    pub fn exp(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::exp)
    }

    pub fn expm1(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::expm1)
    }

    pub fn log(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::log)
    }

    pub fn log2(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::log2)
    }

    pub fn log10(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::log10)
    }

    pub fn log1p(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::log1p)
    }

    pub fn atan(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::atan)
    }

    pub fn asin(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::asin)
    }

    pub fn acos(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Decreasing, Real::acos)
    }

    pub fn sinh(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::sinh)
    }

    pub fn tanh(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::tanh)
    }

    pub fn asinh(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::asinh)
    }

    pub fn acosh(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::acosh)
    }

    pub fn atanh(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::atanh)
    }

    pub fn erf(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::erf)
    }

    pub fn erfc(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Decreasing, Real::erfc)
    }

    pub fn ceil(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::ceil)
    }

    pub fn floor(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::floor)
    }

    pub fn nearest_int(&self, prec: u32) -> Self {
        self.map(prec, Monotone::Increasing, Real::nearest_int)
    }

    /// Endpoints rounded into `format`; rounding is monotone.
    pub fn round_to_format(&self, format: Format) -> Self {
        Interval::from_ends(
            self.lo.round_to_format(format, Round::Down),
            self.hi.round_to_format(format, Round::Up),
        )
    }

    pub fn cosh(&self, prec: u32) -> Self {
        if self.is_nan() {
            return Interval::nan(prec);
        }
        if !self.lo.is_negative() {
            return self.map(prec, Monotone::Increasing, Real::cosh);
        }
        if self.hi.is_negative() {
            return self.map(prec, Monotone::Decreasing, Real::cosh);
        }
        let far = self.lo.negated().max_with(&self.hi);
        Interval::new(Real::one(prec), far.cosh(prec, Round::Up).value)
    }

    pub fn sin(&self, prec: u32) -> Self {
        self.periodic(prec, Real::sin, |quarter| match quarter {
            3 | 0 => Monotone::Increasing,
            _ => Monotone::Decreasing,
        })
    }

    pub fn cos(&self, prec: u32) -> Self {
        self.periodic(prec, Real::cos, |quarter| match quarter {
            2 | 3 => Monotone::Increasing,
            _ => Monotone::Decreasing,
        })
    }

    pub fn tan(&self, prec: u32) -> Self {
        if self.is_nan() || !self.is_bounded() {
            return Interval::entire(prec);
        }
        match (quarter_of(&self.lo, prec), quarter_of(&self.hi, prec)) {
            (Some((ql, _)), Some((qh, _))) if ql == qh => {
                self.map(prec, Monotone::Increasing, Real::tan)
            }
            _ => Interval::entire(prec),
        }
    }

    /// Sine and cosine are monotone on each quarter period `[kπ/2, (k+1)π/2]`.
    fn periodic(
        &self,
        prec: u32,
        f: fn(&Real, u32, Round) -> Rounded,
        direction: impl Fn(u8) -> Monotone,
    ) -> Self {
        if self.is_nan() {
            return Interval::nan(prec);
        }
        let unit = Interval::new(Real::from_int(-1), Real::one(prec));
        if !self.is_bounded() {
            return unit;
        }
        match (quarter_of(&self.lo, prec), quarter_of(&self.hi, prec)) {
            (Some((ql, m)), Some((qh, _))) if ql == qh => self.map(prec, direction(m), f),
            _ => unit,
        }
    }
}

/// Index `k` with `x` strictly inside `[kπ/2, (k+1)π/2]`, and `k mod 4`.
/// `None` when `x` is too close to a boundary to decide.
fn quarter_of(x: &Real, prec: u32) -> Option<(num_bigint::BigInt, u8)> {
    use num_integer::Integer;
    use num_traits::ToPrimitive;

    let wp = prec + 32 + x.exponent().unwrap_or(0).max(0) as u32;
    let half_pi = Real::pi(wp, Round::Nearest).value.mul_2exp(-1);
    let t = x.div(&half_pi, wp, Round::Nearest).value;
    let k = t.floor(wp, Round::Nearest).value;
    let margin = Real::dyadic(1, -((prec / 2) as i64));
    let below = t.sub(&k, wp, Round::Nearest).value;
    let above = k.add(&Real::one(wp), wp, Round::Nearest).value.sub(&t, wp, Round::Nearest).value;
    if below.compare(&margin) != Some(Ordering::Greater)
        || above.compare(&margin) != Some(Ordering::Greater)
    {
        return None;
    }
    let k = k.to_integer()?;
    let m = k.mod_floor(&num_bigint::BigInt::from(4)).to_u8()?;
    Some((k, m))
}

impl Real {
    pub(crate) fn min_with(&self, other: &Real) -> Real {
        if other.compare(self) == Some(Ordering::Less) {
            other.clone()
        } else {
            self.clone()
        }
    }

    pub(crate) fn max_with(&self, other: &Real) -> Real {
        if other.compare(self) == Some(Ordering::Greater) {
            other.clone()
        } else {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(a: f64, b: f64) -> Interval {
        Interval::new(Real::from_f64(a), Real::from_f64(b))
    }

    #[test]
    fn arithmetic_encloses() {
        let a = iv(1.0, 2.0);
        let b = iv(-3.0, 0.5);
        let p = a.mul(&b, 53);
        assert_eq!(p.lo().to_f64(), -6.0);
        assert_eq!(p.hi().to_f64(), 1.0);
        assert!(!a.div(&b, 53).is_bounded());
        let third = iv(1.0, 1.0).div(&iv(3.0, 3.0), 20);
        assert!(third.lo() < third.hi());
    }

    #[test]
    fn sine_over_a_monotone_piece() {
        let s = iv(0.1, 0.2).sin(53);
        assert!(s.lo().to_f64() <= 0.1f64.sin());
        assert!(s.hi().to_f64() >= 0.2f64.sin());
        let wide = iv(0.0, 4.0).sin(53);
        assert_eq!(wide.lo().to_f64(), -1.0);
        assert_eq!(wide.hi().to_f64(), 1.0);
    }

    #[test]
    fn cosh_straddling_zero() {
        let c = iv(-1.0, 2.0).cosh(53);
        assert_eq!(c.lo().to_f64(), 1.0);
        assert!(c.hi().to_f64() >= 2f64.cosh());
    }
}
