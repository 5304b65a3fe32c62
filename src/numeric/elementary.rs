//! Elementary functions over [`Real`].
//!
//! Each function is evaluated at a working precision `prec + GUARD_BITS` with
//! a relative error below `2^(SLACK - work)`. The result is then rounded to the
//! target. Directed roundings first push the approximation past that error
//! bound, so the result encloses the true value in the requested direction.
//! Special points with exact results are detected up front.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use super::real::{Real, Round, Rounded};

const GUARD_BITS: u32 = 40;
const SLACK: i64 = 16;

/// Beyond this exponent `exp` leaves the representable range.
const EXP_OVERFLOW: i64 = 42;

/// Trigonometric arguments beyond `2^REDUCTION_LIMIT` are not reduced.
const REDUCTION_LIMIT: i64 = 1 << 14;

/// log2(e), scaled by 2^10, for bit estimates of `e^(x²)`.
const LOG2_E_1024: u64 = 1477;

fn add(a: &Real, b: &Real, q: u32) -> Real {
    a.add(b, q, Round::Nearest).value
}

fn sub(a: &Real, b: &Real, q: u32) -> Real {
    a.sub(b, q, Round::Nearest).value
}

fn mul(a: &Real, b: &Real, q: u32) -> Real {
    a.mul(b, q, Round::Nearest).value
}

fn div(a: &Real, b: &Real, q: u32) -> Real {
    a.div(b, q, Round::Nearest).value
}

fn sqrt(a: &Real, q: u32) -> Real {
    a.sqrt(q, Round::Nearest).value
}

fn int(n: u64) -> Real {
    Real::from_int(n)
}

fn one() -> Real {
    int(1)
}

/// True once `term` no longer affects `sum` at `q` bits.
fn negligible(term: &Real, sum: &Real, q: u32) -> bool {
    match (term.exponent(), sum.exponent()) {
        (None, _) => true,
        (Some(t), Some(s)) => t < s - q as i64 - 2,
        (Some(_), None) => false,
    }
}

fn approximate(prec: u32, rnd: Round, f: impl FnOnce(u32) -> Real) -> Rounded {
    let work = prec.saturating_add(GUARD_BITS);
    let approx = f(work);
    let Some(e) = approx.exponent() else {
        return Rounded::inexact(approx.round(prec, rnd).value);
    };
    let err = Real::dyadic(1, e - work as i64 + SLACK);
    let widened = match rnd {
        Round::Nearest => approx,
        Round::Up => approx.add(&err, work + 8, Round::Up).value,
        Round::Down => approx.sub(&err, work + 8, Round::Down).value,
    };
    Rounded::inexact(widened.round(prec, rnd).value)
}

/// Works on the magnitude of an odd function and restores the sign.
fn odd(x: &Real, prec: u32, rnd: Round, f: impl FnOnce(&Real, u32) -> Real) -> Rounded {
    if x.is_negative() {
        let magnitude = x.negated();
        let r = approximate(prec, rnd.reversed(), |q| f(&magnitude, q));
        Rounded {
            value: r.value.negated(),
            exact: r.exact,
        }
    } else {
        approximate(prec, rnd, |q| f(x, q))
    }
}

fn nan(prec: u32) -> Rounded {
    Rounded::exact(Real::nan(prec))
}

impl Real {
    pub fn pi(prec: u32, rnd: Round) -> Rounded {
        approximate(prec, rnd, pi_approx)
    }

    pub fn exp(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        if self.is_infinite() {
            return Rounded::exact(if self.is_negative() {
                Real::zero(prec)
            } else {
                Real::infinity(false, prec)
            });
        }
        if self.is_zero() {
            return Rounded::exact(Real::one(prec));
        }
        approximate(prec, rnd, |q| exp_approx(self, q))
    }

    pub fn expm1(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        if self.is_infinite() {
            return Rounded::exact(if self.is_negative() {
                Real::from_int(-1).with_precision(prec)
            } else {
                Real::infinity(false, prec)
            });
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        approximate(prec, rnd, |q| expm1_approx(self, q))
    }

    pub fn log(&self, prec: u32, rnd: Round) -> Rounded {
        match self.log_special(prec) {
            Some(r) => r,
            None => approximate(prec, rnd, |q| log_approx(self, q)),
        }
    }

    pub fn log2(&self, prec: u32, rnd: Round) -> Rounded {
        if let Some(r) = self.log_special(prec) {
            return r;
        }
        if self.significant_bits() == 1 {
            if let Some(e) = self.exponent() {
                return Real::from_int(e - 1).round(prec, rnd);
            }
        }
        approximate(prec, rnd, |q| {
            let wq = q + 8;
            div(&log_approx(self, wq), &ln2(wq), q)
        })
    }

    pub fn log10(&self, prec: u32, rnd: Round) -> Rounded {
        if let Some(r) = self.log_special(prec) {
            return r;
        }
        if let Some(k) = self.to_integer().and_then(|n| power_of_ten(&n)) {
            return Real::from_int(k).round(prec, rnd);
        }
        approximate(prec, rnd, |q| {
            let wq = q + 8;
            div(&log_approx(self, wq), &log_approx(&int(10), wq), q)
        })
    }

    fn log_special(&self, prec: u32) -> Option<Rounded> {
        if self.is_nan() || self.is_negative() {
            return Some(nan(prec));
        }
        if self.is_zero() {
            return Some(Rounded::exact(Real::infinity(true, prec)));
        }
        if self.is_infinite() {
            return Some(Rounded::exact(Real::infinity(false, prec)));
        }
        if self.is_one() {
            return Some(Rounded::exact(Real::zero(prec)));
        }
        None
    }

    pub fn log1p(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        match self.compare(&Real::from_int(-1)) {
            Some(std::cmp::Ordering::Less) => return nan(prec),
            Some(std::cmp::Ordering::Equal) => {
                return Rounded::exact(Real::infinity(true, prec));
            }
            _ => {}
        }
        if self.is_infinite() {
            return Rounded::exact(Real::infinity(false, prec));
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        approximate(prec, rnd, |q| log1p_approx(self, q))
    }

    pub fn sin(&self, prec: u32, rnd: Round) -> Rounded {
        if !self.is_finite() || beyond_reduction(self) {
            return nan(prec);
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        odd(self, prec, rnd, |x, q| sin_cos_approx(x, q).0)
    }

    pub fn cos(&self, prec: u32, rnd: Round) -> Rounded {
        if !self.is_finite() || beyond_reduction(self) {
            return nan(prec);
        }
        if self.is_zero() {
            return Rounded::exact(Real::one(prec));
        }
        let x = self.abs(self.precision(), Round::Nearest).value;
        approximate(prec, rnd, |q| sin_cos_approx(&x, q).1)
    }

    pub fn tan(&self, prec: u32, rnd: Round) -> Rounded {
        if !self.is_finite() || beyond_reduction(self) {
            return nan(prec);
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        odd(self, prec, rnd, |x, q| {
            let (s, c) = sin_cos_approx(x, q + 4);
            div(&s, &c, q)
        })
    }

    pub fn atan(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        odd(self, prec, rnd, atan_approx)
    }

    pub fn asin(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.cmp_abs_one() == Some(std::cmp::Ordering::Greater) {
            return nan(prec);
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        odd(self, prec, rnd, |x, q| {
            if x.is_one() {
                return pi_approx(q).mul_2exp(-1);
            }
            let d = one().sub_exact(&x.mul_exact(x));
            atan_approx(&div(x, &sqrt(&d, q + 8), q + 8), q)
        })
    }

    pub fn acos(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.cmp_abs_one() == Some(std::cmp::Ordering::Greater) {
            return nan(prec);
        }
        if self.is_one() {
            return Rounded::exact(Real::zero(prec));
        }
        approximate(prec, rnd, |q| {
            if self.negated().is_one() {
                return pi_approx(q);
            }
            let ratio = div(&one().sub_exact(self), &one().add_exact(self), q + 8);
            atan_approx(&sqrt(&ratio, q + 8), q).mul_2exp(1)
        })
    }

    fn cmp_abs_one(&self) -> Option<std::cmp::Ordering> {
        if self.is_nan() {
            return None;
        }
        if self.is_infinite() {
            return Some(std::cmp::Ordering::Greater);
        }
        Some(self.cmp_abs(&one()))
    }

    pub fn sinh(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.is_zero() || self.is_infinite() {
            return Rounded::exact(self.clone().with_precision(prec));
        }
        odd(self, prec, rnd, |x, q| {
            if x.exponent().unwrap_or(0) > EXP_OVERFLOW {
                return Real::infinity(false, q);
            }
            let wq = q + 8;
            let em1 = expm1_approx(x, wq);
            let recip = div(&em1, &add(&em1, &one(), wq), wq);
            add(&em1, &recip, wq).mul_2exp(-1)
        })
    }

    pub fn cosh(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        if self.is_infinite() {
            return Rounded::exact(Real::infinity(false, prec));
        }
        if self.is_zero() {
            return Rounded::exact(Real::one(prec));
        }
        let x = self.abs(self.precision(), Round::Nearest).value;
        approximate(prec, rnd, |q| {
            let wq = q + 8;
            let e = exp_approx(&x, wq);
            add(&e, &div(&one(), &e, wq), wq).mul_2exp(-1)
        })
    }

    pub fn tanh(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.is_zero() {
            return Rounded::exact(self.clone().with_precision(prec));
        }
        if self.is_infinite() {
            return Rounded::exact(Real::from_int(self.sign()).with_precision(prec));
        }
        odd(self, prec, rnd, |x, q| {
            if x.exponent().unwrap_or(0) > EXP_OVERFLOW {
                return one();
            }
            let wq = q + 8;
            let t = expm1_approx(&x.mul_2exp(1), wq);
            if t.is_infinite() {
                return one();
            }
            div(&t, &add(&t, &int(2), wq), wq)
        })
    }

    pub fn asinh(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.is_zero() || self.is_infinite() {
            return Rounded::exact(self.clone().with_precision(prec));
        }
        odd(self, prec, rnd, |x, q| {
            let wq = q + 8;
            let x2 = x.mul_exact(x);
            let root = add(&one(), &sqrt(&one().add_exact(&x2), wq), wq);
            let u = add(x, &div(&x2, &root, wq), wq);
            log1p_approx(&u, q)
        })
    }

    pub fn acosh(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.compare(&one()) == Some(std::cmp::Ordering::Less) {
            return nan(prec);
        }
        if self.is_infinite() {
            return Rounded::exact(Real::infinity(false, prec));
        }
        if self.is_one() {
            return Rounded::exact(Real::zero(prec));
        }
        approximate(prec, rnd, |q| {
            let wq = q + 8;
            let t = self.sub_exact(&one());
            let inner = t.mul_2exp(1).add_exact(&t.mul_exact(&t));
            log1p_approx(&add(&t, &sqrt(&inner, wq), wq), q)
        })
    }

    pub fn atanh(&self, prec: u32, rnd: Round) -> Rounded {
        match self.cmp_abs_one() {
            None | Some(std::cmp::Ordering::Greater) => return nan(prec),
            Some(std::cmp::Ordering::Equal) => {
                return Rounded::exact(Real::infinity(self.is_negative(), prec));
            }
            Some(std::cmp::Ordering::Less) => {}
        }
        if self.is_zero() {
            return Rounded::exact(Real::zero(prec));
        }
        odd(self, prec, rnd, |x, q| {
            let wq = q + 8;
            let u = div(&x.mul_2exp(1), &one().sub_exact(x), wq);
            log1p_approx(&u, q).mul_2exp(-1)
        })
    }

    pub fn erf(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() || self.is_zero() {
            return Rounded::exact(self.clone().with_precision(prec));
        }
        if self.is_infinite() {
            return Rounded::exact(Real::from_int(self.sign()).with_precision(prec));
        }
        odd(self, prec, rnd, erf_approx)
    }

    pub fn erfc(&self, prec: u32, rnd: Round) -> Rounded {
        if self.is_nan() {
            return nan(prec);
        }
        if self.is_infinite() {
            let v = if self.is_negative() { 2 } else { 0 };
            return Rounded::exact(Real::from_int(v).with_precision(prec));
        }
        if self.is_zero() {
            return Rounded::exact(Real::one(prec));
        }
        approximate(prec, rnd, |q| erfc_approx(self, q))
    }

    pub fn pow(&self, y: &Real, prec: u32, rnd: Round) -> Rounded {
        if y.is_zero() || self.is_one() {
            return Rounded::exact(Real::one(prec));
        }
        if self.is_nan() || y.is_nan() {
            return nan(prec);
        }
        if y.is_infinite() {
            let ord = self.cmp_abs_one();
            let big = ord == Some(std::cmp::Ordering::Greater);
            return Rounded::exact(match ord {
                Some(std::cmp::Ordering::Equal) => Real::one(prec),
                _ if big != y.is_negative() => Real::infinity(false, prec),
                _ => Real::zero(prec),
            });
        }
        if let Some(n) = y.to_integer() {
            return pow_integer(self, &n, prec, rnd);
        }
        // y is finite and not an integer from here on
        if self.is_zero() {
            return Rounded::exact(if y.is_negative() {
                Real::infinity(false, prec)
            } else {
                Real::zero(prec)
            });
        }
        if self.is_infinite() {
            if self.is_negative() && !y.is_negative() {
                return Rounded::exact(Real::infinity(false, prec));
            }
            return Rounded::exact(if y.is_negative() {
                Real::zero(prec)
            } else {
                Real::infinity(false, prec)
            });
        }
        if self.is_negative() {
            return nan(prec);
        }
        let twice = y.mul_2exp(1);
        if let Some(n) = twice.to_integer() {
            let root = self.sqrt(self.precision() + 2, Round::Nearest);
            if root.exact {
                return pow_integer(&root.value, &n, prec, rnd);
            }
        }
        approximate(prec, rnd, |q| general_pow(self, y, q))
    }
}

fn power_of_ten(n: &BigInt) -> Option<i64> {
    if !n.is_positive() {
        return None;
    }
    let ten = BigInt::from(10);
    let mut n = n.clone();
    let mut k = 0;
    while (&n % &ten).is_zero() {
        n /= &ten;
        k += 1;
    }
    (n == BigInt::from(1)).then_some(k)
}

/// Mantissa size beyond which integer powers stop being computed exactly.
const EXACT_POW_BITS: u64 = 1 << 16;

fn pow_integer(x: &Real, n: &BigInt, prec: u32, rnd: Round) -> Rounded {
    let odd_power = n.bit(0);
    if x.is_zero() || x.is_infinite() {
        let grows = x.is_infinite() != n.is_negative();
        let negative = x.is_negative() && odd_power;
        return Rounded::exact(if grows {
            Real::infinity(negative, prec)
        } else {
            Real::zero(prec)
        });
    }
    let bits = x.significant_bits() as u64;
    let magnitude = n.magnitude().to_u64();
    if let Some(k) = magnitude.filter(|k| bits.saturating_mul(*k) <= EXACT_POW_BITS) {
        let mut acc = one();
        let mut base = x.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.mul_exact(&base);
            }
            k >>= 1;
            if k > 0 {
                base = base.mul_exact(&base);
            }
        }
        return if n.is_negative() {
            one().div(&acc, prec, rnd)
        } else {
            acc.round(prec, rnd)
        };
    }
    let negative = x.is_negative() && odd_power;
    let magnitude = x.abs(x.precision(), Round::Nearest).value;
    let y = Real::from_int(n.clone());
    let r = approximate(
        prec,
        if negative { rnd.reversed() } else { rnd },
        |q| general_pow(&magnitude, &y, q),
    );
    if negative {
        Rounded {
            value: r.value.negated(),
            exact: r.exact,
        }
    } else {
        r
    }
}

/// `exp(y·log x)` for positive `x`.
fn general_pow(x: &Real, y: &Real, q: u32) -> Real {
    let e = y.exponent().unwrap_or(0).max(0)
        + x.exponent().unwrap_or(0).abs().max(1).ilog2() as i64;
    let wq = q + e.clamp(0, 1 << 20) as u32 + 16;
    let l = mul(y, &log_approx(x, wq), wq);
    exp_approx(&l, q)
}

fn pi_approx(q: u32) -> Real {
    let wq = q + 16;
    let a = atan_inverse(5, wq).mul_2exp(4);
    let b = atan_inverse(239, wq).mul_2exp(2);
    sub(&a, &b, q)
}

/// `atan(1/n)` by its alternating series.
fn atan_inverse(n: u64, q: u32) -> Real {
    let n2 = int(n * n);
    let mut power = div(&one(), &int(n), q);
    let mut sum = power.clone();
    let mut k = 1u64;
    loop {
        power = div(&power, &n2, q);
        let term = div(&power, &int(2 * k + 1), q);
        if negligible(&term, &sum, q) {
            return sum;
        }
        sum = if k % 2 == 1 {
            sub(&sum, &term, q)
        } else {
            add(&sum, &term, q)
        };
        k += 1;
    }
}

/// `atanh(z)` for `|z| <= 1/3`.
fn atanh_series(z: &Real, q: u32) -> Real {
    let z2 = mul(z, z, q);
    let mut power = z.clone();
    let mut sum = z.clone();
    let mut k = 1u64;
    loop {
        power = mul(&power, &z2, q);
        let term = div(&power, &int(2 * k + 1), q);
        if negligible(&term, &sum, q) {
            return sum;
        }
        sum = add(&sum, &term, q);
        k += 1;
    }
}

fn ln2(q: u32) -> Real {
    let wq = q + 8;
    atanh_series(&div(&one(), &int(3), wq), wq).mul_2exp(1)
}

fn exp_approx(x: &Real, q: u32) -> Real {
    let Some(e) = x.exponent() else {
        return one();
    };
    if e > EXP_OVERFLOW {
        return if x.is_negative() {
            Real::zero(q)
        } else {
            Real::infinity(false, q)
        };
    }
    if e < -(q as i64) - 2 {
        return add(&one(), x, q);
    }
    let wq = q + e.max(0) as u32 + 16;
    let log2 = ln2(wq + 16);
    let k = div(x, &log2, wq)
        .nearest_int(wq, Round::Nearest)
        .value
        .to_integer()
        .unwrap_or_default();
    let k_ln2 = log2.mul_exact(&Real::from_int(k.clone()));
    let r = sub(x, &k_ln2, q + 16);
    let halvings = (q as f64).sqrt() as i64 / 2 + 2;
    let r = r.mul_2exp(-halvings);
    let wp = q + halvings as u32 + 16;
    let mut sum = one();
    let mut term = one();
    let mut n = 1u64;
    loop {
        term = div(&mul(&term, &r, wp), &int(n), wp);
        if negligible(&term, &sum, wp) {
            break;
        }
        sum = add(&sum, &term, wp);
        n += 1;
    }
    for _ in 0..halvings {
        sum = mul(&sum, &sum, wp);
    }
    sum.mul_2exp(k.to_i64().unwrap_or(0))
}

fn expm1_approx(x: &Real, q: u32) -> Real {
    let e = x.exponent().unwrap_or(i64::MIN);
    if e >= 0 {
        return sub(&exp_approx(x, q + 4), &one(), q);
    }
    let wp = q + 16;
    let mut sum = x.clone();
    let mut term = x.clone();
    let mut n = 2u64;
    loop {
        term = div(&mul(&term, x, wp), &int(n), wp);
        if negligible(&term, &sum, wp) {
            return sum;
        }
        sum = add(&sum, &term, wp);
        n += 1;
    }
}

fn log_approx(x: &Real, q: u32) -> Real {
    let Some(mut e) = x.exponent() else {
        return Real::nan(q);
    };
    let mut y = x.mul_2exp(-e);
    if y.compare(&Real::dyadic(3, -2)) == Some(std::cmp::Ordering::Less) {
        y = y.mul_2exp(1);
        e -= 1;
    }
    let wq = q + 16 + (64 - e.unsigned_abs().leading_zeros());
    let z = div(&y.sub_exact(&one()), &y.add_exact(&one()), wq);
    let log_y = if z.is_zero() {
        Real::zero(wq)
    } else {
        atanh_series(&z, wq).mul_2exp(1)
    };
    if e == 0 {
        return log_y;
    }
    let scaled = mul(&ln2(wq), &Real::from_int(e), wq);
    add(&scaled, &log_y, q)
}

fn log1p_approx(x: &Real, q: u32) -> Real {
    if x.exponent().unwrap_or(0) <= -1 {
        let wq = q + 8;
        let z = div(x, &int(2).add_exact(x), wq);
        atanh_series(&z, wq).mul_2exp(1)
    } else {
        log_approx(&one().add_exact(x), q)
    }
}

/// Taylor series of sine and cosine for `|r| <= pi/4` (plus slack).
fn sin_cos_series(r: &Real, q: u32) -> (Real, Real) {
    let r2 = mul(r, r, q);
    let mut s_term = r.clone();
    let mut s_sum = r.clone();
    let mut c_term = one();
    let mut c_sum = one();
    let mut n = 1u64;
    loop {
        s_term = div(&mul(&s_term, &r2, q), &int((2 * n) * (2 * n + 1)), q);
        c_term = div(&mul(&c_term, &r2, q), &int((2 * n - 1) * (2 * n)), q);
        let done = negligible(&s_term, &s_sum, q) && negligible(&c_term, &c_sum, q);
        if n % 2 == 1 {
            s_sum = sub(&s_sum, &s_term, q);
            c_sum = sub(&c_sum, &c_term, q);
        } else {
            s_sum = add(&s_sum, &s_term, q);
            c_sum = add(&c_sum, &c_term, q);
        }
        if done {
            return (s_sum, c_sum);
        }
        n += 1;
    }
}

/// `(sin x, cos x)`, reducing `x` by multiples of pi/2 with enough extra bits
/// to survive cancellation.
fn beyond_reduction(x: &Real) -> bool {
    let huge = x.exponent().is_some_and(|e| e > REDUCTION_LIMIT);
    if huge {
        tracing::warn!(exponent = x.exponent(), "trigonometric argument too large to reduce");
    }
    huge
}

fn sin_cos_approx(x: &Real, q: u32) -> (Real, Real) {
    let e = x.exponent().unwrap_or(0).max(0) as u32;
    let cap = 4 * q + 1024;
    let mut extra = 16u32;
    loop {
        let wp = q + e + extra;
        let half_pi = pi_approx(wp + 8).mul_2exp(-1);
        let k = div(x, &half_pi, wp)
            .nearest_int(wp, Round::Nearest)
            .value
            .to_integer()
            .unwrap_or_default();
        let r = x.sub_exact(&half_pi.mul_exact(&Real::from_int(k.clone())));
        let lost = r.exponent().map(|re| (-re).max(0) as u32);
        let retry = match lost {
            None => true,
            Some(l) => l + 16 > extra,
        };
        if retry && extra < cap {
            extra = (lost.unwrap_or(extra) + 32).max(extra * 2).min(cap);
            continue;
        }
        let r = r.round(q + 16, Round::Nearest).value;
        let (s, c) = sin_cos_series(&r, q + 16);
        let quadrant = k.mod_floor(&BigInt::from(4)).to_u8().unwrap_or(0);
        return match quadrant {
            0 => (s, c),
            1 => (c, s.negated()),
            2 => (s.negated(), c.negated()),
            _ => (c.negated(), s),
        };
    }
}

/// `atan(x)` for `x > 0`.
fn atan_approx(x: &Real, q: u32) -> Real {
    let wq = q + 24;
    if x.is_infinite() {
        return pi_approx(q).mul_2exp(-1);
    }
    if x.cmp_abs(&one()) == std::cmp::Ordering::Greater {
        let inner = atan_approx(&div(&one(), x, wq), wq);
        return sub(&pi_approx(wq).mul_2exp(-1), &inner, q);
    }
    let mut t = x.clone();
    for _ in 0..3 {
        let root = sqrt(&add(&one(), &mul(&t, &t, wq), wq), wq);
        t = div(&t, &add(&one(), &root, wq), wq);
    }
    let t2 = mul(&t, &t, wq);
    let mut power = t.clone();
    let mut sum = t;
    let mut k = 1u64;
    loop {
        power = mul(&power, &t2, wq);
        let term = div(&power, &int(2 * k + 1), wq);
        if negligible(&term, &sum, wq) {
            break;
        }
        sum = if k % 2 == 1 {
            sub(&sum, &term, wq)
        } else {
            add(&sum, &term, wq)
        };
        k += 1;
    }
    sum.mul_2exp(3).round(q, Round::Nearest).value
}

/// Bits lost to `e^(-x²)` when `|x|` is large.
fn gaussian_bits(x2: &Real) -> u32 {
    let whole = x2
        .ceil(64, Round::Up)
        .value
        .to_integer()
        .and_then(|n| n.to_u64())
        .unwrap_or(u64::MAX / LOG2_E_1024);
    (whole.saturating_mul(LOG2_E_1024) >> 10).min(u32::MAX as u64 / 2) as u32
}

fn erf_series(a: &Real, x2: &Real, q: u32) -> Real {
    let two_x2 = x2.mul_2exp(1);
    let mut term = a.clone();
    let mut sum = a.clone();
    let mut n = 1u64;
    loop {
        term = div(&mul(&term, &two_x2, q), &int(2 * n + 1), q);
        if negligible(&term, &sum, q) && n as f64 > x2.to_f64() {
            break;
        }
        sum = add(&sum, &term, q);
        n += 1;
    }
    let scale = div(&int(2), &sqrt(&pi_approx(q), q), q);
    mul(&mul(&scale, &exp_approx(&x2.negated(), q), q), &sum, q)
}

/// Asymptotic expansion of `erfc(a)` for large positive `a`.
fn erfc_asymptotic(a: &Real, x2: &Real, q: u32) -> Real {
    let two_x2 = x2.mul_2exp(1);
    let mut term = one();
    let mut sum = one();
    let mut n = 1u64;
    loop {
        let next = div(&mul(&term, &int(2 * n - 1), q), &two_x2, q);
        if negligible(&next, &sum, q) || next.cmp_abs(&term) != std::cmp::Ordering::Less {
            break;
        }
        term = next;
        sum = if n % 2 == 1 {
            sub(&sum, &term, q)
        } else {
            add(&sum, &term, q)
        };
        n += 1;
    }
    let front = div(
        &exp_approx(&x2.negated(), q),
        &mul(a, &sqrt(&pi_approx(q), q), q),
        q,
    );
    mul(&front, &sum, q)
}

/// `erf(a)` for `a > 0`.
fn erf_approx(a: &Real, q: u32) -> Real {
    let x2 = a.mul_exact(a);
    let wq = q + 24;
    if gaussian_bits(&x2) > q + 64 {
        return sub(&one(), &erfc_asymptotic(a, &x2, wq), q);
    }
    erf_series(a, &x2, wq)
}

fn erfc_approx(x: &Real, q: u32) -> Real {
    if x.is_negative() {
        let a = x.negated();
        return add(&one(), &erf_approx(&a, q + 4), q);
    }
    let x2 = x.mul_exact(x);
    let lost = gaussian_bits(&x2);
    if lost > q + 64 {
        return erfc_asymptotic(x, &x2, q + 24);
    }
    let wq = q + lost + 24;
    sub(&one(), &erf_series(x, &x2, wq), q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-15 * b.abs().max(1.0)
    }

    fn at(x: f64) -> Real {
        Real::from_f64(x)
    }

    #[test]
    fn constants_and_exp_log() {
        assert!(close(Real::pi(53, Round::Nearest).value.to_f64(), std::f64::consts::PI));
        assert!(close(at(1.0).exp(53, Round::Nearest).value.to_f64(), std::f64::consts::E));
        assert!(close(at(10.0).log(53, Round::Nearest).value.to_f64(), 10f64.ln()));
        assert!(close(at(-20.5).exp(53, Round::Nearest).value.to_f64(), (-20.5f64).exp()));
        assert!(close(at(1e-5).log1p(53, Round::Nearest).value.to_f64(), 1e-5f64.ln_1p()));
        assert!(close(at(1e-5).expm1(53, Round::Nearest).value.to_f64(), 1e-5f64.exp_m1()));
    }

    #[test]
    fn exact_special_points() {
        assert!(at(0.0).exp(20, Round::Nearest).exact);
        assert!(at(1.0).log(20, Round::Nearest).exact);
        let l = at(1024.0).log2(20, Round::Nearest);
        assert!(l.exact);
        assert_eq!(l.value.to_f64(), 10.0);
        let t = at(1000.0).log10(20, Round::Nearest);
        assert!(t.exact);
        assert_eq!(t.value.to_f64(), 3.0);
        assert!(!at(2.0).log(20, Round::Nearest).exact);
    }

    #[test]
    fn trigonometry() {
        for x in [0.5, 1.0, 3.0, -2.5, 100.0, 1e6] {
            let s = at(x).sin(53, Round::Nearest).value.to_f64();
            let c = at(x).cos(53, Round::Nearest).value.to_f64();
            assert!((s - x.sin()).abs() < 1e-15, "sin {x}");
            assert!((c - x.cos()).abs() < 1e-15, "cos {x}");
        }
        assert!(close(at(0.3).atan(53, Round::Nearest).value.to_f64(), 0.3f64.atan()));
        assert!(close(at(7.0).atan(53, Round::Nearest).value.to_f64(), 7f64.atan()));
        assert!(close(at(0.4).asin(53, Round::Nearest).value.to_f64(), 0.4f64.asin()));
        assert!(close(at(-0.4).acos(53, Round::Nearest).value.to_f64(), (-0.4f64).acos()));
    }

    #[test]
    fn hyperbolic_and_error_functions() {
        assert!(close(at(0.7).sinh(53, Round::Nearest).value.to_f64(), 0.7f64.sinh()));
        assert!(close(at(-0.7).cosh(53, Round::Nearest).value.to_f64(), 0.7f64.cosh()));
        assert!(close(at(0.2).tanh(53, Round::Nearest).value.to_f64(), 0.2f64.tanh()));
        assert!(close(at(2.0).asinh(53, Round::Nearest).value.to_f64(), 2f64.asinh()));
        assert!(close(at(2.0).acosh(53, Round::Nearest).value.to_f64(), 2f64.acosh()));
        assert!(close(at(0.5).atanh(53, Round::Nearest).value.to_f64(), 0.5f64.atanh()));
        let erf_half = 0.520_499_877_813_046_5;
        assert!(close(at(0.5).erf(53, Round::Nearest).value.to_f64(), erf_half));
        assert!(close(at(0.5).erfc(53, Round::Nearest).value.to_f64(), 1.0 - erf_half));
    }

    #[test]
    fn directed_results_enclose() {
        let down = at(2.0).sqrt(60, Round::Down).value;
        let up = at(2.0).sqrt(60, Round::Up).value;
        assert!(down < up);
        let ld = at(3.0).log(60, Round::Down).value;
        let lu = at(3.0).log(60, Round::Up).value;
        assert!(ld < lu);
    }

    #[test]
    fn powers() {
        let p = at(3.0).pow(&at(4.0), 20, Round::Nearest);
        assert!(p.exact);
        assert_eq!(p.value.to_f64(), 81.0);
        let r = at(4.0).pow(&at(-0.5), 20, Round::Nearest);
        assert!(r.exact);
        assert_eq!(r.value.to_f64(), 0.5);
        assert!(at(-2.0).pow(&at(0.5), 20, Round::Nearest).value.is_nan());
        assert!(close(at(2.0).pow(&at(0.3), 53, Round::Nearest).value.to_f64(), 2f64.powf(0.3)));
        assert_eq!(at(-2.0).pow(&at(3.0), 20, Round::Nearest).value.to_f64(), -8.0);
    }
}
