//! Rounding to fixed floating-point formats.

use std::cmp::Ordering;

use super::real::{Real, Round, Rounded};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Half,
    Single,
    Double,
    DoubleExtended,
    Quad,
    DoubleDouble,
    TripleDouble,
}

impl Format {
    /// `(precision, exponent width)` of the IEEE-style formats.
    fn ieee(self) -> Option<(u32, u32)> {
        match self {
            Format::Half => Some((11, 5)),
            Format::Single => Some((24, 8)),
            Format::Double => Some((53, 11)),
            Format::DoubleExtended => Some((64, 15)),
            Format::Quad => Some((113, 15)),
            Format::DoubleDouble | Format::TripleDouble => None,
        }
    }

    /// Number of doubles in an expansion format.
    fn limbs(self) -> usize {
        match self {
            Format::DoubleDouble => 2,
            Format::TripleDouble => 3,
            _ => 1,
        }
    }
}

impl Real {
    /// Rounds into `format`, including subnormals and overflow.
    ///
    /// Expansion formats round limb by limb: each limb is the double nearest
    /// (in direction `rnd`) to what the previous limbs left over.
    pub fn round_to_format(&self, format: Format, rnd: Round) -> Rounded {
        if !self.is_finite() || self.is_zero() {
            return Rounded::exact(self.clone());
        }
        let value = match format.ieee() {
            Some((prec, width)) => round_ieee(self, prec, width, rnd),
            None => {
                let mut total = Real::zero(53);
                let mut rest = self.clone();
                for _ in 0..format.limbs() {
                    if rest.is_zero() {
                        break;
                    }
                    let limb = round_ieee(&rest, 53, 11, rnd);
                    if !limb.is_finite() {
                        total = limb;
                        break;
                    }
                    rest = rest.sub_exact(&limb);
                    total = total.add_exact(&limb);
                }
                total
            }
        };
        let exact = value.compare(self) == Some(Ordering::Equal);
        Rounded { value, exact }
    }
}

fn round_ieee(x: &Real, prec: u32, width: u32, rnd: Round) -> Real {
    let emax = 1i64 << (width - 1);
    let rounded = x.round(prec, rnd).value;
    // largest finite value is (2^prec - 1)·2^(emax - prec)
    let largest = Real::dyadic(
        (num_bigint::BigInt::from(1) << prec as usize) - 1,
        emax - prec as i64,
    );
    if rounded.cmp_abs(&largest) == Ordering::Greater || rounded.is_infinite() {
        let negative = x.is_negative();
        let saturate = match rnd {
            Round::Nearest => false,
            Round::Up => negative,
            Round::Down => !negative,
        };
        return if saturate {
            if negative {
                largest.negated()
            } else {
                largest
            }
        } else {
            Real::infinity(negative, prec)
        };
    }
    // smallest normal magnitude is 2^(2 - emax) = 2^(e - 1) with e = 3 - emax
    let normal_exponent = 3 - emax;
    if x.exponent().unwrap_or(normal_exponent) >= normal_exponent {
        return rounded;
    }
    let scale = emax - 3 + prec as i64;
    let scaled = x.mul_2exp(scale);
    let integral = match rnd {
        Round::Nearest => scaled.nearest_int(prec + 2, Round::Nearest),
        Round::Up => scaled.ceil(prec + 2, Round::Nearest),
        Round::Down => scaled.floor(prec + 2, Round::Nearest),
    };
    integral.value.mul_2exp(-scale).with_precision(prec)
}
