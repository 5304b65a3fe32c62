//! Arbitrary-precision numbers: correctly rounded binary floats, elementary
//! functions, fixed-format rounding and intervals.

mod elementary;
mod format;
mod interval;
mod real;

pub use format::Format;
pub use interval::Interval;
pub use real::{EXPONENT_LIMIT, MAX_PRECISION, MIN_PRECISION, Real, Round, Rounded};
