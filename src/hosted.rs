//! Externally implemented functions and constants referenced from trees.
//!
//! Nodes hold these behind reference-counted handles; two handles are the same
//! function exactly when they point at the same object.

use std::fmt;
use std::sync::Arc;

use crate::numeric::{Interval, Real, Round};

/// A function evaluated by outside code, given as an enclosure over intervals.
pub trait LibraryFunction: Send + Sync {
    fn name(&self) -> &str;

    /// Encloses the `order`-th derivative over `x`.
    fn evaluate(&self, x: &Interval, order: u32, precision: u32) -> Interval;
}

/// A constant evaluated by outside code.
pub trait LibraryConstant: Send + Sync {
    fn name(&self) -> &str;

    /// Value rounded to nearest at `precision` bits.
    fn evaluate(&self, precision: u32) -> Real;

    /// An interval guaranteed to contain the constant.
    fn enclose(&self, precision: u32) -> Interval {
        let mid = self.evaluate(precision + 2);
        let Some(e) = mid.exponent() else {
            return Interval::point(mid);
        };
        let ulp = Real::dyadic(1, e - precision as i64);
        Interval::new(
            mid.sub(&ulp, precision, Round::Down).value,
            mid.add(&ulp, precision, Round::Up).value,
        )
    }
}

/// A point-wise callback. Returning `None` signals failure.
pub trait Procedure: Send + Sync {
    fn descriptor(&self) -> &str;

    fn evaluate(&self, x: &Real, order: u32, precision: u32) -> Option<Real>;
}

macro_rules! handle {
    ($name:ident, $target:ident, $label:ident) => {
        #[derive(Clone)]
        pub struct $name(Arc<dyn $target>);

        impl $name {
            pub fn new(inner: impl $target + 'static) -> Self {
                $name(Arc::new(inner))
            }

            pub fn same(&self, other: &$name) -> bool {
                std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
            }
        }

        impl From<Arc<dyn $target>> for $name {
            fn from(inner: Arc<dyn $target>) -> Self {
                $name(inner)
            }
        }

        impl std::ops::Deref for $name {
            type Target = dyn $target;

            fn deref(&self) -> &Self::Target {
                &*self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &$name) -> bool {
                self.same(other)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0.$label())
            }
        }
    };
}

handle!(FunctionRef, LibraryFunction, name);
handle!(ConstantRef, LibraryConstant, name);
handle!(ProcedureRef, Procedure, descriptor);

/// Evaluates a procedure, mapping a failed callback to NaN.
pub(crate) fn call_procedure(func: &ProcedureRef, x: &Real, order: u32, precision: u32) -> Real {
    match func.evaluate(x, order, precision) {
        Some(value) => value,
        None => {
            tracing::warn!(
                procedure = func.descriptor(),
                order,
                "procedure failed to evaluate; using NaN"
            );
            Real::nan(precision)
        }
    }
}
