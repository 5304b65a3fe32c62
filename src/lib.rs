//! Symbolic expression core for precision-aware numerical tooling: an
//! expression tree over one free variable, point and range evaluation,
//! simplification that respects rounding, differentiation and polynomial
//! algebra.

pub mod calculus;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod expr;
pub mod format;
pub mod hosted;
pub mod numeric;
pub mod parser;
pub mod polynomial;
pub mod range;
pub mod rational;
pub mod simplify;

pub use calculus::{differentiate, differentiate_n};
pub use config::Config;
pub use error::{CoreError, Result};
pub use evaluate::{evaluate, evaluate_constant, evaluate_rounded};
pub use expr::{
    BinaryOp, Kind, Node, UnaryOp, add, div, int, mul, neg, one, pi, pow, sub, var, zero,
};
pub use format::pretty;
pub use hosted::{
    ConstantRef, FunctionRef, LibraryConstant, LibraryFunction, Procedure, ProcedureRef,
};
pub use numeric::{Format, Interval, Real, Round, Rounded};
pub use parser::parse_expr;
pub use polynomial::{
    Coefficients, Strategy, degree, extract_coefficients, extract_coefficients_with,
    get_ith_coefficient, get_subpolynomial, is_canonical, is_horner, is_polynomial,
    make_polynomial, max_power_divider, power, substitute, to_canonical, to_horner,
};
pub use range::evaluate_range;
pub use simplify::{
    simplify_all_but_division, simplify_errorfree, simplify_numeric, substitute_variable,
};
