//! Exact evaluation of constant trees over the rationals.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{BinaryOp, Node, UnaryOp};

/// Exponents beyond this size are left to ordinary folding.
const MAX_EXPONENT: u32 = 1 << 12;

/// Evaluates a constant tree built from `+ - * /`, negation, square roots of
/// perfect squares and integer powers. `None` for anything else.
pub fn evaluate_rational(tree: &Node) -> Option<BigRational> {
    match tree {
        Node::Constant(c) => c.to_rational(),
        Node::Binary(op, a, b) => {
            let a = evaluate_rational(a)?;
            let b = evaluate_rational(b)?;
            match op {
                BinaryOp::Add => Some(a + b),
                BinaryOp::Sub => Some(a - b),
                BinaryOp::Mul => Some(a * b),
                BinaryOp::Div => (!b.is_zero()).then(|| a / b),
                BinaryOp::Pow => integer_power(&a, &b),
            }
        }
        Node::Unary(UnaryOp::Neg, a) => Some(-evaluate_rational(a)?),
        Node::Unary(UnaryOp::Sqrt, a) => exact_sqrt(&evaluate_rational(a)?),
        _ => None,
    }
}

fn integer_power(base: &BigRational, exp: &BigRational) -> Option<BigRational> {
    if !exp.is_integer() {
        return None;
    }
    let n = exp.to_integer();
    let k = n.abs().to_u32().filter(|k| *k <= MAX_EXPONENT)?;
    if n.is_negative() {
        if base.is_zero() {
            return None;
        }
        Some(num_traits::pow(base.recip(), k as usize))
    } else {
        Some(num_traits::pow(base.clone(), k as usize))
    }
}

fn exact_sqrt(value: &BigRational) -> Option<BigRational> {
    if value.is_negative() {
        return None;
    }
    let root = |n: &BigInt| {
        let r = n.sqrt();
        (&r * &r == *n).then_some(r)
    };
    let numer = root(value.numer())?;
    let denom = root(value.denom())?;
    Some(BigRational::new(numer, denom))
}

/// True when `value` has a power-of-two denominator.
pub(crate) fn is_dyadic(value: &BigRational) -> bool {
    let d = value.denom();
    d.is_one() || (d.magnitude().count_ones() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn rational(input: &str) -> Option<BigRational> {
        evaluate_rational(&parse_expr(input).expect("parse input"))
    }

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn field_operations() {
        assert_eq!(rational("1/3 + 1/3 + 1/3"), Some(ratio(1, 1)));
        assert_eq!(rational("(2/3)^-2"), Some(ratio(9, 4)));
        assert_eq!(rational("sqrt(9/4) - 1"), Some(ratio(1, 2)));
    }

    #[test]
    fn rejects_irrational_and_undefined() {
        assert_eq!(rational("sqrt(2)"), None);
        assert_eq!(rational("1/0"), None);
        assert_eq!(rational("2^(1/2)"), None);
        assert_eq!(rational("exp(0)"), None);
        assert_eq!(rational("x + 1"), None);
    }

    #[test]
    fn dyadic_detection() {
        assert!(is_dyadic(&ratio(3, 8)));
        assert!(!is_dyadic(&ratio(1, 3)));
    }
}
