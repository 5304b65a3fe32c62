//! Naive interval evaluation: every operator is replaced by its interval
//! counterpart. Enclosures are valid but can be wide when the variable occurs
//! more than once.

use crate::expr::{BinaryOp, Node, UnaryOp};
use crate::hosted::call_procedure;
use crate::numeric::{Interval, Real, Round};

pub fn evaluate_range(tree: &Node, x: &Interval, precision: u32) -> Interval {
    match tree {
        Node::Variable => x.clone(),
        Node::Constant(c) => Interval::point(c.clone()),
        Node::Pi => Interval::new(
            Real::pi(precision, Round::Down).value,
            Real::pi(precision, Round::Up).value,
        ),
        Node::LibraryConstant(c) => c.enclose(precision),
        Node::Binary(op, a, b) => {
            let a = evaluate_range(a, x, precision);
            let b = evaluate_range(b, x, precision);
            match op {
                BinaryOp::Add => a.add(&b, precision),
                BinaryOp::Sub => a.sub(&b, precision),
                BinaryOp::Mul => a.mul(&b, precision),
                BinaryOp::Div => a.div(&b, precision),
                BinaryOp::Pow => a.pow(&b, precision),
            }
        }
        Node::Unary(op, a) => unary_range(*op, &evaluate_range(a, x, precision), precision),
        Node::LibraryFunction { func, order, arg } => {
            func.evaluate(&evaluate_range(arg, x, precision), *order, precision)
        }
        Node::Procedure { func, order, arg } => {
            let inner = evaluate_range(arg, x, precision);
            if !inner.is_point() {
                // point callbacks give no enclosure over a range
                return Interval::entire(precision);
            }
            let value = call_procedure(func, inner.lo(), *order, precision);
            if value.is_nan() {
                return Interval::nan(precision);
            }
            let Some(e) = value.exponent() else {
                return Interval::point(value);
            };
            let ulp = Real::dyadic(1, e - precision as i64 + 1);
            Interval::new(
                value.sub(&ulp, precision, Round::Down).value,
                value.add(&ulp, precision, Round::Up).value,
            )
        }
    }
}

fn unary_range(op: UnaryOp, a: &Interval, prec: u32) -> Interval {
    if let Some(format) = op.format() {
        return a.round_to_format(format);
    }
    match op {
        UnaryOp::Sqrt => a.sqrt(prec),
        UnaryOp::Exp => a.exp(prec),
        UnaryOp::Log => a.log(prec),
        UnaryOp::Log2 => a.log2(prec),
        UnaryOp::Log10 => a.log10(prec),
        UnaryOp::Sin => a.sin(prec),
        UnaryOp::Cos => a.cos(prec),
        UnaryOp::Tan => a.tan(prec),
        UnaryOp::Asin => a.asin(prec),
        UnaryOp::Acos => a.acos(prec),
        UnaryOp::Atan => a.atan(prec),
        UnaryOp::Sinh => a.sinh(prec),
        UnaryOp::Cosh => a.cosh(prec),
        UnaryOp::Tanh => a.tanh(prec),
        UnaryOp::Asinh => a.asinh(prec),
        UnaryOp::Acosh => a.acosh(prec),
        UnaryOp::Atanh => a.atanh(prec),
        UnaryOp::Neg => a.neg(),
        UnaryOp::Abs => a.abs(prec),
        UnaryOp::Ceil => a.ceil(prec),
        UnaryOp::Floor => a.floor(prec),
        UnaryOp::NearestInt => a.nearest_int(prec),
        UnaryOp::Erf => a.erf(prec),
        UnaryOp::Erfc => a.erfc(prec),
        UnaryOp::Log1p => a.log1p(prec),
        UnaryOp::Expm1 => a.expm1(prec),
        // format roundings returned above
        _ => a.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, int, mul, var};

    #[test]
    fn encloses_a_polynomial() {
        let tree = add(mul(var(), var()), int(1));
        let x = Interval::new(Real::from_int(-1), Real::from_int(2));
        let r = evaluate_range(&tree, &x, 53);
        assert!(r.contains(&Real::from_int(1)));
        assert!(r.contains(&Real::from_int(5)));
    }

    #[test]
    fn brackets_pi() {
        let r = evaluate_range(&Node::Pi, &Interval::point(Real::zero(53)), 60);
        assert!(r.lo() < r.hi());
        assert_eq!(r.lo().to_f64(), std::f64::consts::PI);
        assert_eq!(r.hi().to_f64(), std::f64::consts::PI);
    }
}
