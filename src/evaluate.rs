//! Point evaluation of expression trees.

use crate::expr::{BinaryOp, Node, UnaryOp};
use crate::hosted::call_procedure;
use crate::numeric::{Format, Interval, Real, Round, Rounded};

/// Evaluates `tree` at `x`, rounding every operation to nearest at `precision`.
pub fn evaluate(tree: &Node, x: &Real, precision: u32) -> Real {
    evaluate_rounded(tree, x, precision, Round::Nearest).value
}

/// Like [`evaluate`], with the top-level operation rounded in direction `rnd`
/// and its exactness reported.
pub fn evaluate_rounded(tree: &Node, x: &Real, precision: u32, rnd: Round) -> Rounded {
    match eval(tree, Some(x), precision, rnd) {
        Some(r) => r,
        None => Rounded::exact(Real::nan(precision)),
    }
}

/// Evaluates a tree without a free variable. `None` when `Variable` occurs.
pub fn evaluate_constant(tree: &Node, precision: u32) -> Option<Real> {
    eval(tree, None, precision, Round::Nearest).map(Rounded::into_value)
}

fn eval(tree: &Node, x: Option<&Real>, prec: u32, rnd: Round) -> Option<Rounded> {
    let result = match tree {
        Node::Variable => x?.round(prec, rnd),
        Node::Constant(c) => c.round(prec, rnd),
        Node::Pi => Real::pi(prec, rnd),
        Node::LibraryConstant(c) => Rounded::inexact(c.evaluate(prec)),
        Node::Binary(op, a, b) => {
            let a = eval(a, x, prec, Round::Nearest)?.value;
            let b = eval(b, x, prec, Round::Nearest)?.value;
            apply_binary(*op, &a, &b, prec, rnd)
        }
        Node::Unary(op, a) => {
            let a = eval(a, x, prec, Round::Nearest)?.value;
            apply_unary(*op, &a, prec, rnd)
        }
        Node::LibraryFunction { func, order, arg } => {
            let a = eval(arg, x, prec, Round::Nearest)?.value;
            let image = func.evaluate(&Interval::point(a), *order, prec);
            Rounded::inexact(image.mid(prec))
        }
        Node::Procedure { func, order, arg } => {
            let a = eval(arg, x, prec, Round::Nearest)?.value;
            Rounded::inexact(call_procedure(func, &a, *order, prec).round(prec, rnd).value)
        }
    };
    Some(result)
}

pub(crate) fn apply_binary(op: BinaryOp, a: &Real, b: &Real, prec: u32, rnd: Round) -> Rounded {
    match op {
        BinaryOp::Add => a.add(b, prec, rnd),
        BinaryOp::Sub => a.sub(b, prec, rnd),
        BinaryOp::Mul => a.mul(b, prec, rnd),
        BinaryOp::Div => a.div(b, prec, rnd),
        BinaryOp::Pow => a.pow(b, prec, rnd),
    }
}

pub(crate) fn apply_unary(op: UnaryOp, a: &Real, prec: u32, rnd: Round) -> Rounded {
    match op {
        UnaryOp::Sqrt => a.sqrt(prec, rnd),
        UnaryOp::Exp => a.exp(prec, rnd),
        UnaryOp::Log => a.log(prec, rnd),
        UnaryOp::Log2 => a.log2(prec, rnd),
        UnaryOp::Log10 => a.log10(prec, rnd),
        UnaryOp::Sin => a.sin(prec, rnd),
        UnaryOp::Cos => a.cos(prec, rnd),
        UnaryOp::Tan => a.tan(prec, rnd),
        UnaryOp::Asin => a.asin(prec, rnd),
        UnaryOp::Acos => a.acos(prec, rnd),
        UnaryOp::Atan => a.atan(prec, rnd),
        UnaryOp::Sinh => a.sinh(prec, rnd),
        UnaryOp::Cosh => a.cosh(prec, rnd),
        UnaryOp::Tanh => a.tanh(prec, rnd),
        UnaryOp::Asinh => a.asinh(prec, rnd),
        UnaryOp::Acosh => a.acosh(prec, rnd),
        UnaryOp::Atanh => a.atanh(prec, rnd),
        UnaryOp::Neg => a.neg(prec, rnd),
        UnaryOp::Abs => a.abs(prec, rnd),
        UnaryOp::Ceil => a.ceil(prec, rnd),
        UnaryOp::Floor => a.floor(prec, rnd),
        UnaryOp::NearestInt => a.nearest_int(prec, rnd),
        UnaryOp::Erf => a.erf(prec, rnd),
        UnaryOp::Erfc => a.erfc(prec, rnd),
        UnaryOp::Log1p => a.log1p(prec, rnd),
        UnaryOp::Expm1 => a.expm1(prec, rnd),
        UnaryOp::ToDouble => to_format(a, Format::Double, prec, rnd),
        UnaryOp::ToSingle => to_format(a, Format::Single, prec, rnd),
        UnaryOp::ToQuad => to_format(a, Format::Quad, prec, rnd),
        UnaryOp::ToHalfPrecision => to_format(a, Format::Half, prec, rnd),
        UnaryOp::ToDoubleDouble => to_format(a, Format::DoubleDouble, prec, rnd),
        UnaryOp::ToTripleDouble => to_format(a, Format::TripleDouble, prec, rnd),
        UnaryOp::ToDoubleExtended => to_format(a, Format::DoubleExtended, prec, rnd),
    }
}

fn to_format(a: &Real, format: Format, prec: u32, rnd: Round) -> Rounded {
    let r = a.round_to_format(format, rnd);
    r.value.round(prec, rnd).and_exact(r.exact)
}
