//! Powers of the variable dividing a polynomial, read off the tree without
//! building its coefficients.

use super::integer_exponent;
use crate::expr::{div, int, mul, neg, one, pow, var, zero, BinaryOp, Node, UnaryOp};

/// A `k` such that `x^k` divides the polynomial tree, from its structure
/// alone. Exact unless terms cancel; the zero literal gives `u32::MAX`.
pub(crate) fn lowest_power_bound(tree: &Node) -> u32 {
    if tree.is_zero() {
        return u32::MAX;
    }
    if tree.is_constant() {
        return 0;
    }
    match tree {
        Node::Variable => 1,
        Node::Binary(BinaryOp::Add | BinaryOp::Sub, a, b) => {
            lowest_power_bound(a).min(lowest_power_bound(b))
        }
        Node::Binary(BinaryOp::Mul, a, b) => {
            lowest_power_bound(a).saturating_add(lowest_power_bound(b))
        }
        Node::Binary(BinaryOp::Div, a, _) => lowest_power_bound(a),
        Node::Binary(BinaryOp::Pow, a, n) => match integer_exponent(n) {
            Some(n) if n > 0 => lowest_power_bound(a).saturating_mul(n),
            _ => 0,
        },
        Node::Unary(UnaryOp::Neg, a) => lowest_power_bound(a),
        _ => 0,
    }
}

/// `tree / x^k` rebuilt on the same structure. Requires
/// `k <= lowest_power_bound(tree)`.
pub(crate) fn divide_by_power(tree: &Node, k: u32) -> Node {
    if k == 0 {
        return tree.clone();
    }
    if tree.is_zero() {
        return zero();
    }
    match tree {
        Node::Variable => one(),
        Node::Binary(op @ (BinaryOp::Add | BinaryOp::Sub), a, b) => {
            Node::binary(*op, divide_by_power(a, k), divide_by_power(b, k))
        }
        Node::Binary(BinaryOp::Mul, a, b) => {
            let j = lowest_power_bound(a).min(k);
            mul(divide_by_power(a, j), divide_by_power(b, k - j))
        }
        Node::Binary(BinaryOp::Div, a, b) => div(divide_by_power(a, k), (**b).clone()),
        Node::Binary(BinaryOp::Pow, a, n) => {
            let n = integer_exponent(n).unwrap_or(0);
            let v = lowest_power_bound(a);
            if v == u32::MAX {
                return zero();
            }
            if a.is_variable() {
                return x_power(u64::from(n) - u64::from(k));
            }
            let rest = u64::from(v) * u64::from(n) - u64::from(k);
            let reduced = pow(divide_by_power(a, v), int(i64::from(n)));
            if rest == 0 {
                reduced
            } else {
                mul(reduced, x_power(rest))
            }
        }
        Node::Unary(UnaryOp::Neg, a) => neg(divide_by_power(a, k)),
        _ => tree.clone(),
    }
}

fn x_power(k: u64) -> Node {
    match k {
        0 => one(),
        1 => var(),
        _ => pow(var(), int(k as i64)),
    }
}
