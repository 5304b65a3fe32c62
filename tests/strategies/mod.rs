#![allow(dead_code)]

use fpexpr::{
    Coefficients, Node, Real, UnaryOp, add, div, int, make_polynomial, mul, neg, pi, pow, sub, var,
};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        (0i64..=3).prop_map(int),
        Just(var()),
        Just(var()),
        Just(pi()),
    ]
}

const SMOOTH: [UnaryOp; 22] = [
    UnaryOp::Sqrt,
    UnaryOp::Exp,
    UnaryOp::Log,
    UnaryOp::Log2,
    UnaryOp::Log10,
    UnaryOp::Sin,
    UnaryOp::Cos,
    UnaryOp::Tan,
    UnaryOp::Asin,
    UnaryOp::Acos,
    UnaryOp::Atan,
    UnaryOp::Sinh,
    UnaryOp::Cosh,
    UnaryOp::Tanh,
    UnaryOp::Asinh,
    UnaryOp::Acosh,
    UnaryOp::Atanh,
    UnaryOp::Abs,
    UnaryOp::Erf,
    UnaryOp::Erfc,
    UnaryOp::Log1p,
    UnaryOp::Expm1,
];

/// Smooth functions only; rounding operators are discontinuous and get
/// their own generator.
fn smooth() -> impl Strategy<Value = UnaryOp> {
    prop::sample::select(SMOOTH.to_vec())
}

fn rounding() -> impl Strategy<Value = UnaryOp> {
    prop_oneof![
        Just(UnaryOp::Floor),
        Just(UnaryOp::Ceil),
        Just(UnaryOp::NearestInt),
        Just(UnaryOp::ToDouble),
        Just(UnaryOp::ToSingle),
    ]
}

/// Every smooth operator, with powers to constant and non-constant exponents.
pub fn arb_expr() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(6, 64, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| add(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| sub(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| mul(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| div(a, b)),
            (inner.clone(), 1i64..=3).prop_map(|(a, k)| pow(a, int(k))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| pow(a, b)),
            inner.clone().prop_map(neg),
            (smooth(), inner.clone()).prop_map(|(op, a)| Node::unary(op, a)),
        ]
    })
}

/// Like [`arb_expr`], with rounding operators mixed in.
pub fn arb_expr_with_rounding() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(4, 48, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| add(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| mul(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| div(a, b)),
            inner.clone().prop_map(neg),
            (smooth(), inner.clone()).prop_map(|(op, a)| Node::unary(op, a)),
            (rounding(), inner.clone()).prop_map(|(op, a)| Node::unary(op, a)),
        ]
    })
}

/// Polynomial trees in no particular normal form.
pub fn arb_polynomial_tree() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![(-3i64..=3).prop_map(int), Just(var()), Just(var())];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| add(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| sub(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| mul(a, b)),
            (inner.clone(), 1i64..=3).prop_map(|(a, k)| pow(a, int(k))),
            inner.clone().prop_map(neg),
        ]
    })
}

/// Polynomial trees with divisions by three and zero exponents mixed in.
pub fn arb_rational_polynomial_tree() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![(-3i64..=3).prop_map(int), Just(var()), Just(var())];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| add(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| sub(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| mul(a, b)),
            (inner.clone(), 0i64..=3).prop_map(|(a, k)| pow(a, int(k))),
            inner.clone().prop_map(|a| div(a, int(3))),
            inner.clone().prop_map(neg),
        ]
    })
}

/// Coefficient vectors of quotients `a/b` with `|a| <= 5`, `1 <= b <= 7`,
/// degree at most `max_degree`.
pub fn arb_rational_coefficients(max_degree: usize) -> impl Strategy<Value = Coefficients> {
    prop::collection::vec((-5i64..=5, 1i64..=7), 1..=max_degree + 1).prop_map(|cs| {
        let terms = cs
            .into_iter()
            .map(|(a, b)| (a != 0).then(|| div(int(a), int(b))))
            .collect();
        Coefficients::new(terms)
    })
}

/// Horner trees with small integer coefficients, degree at most `max_degree`.
pub fn arb_horner(max_degree: usize) -> impl Strategy<Value = Node> {
    prop::collection::vec(-3i64..=3, 1..=max_degree + 1)
        .prop_map(|cs| make_polynomial(&cs.into_iter().map(Real::from_int).collect::<Vec<_>>()))
}

/// Dyadic evaluation points `n/8` in `[-2, 2]`.
pub fn arb_point() -> impl Strategy<Value = Real> {
    (-16i64..=16).prop_map(|n| Real::dyadic(n, -3))
}
