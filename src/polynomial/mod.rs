//! Polynomials in the free variable: classification, coefficient extraction,
//! normal forms and composition.

mod coefficients;
mod divisor;
mod extract;
mod forms;
mod substitute;

use num_traits::{Signed, ToPrimitive};

use crate::config::Config;
use crate::expr::{BinaryOp, Node, UnaryOp};
use crate::numeric::Real;
use crate::rational::evaluate_rational;

pub use coefficients::Coefficients;
pub(crate) use divisor::{divide_by_power, lowest_power_bound};
pub use forms::{is_canonical, is_horner};
pub use substitute::substitute;

/// Dense coefficient vectors are only built up to this degree; larger
/// polynomials are left to the symbolic rules.
pub(crate) const DENSE_DEGREE_LIMIT: u32 = 1 << 10;

/// How [`extract_coefficients_with`] reads the coefficients off a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Linear walks for trees already in a normal form, the recursive
    /// combinator otherwise.
    #[default]
    Auto,
    Horner,
    Canonical,
    Recursive,
    Expanded,
}

pub fn is_polynomial(tree: &Node) -> bool {
    if tree.is_constant() {
        return true;
    }
    match tree {
        Node::Variable => true,
        Node::Binary(BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul, a, b) => {
            is_polynomial(a) && is_polynomial(b)
        }
        Node::Binary(BinaryOp::Div, a, b) => is_polynomial(a) && b.is_constant(),
        Node::Binary(BinaryOp::Pow, a, b) => is_polynomial(a) && integer_exponent(b).is_some(),
        Node::Unary(UnaryOp::Neg, a) => is_polynomial(a),
        _ => false,
    }
}

/// Syntactic degree: `x - x` has degree 1.
pub fn degree(tree: &Node) -> Option<u32> {
    fn syntactic(tree: &Node) -> Option<u32> {
        if tree.is_constant() {
            return Some(0);
        }
        let d = match tree {
            Node::Variable => Some(1),
            Node::Binary(BinaryOp::Add | BinaryOp::Sub, a, b) => {
                Some(syntactic(a)?.max(syntactic(b)?))
            }
            Node::Binary(BinaryOp::Mul, a, b) => syntactic(a)?.checked_add(syntactic(b)?),
            Node::Binary(BinaryOp::Div, a, _) => syntactic(a),
            Node::Binary(BinaryOp::Pow, a, b) => syntactic(a)?.checked_mul(integer_exponent(b)?),
            Node::Unary(UnaryOp::Neg, a) => syntactic(a),
            _ => return None,
        };
        if d.is_none() {
            tracing::debug!("polynomial degree is not representable");
        }
        d
    }

    if !is_polynomial(tree) {
        return None;
    }
    syntactic(tree)
}

/// True for polynomials whose syntactic degree bounds a dense vector we are
/// willing to build.
pub(crate) fn within_dense_limit(tree: &Node) -> bool {
    match degree(tree) {
        Some(d) if d <= DENSE_DEGREE_LIMIT => true,
        Some(d) => {
            tracing::debug!(
                degree = d,
                limit = DENSE_DEGREE_LIMIT,
                "polynomial too large for dense coefficients"
            );
            false
        }
        None => false,
    }
}

/// Non-negative integer value of a constant exponent.
pub(crate) fn integer_exponent(exp: &Node) -> Option<u32> {
    if !exp.is_constant() {
        return None;
    }
    let value = match exp.as_constant() {
        Some(c) => c.to_integer()?,
        None => {
            let r = evaluate_rational(exp)?;
            if !r.is_integer() {
                return None;
            }
            r.to_integer()
        }
    };
    if value.is_negative() {
        return None;
    }
    let k = value.to_u32();
    if k.is_none() {
        tracing::debug!(exponent = %value, "exponent is not representable");
    }
    k
}

pub fn extract_coefficients(tree: &Node, cfg: &Config) -> Option<Coefficients> {
    extract_coefficients_with(tree, Strategy::Auto, cfg)
}

/// Reads the coefficients with an explicit strategy. Forcing `Horner` or
/// `Canonical` on a tree not in that form gives `None`, and so does a degree
/// above [`DENSE_DEGREE_LIMIT`].
pub fn extract_coefficients_with(
    tree: &Node,
    strategy: Strategy,
    cfg: &Config,
) -> Option<Coefficients> {
    if !within_dense_limit(tree) {
        return None;
    }
    let raw = match strategy {
        Strategy::Auto => {
            if let Some(pairs) = forms::horner_walk(tree) {
                tracing::trace!("coefficients from the horner walk");
                Coefficients::from_pairs(pairs)
            } else if let Some(pairs) = forms::canonical_walk(tree) {
                tracing::trace!("coefficients from the canonical walk");
                Coefficients::from_pairs(pairs)
            } else {
                extract::recursive(tree, cfg)?
            }
        }
        Strategy::Horner => Coefficients::from_pairs(forms::horner_walk(tree)?),
        Strategy::Canonical => Coefficients::from_pairs(forms::canonical_walk(tree)?),
        Strategy::Recursive => extract::recursive(tree, cfg)?,
        Strategy::Expanded => extract::expanded(tree, cfg)?,
    };
    Some(raw.tidy(cfg))
}

/// Coefficient of `x^i`; the zero constant past the degree.
pub fn get_ith_coefficient(tree: &Node, i: usize, cfg: &Config) -> Option<Node> {
    Some(extract_coefficients(tree, cfg)?.coefficient(i))
}

/// Keeps only the monomials whose degrees are listed. With `fill_degrees`
/// every degree above the last listed index is kept as well.
pub fn get_subpolynomial(
    tree: &Node,
    indices: &[usize],
    fill_degrees: bool,
    cfg: &Config,
) -> Option<Node> {
    let coeffs = extract_coefficients(tree, cfg)?;
    let above = match (fill_degrees, indices.last()) {
        (true, Some(last)) => Some(*last),
        _ => None,
    };
    let terms = (0..coeffs.len())
        .map(|i| {
            let keep = indices.contains(&i) || above.is_some_and(|last| i > last);
            keep.then(|| coeffs.get(i).cloned()).flatten()
        })
        .collect();
    Some(Coefficients::new(terms).into_horner())
}

/// Horner form with the given constant coefficients, lowest degree first.
pub fn make_polynomial(coeffs: &[Real]) -> Node {
    Coefficients::new(coeffs.iter().map(|c| Some(Node::Constant(c.clone()))).collect())
        .into_horner()
}

/// `tree^k` expanded, in Horner form. `None` when the result would exceed
/// [`DENSE_DEGREE_LIMIT`].
pub fn power(tree: &Node, k: u32, cfg: &Config) -> Option<Node> {
    let d = degree(tree)?.checked_mul(k)?;
    if d > DENSE_DEGREE_LIMIT {
        tracing::debug!(degree = d, "power too large to expand");
        return None;
    }
    Some(extract_coefficients(tree, cfg)?.pow(k, cfg).into_horner())
}

/// Largest `k` such that `x^k` divides the polynomial; `None` for the zero
/// polynomial and for non polynomials. Above [`DENSE_DEGREE_LIMIT`] the
/// power is read off the tree structure.
pub fn max_power_divider(tree: &Node, cfg: &Config) -> Option<usize> {
    if is_polynomial(tree) && !within_dense_limit(tree) {
        return match lowest_power_bound(tree) {
            u32::MAX => None,
            k => Some(k as usize),
        };
    }
    extract_coefficients(tree, cfg)?.lowest_degree()
}

/// Rebuilds polynomials in Horner form; other trees keep their shape with
/// their polynomial sub-trees rebuilt.
pub fn to_horner(tree: &Node, cfg: &Config) -> Node {
    match extract_coefficients(tree, cfg) {
        Some(coeffs) => coeffs.into_horner(),
        None => tree.map_children(|child| to_horner(child, cfg)),
    }
}

/// Like [`to_horner`], with the canonical monomial sum as normal form.
pub fn to_canonical(tree: &Node, cfg: &Config) -> Node {
    match extract_coefficients(tree, cfg) {
        Some(coeffs) => coeffs.into_canonical(),
        None => tree.map_children(|child| to_canonical(child, cfg)),
    }
}

/// Rebuilds `coeffs` in the form `original` was written in, Horner by default.
pub(crate) fn rebuild_like(original: &Node, coeffs: Coefficients) -> Node {
    if is_canonical(original) && !is_horner(original) {
        coeffs.into_canonical()
    } else {
        coeffs.into_horner()
    }
}

/// Derivative of a tree in Horner or canonical form, in the same form.
pub(crate) fn differentiate_normal_form(tree: &Node) -> Option<Node> {
    if !within_dense_limit(tree) {
        return None;
    }
    if let Some(pairs) = forms::horner_walk(tree) {
        return Some(Coefficients::from_pairs(pairs).derivative().into_horner());
    }
    let pairs = forms::canonical_walk(tree)?;
    Some(Coefficients::from_pairs(pairs).derivative().into_canonical())
}
