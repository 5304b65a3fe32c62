//! General coefficient extraction for trees in no particular form.

use super::coefficients::Coefficients;
use super::integer_exponent;
use crate::config::Config;
use crate::expr::{div, mul, neg, one, BinaryOp, Node, UnaryOp};

/// Combines the coefficient vectors of the children operator by operator.
pub(super) fn recursive(tree: &Node, cfg: &Config) -> Option<Coefficients> {
    if tree.is_constant() {
        return Some(Coefficients::constant(tree.clone()));
    }
    match tree {
        Node::Variable => Some(Coefficients::monomial(1, one())),
        Node::Binary(op, a, b) => match op {
            BinaryOp::Add => Some(recursive(a, cfg)?.add(&recursive(b, cfg)?, cfg)),
            BinaryOp::Sub => Some(recursive(a, cfg)?.sub(&recursive(b, cfg)?, cfg)),
            BinaryOp::Mul => Some(recursive(a, cfg)?.mul(&recursive(b, cfg)?, cfg)),
            BinaryOp::Div if b.is_constant() => Some(recursive(a, cfg)?.divide(b, cfg)),
            BinaryOp::Pow => {
                let k = integer_exponent(b)?;
                Some(recursive(a, cfg)?.pow(k, cfg))
            }
            BinaryOp::Div => None,
        },
        Node::Unary(UnaryOp::Neg, a) => Some(recursive(a, cfg)?.neg(cfg)),
        _ => None,
    }
}

/// Distributes products and powers into a list of monomials, collecting
/// equal degrees after each product so nested powers stay bounded.
pub(super) fn expanded(tree: &Node, cfg: &Config) -> Option<Coefficients> {
    Some(Coefficients::from_pairs(expand(tree, cfg)?))
}

type Monomials = Vec<(usize, Node)>;

fn expand(tree: &Node, cfg: &Config) -> Option<Monomials> {
    if tree.is_constant() {
        return Some(vec![(0, tree.clone())]);
    }
    match tree {
        Node::Variable => Some(vec![(1, one())]),
        Node::Binary(BinaryOp::Add, a, b) => {
            let mut terms = expand(a, cfg)?;
            terms.extend(expand(b, cfg)?);
            Some(terms)
        }
        Node::Binary(BinaryOp::Sub, a, b) => {
            let mut terms = expand(a, cfg)?;
            terms.extend(negate(expand(b, cfg)?));
            Some(terms)
        }
        Node::Binary(BinaryOp::Mul, a, b) => {
            let terms = distribute(&expand(a, cfg)?, &expand(b, cfg)?);
            Some(collect(terms, cfg))
        }
        Node::Binary(BinaryOp::Div, a, b) if b.is_constant() => Some(
            expand(a, cfg)?
                .into_iter()
                .map(|(k, c)| (k, div(c, (**b).clone())))
                .collect(),
        ),
        Node::Binary(BinaryOp::Pow, a, b) => {
            let k = integer_exponent(b)?;
            let base = collect(expand(a, cfg)?, cfg);
            let mut acc = vec![(0, one())];
            for _ in 0..k {
                acc = collect(distribute(&acc, &base), cfg);
            }
            Some(acc)
        }
        Node::Unary(UnaryOp::Neg, a) => Some(negate(expand(a, cfg)?)),
        _ => None,
    }
}

/// Sums monomials of equal degree and drops the ones that vanish.
fn collect(terms: Monomials, cfg: &Config) -> Monomials {
    Coefficients::from_pairs(terms)
        .tidy(cfg)
        .iter()
        .map(|(k, c)| (k, c.clone()))
        .collect()
}

fn negate(terms: Monomials) -> Monomials {
    terms.into_iter().map(|(k, c)| (k, neg(c))).collect()
}

fn distribute(a: &[(usize, Node)], b: &[(usize, Node)]) -> Monomials {
    a.iter()
        .flat_map(|(i, ca)| b.iter().map(move |(j, cb)| (i + j, mul(ca.clone(), cb.clone()))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::int;
    use crate::parser::parse_expr;

    fn ints(values: &[i64]) -> Coefficients {
        Coefficients::new(values.iter().map(|v| Some(int(*v))).collect())
    }

    #[test]
    fn recursive_and_expanded_agree() {
        let cfg = Config::default();
        let tree = parse_expr("(x + 2)^3 - x * (x - 1)").expect("parse input");
        let expected = ints(&[8, 13, 5, 1]);
        assert_eq!(recursive(&tree, &cfg), Some(expected.clone()));
        let collected = expanded(&tree, &cfg).map(|c| c.tidy(&cfg));
        assert_eq!(collected, Some(expected));
    }

    #[test]
    fn rejects_non_polynomials() {
        let cfg = Config::default();
        let tree = parse_expr("x / (x + 1)").expect("parse input");
        assert_eq!(recursive(&tree, &cfg), None);
        assert_eq!(expanded(&tree, &cfg), None);
    }

    #[test]
    fn nested_powers_stay_collected() {
        let cfg = Config::default();
        let tree = parse_expr("((x + 1)^4)^4").expect("parse input");
        let coeffs = expanded(&tree, &cfg).map(|c| c.tidy(&cfg)).expect("polynomial");
        assert_eq!(coeffs.degree(), 16);
        assert_eq!(coeffs.get(1), Some(&int(16)));
        assert_eq!(coeffs, recursive(&tree, &cfg).expect("polynomial"));
    }
}
