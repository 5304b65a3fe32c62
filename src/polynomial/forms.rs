//! Horner and canonical normal forms: structural recognition, the linear
//! walks that read coefficients off a recognised tree, and rebuilding.

use super::coefficients::Coefficients;
use crate::expr::{add, int, mul, one, pow, sub, var, zero, BinaryOp, Node};

/// `x^g` is `x` for `g = 1` and `Pow(x, g)` otherwise.
fn power_of_x(g: usize) -> Node {
    if g == 1 {
        var()
    } else {
        pow(var(), int(g as i64))
    }
}

/// Degree of `x` or `x^k` with a positive integer literal `k`.
fn x_power(tree: &Node) -> Option<usize> {
    match tree {
        Node::Variable => Some(1),
        Node::Binary(BinaryOp::Pow, base, exp) if base.is_variable() => {
            let k = exp.as_constant()?.to_i64()?;
            (k >= 1).then_some(k as usize)
        }
        _ => None,
    }
}

pub fn is_horner(tree: &Node) -> bool {
    horner_walk(tree).is_some()
}

pub fn is_canonical(tree: &Node) -> bool {
    canonical_walk(tree).is_some()
}

/// Coefficients of a tree of the shape `c + x^g·(…)`, `x^g·(…)`, `x^g` or `c`.
pub(super) fn horner_walk(tree: &Node) -> Option<Vec<(usize, Node)>> {
    fn walk(tree: &Node, offset: usize, out: &mut Vec<(usize, Node)>) -> Option<()> {
        if tree.is_constant() {
            out.push((offset, tree.clone()));
            return Some(());
        }
        if let Some(g) = x_power(tree) {
            out.push((offset + g, one()));
            return Some(());
        }
        match tree {
            Node::Binary(BinaryOp::Mul, a, b) => {
                let g = x_power(a)?;
                walk(b, offset + g, out)
            }
            Node::Binary(BinaryOp::Add, c, rest) if c.is_constant() => {
                let leads_with_x = match &**rest {
                    Node::Binary(BinaryOp::Mul, a, _) => x_power(a).is_some(),
                    other => x_power(other).is_some(),
                };
                if !leads_with_x {
                    return None;
                }
                out.push((offset, (**c).clone()));
                walk(rest, offset, out)
            }
            _ => None,
        }
    }

    let mut out = Vec::new();
    walk(tree, 0, &mut out)?;
    Some(out)
}

/// Coefficients of a left-nested sum of monomials `c`, `c·x`, `c·x^k` in
/// strictly increasing degree. A `Sub` contributes the negated monomial.
pub(super) fn canonical_walk(tree: &Node) -> Option<Vec<(usize, Node)>> {
    fn monomial(tree: &Node) -> Option<(usize, Node)> {
        if tree.is_constant() {
            return Some((0, tree.clone()));
        }
        if let Some(k) = x_power(tree) {
            return Some((k, one()));
        }
        match tree {
            Node::Binary(BinaryOp::Mul, c, p) if c.is_constant() => {
                Some((x_power(p)?, (**c).clone()))
            }
            _ => None,
        }
    }

    fn negated(c: Node) -> Node {
        match c.as_constant() {
            Some(v) => Node::Constant(v.negated()),
            None => crate::expr::neg(c),
        }
    }

    fn walk(tree: &Node, out: &mut Vec<(usize, Node)>) -> Option<()> {
        match tree {
            _ if tree.is_constant() => out.push((0, tree.clone())),
            Node::Binary(BinaryOp::Add, a, b) => {
                walk(a, out)?;
                out.push(monomial(b)?);
            }
            Node::Binary(BinaryOp::Sub, a, b) => {
                walk(a, out)?;
                let (k, c) = monomial(b)?;
                out.push((k, negated(c)));
            }
            _ => out.push(monomial(tree)?),
        }
        Some(())
    }

    let mut out = Vec::new();
    walk(tree, &mut out)?;
    let increasing = out.windows(2).all(|w| w[0].0 < w[1].0);
    increasing.then_some(out)
}

impl Coefficients {
    /// `c0 + x^g1·(c1 + x^g2·(…))`, with leading absent coefficients pulled
    /// out as `x^k·(…)` and a unit innermost coefficient elided.
    pub fn into_horner(self) -> Node {
        let mut present = self.iter().map(|(i, c)| (i, c.clone())).collect::<Vec<_>>();
        let Some((top, leading)) = present.pop() else {
            return zero();
        };
        let times_power = |g: usize, rest: Node| {
            if rest.is_one() {
                power_of_x(g)
            } else {
                mul(power_of_x(g), rest)
            }
        };
        let mut degree = top;
        let mut acc = leading;
        for (d, c) in present.into_iter().rev() {
            acc = add(c, times_power(degree - d, acc));
            degree = d;
        }
        if degree > 0 {
            acc = times_power(degree, acc);
        }
        acc
    }

    /// Left-nested sum of monomials in increasing degree.
    pub fn into_canonical(self) -> Node {
        let monomial = |k: usize, c: Node| match k {
            0 => c,
            _ if c.is_one() => power_of_x(k),
            _ => mul(c, power_of_x(k)),
        };
        let mut acc: Option<Node> = None;
        for (k, c) in self.iter() {
            let c = c.clone();
            acc = Some(match acc {
                None => monomial(k, c),
                Some(acc) => match c.as_constant() {
                    Some(v) if v.is_negative() => {
                        sub(acc, monomial(k, Node::Constant(v.negated())))
                    }
                    _ => add(acc, monomial(k, c)),
                },
            });
        }
        acc.unwrap_or_else(zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn ints(values: &[i64]) -> Coefficients {
        Coefficients::new(values.iter().map(|v| Some(int(*v))).collect())
    }

    fn parsed(input: &str) -> Node {
        parse_expr(input).expect("parse input")
    }

    #[test]
    fn horner_layout() {
        assert_eq!(ints(&[1, 2, 3]).into_horner(), parsed("1 + x * (2 + x * 3)"));
        assert_eq!(ints(&[0, 0, 5, 0, 1]).into_horner(), parsed("x^2 * (5 + x^2)"));
        assert_eq!(ints(&[7]).into_horner(), parsed("7"));
        assert_eq!(Coefficients::zero().into_horner(), parsed("0"));
    }

    #[test]
    fn canonical_layout() {
        let c = Coefficients::new(vec![Some(int(1)), Some(int(-2)), None, Some(int(1))]);
        assert_eq!(c.into_canonical(), parsed("1 - 2 * x + x^3"));
        assert_eq!(ints(&[0, 3]).into_canonical(), parsed("3 * x"));
    }

    #[test]
    fn recognition() {
        assert!(is_horner(&parsed("1 + x * (2 + x * 3)")));
        assert!(is_horner(&parsed("x^3 * (1 + x)")));
        assert!(!is_horner(&parsed("1 + 2 * x")));
        assert!(is_canonical(&parsed("1 + 2 * x - x^3")));
        assert!(!is_canonical(&parsed("x^3 + 1")));
        assert!(!is_canonical(&parsed("x * (1 + x)")));
    }

    #[test]
    fn walks_read_coefficients() {
        let pairs = horner_walk(&parsed("1 + x^2 * (3 + x)")).expect("horner input");
        assert_eq!(Coefficients::from_pairs(pairs), ints(&[1, 0, 3, 1]));
        let pairs = canonical_walk(&parsed("1 - 2 * x + x^3")).expect("canonical input");
        assert_eq!(Coefficients::from_pairs(pairs), ints(&[1, -2, 0, 1]));
    }
}
