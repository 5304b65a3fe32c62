use num_bigint::BigInt;

use crate::config::Config;
use crate::expr::{add, int, mul, neg, one, pow, Node};
use crate::numeric::Real;
use crate::simplify::simplify_errorfree;

/// Dense coefficients of a polynomial in `x`; entry `i` multiplies `x^i`.
///
/// Absent entries stand for zero. Literal zeros are stored as absent and
/// trailing absent entries are dropped, so two vectors describing the same
/// coefficients compare equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coefficients {
    terms: Vec<Option<Node>>,
}

impl Coefficients {
    pub fn new(terms: Vec<Option<Node>>) -> Self {
        let mut terms: Vec<Option<Node>> = terms
            .into_iter()
            .map(|t| t.filter(|c| !c.is_zero()))
            .collect();
        while matches!(terms.last(), Some(None)) {
            terms.pop();
        }
        Coefficients { terms }
    }

    pub fn zero() -> Self {
        Coefficients::default()
    }

    pub fn constant(c: Node) -> Self {
        Coefficients::new(vec![Some(c)])
    }

    pub fn monomial(k: usize, c: Node) -> Self {
        let mut terms = vec![None; k + 1];
        terms[k] = Some(c);
        Coefficients::new(terms)
    }

    /// Builds the vector from `(degree, coefficient)` pairs; pairs of equal
    /// degree are summed symbolically.
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (usize, Node)>) -> Self {
        let mut terms: Vec<Option<Node>> = Vec::new();
        for (k, c) in pairs {
            if terms.len() <= k {
                terms.resize(k + 1, None);
            }
            terms[k] = Some(match terms[k].take() {
                Some(prev) => add(prev, c),
                None => c,
            });
        }
        Coefficients::new(terms)
    }

    /// Highest degree with a present coefficient, 0 for the zero polynomial.
    pub fn degree(&self) -> usize {
        self.terms.len().saturating_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Node> {
        self.terms.get(i).and_then(Option::as_ref)
    }

    /// Coefficient of `x^i`, the zero constant when absent.
    pub fn coefficient(&self, i: usize) -> Node {
        self.get(i).cloned().unwrap_or_else(crate::expr::zero)
    }

    pub fn terms(&self) -> &[Option<Node>] {
        &self.terms
    }

    /// Present coefficients in increasing degree.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.terms
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    /// Lowest degree with a present coefficient; `None` for the zero polynomial.
    pub fn lowest_degree(&self) -> Option<usize> {
        self.iter().next().map(|(i, _)| i)
    }

    /// Divides by `x^k`; coefficients below `k` are dropped.
    pub fn shift_down(&self, k: usize) -> Self {
        Coefficients::new(self.terms.iter().skip(k).cloned().collect())
    }

    /// Multiplies by `x^k`.
    pub fn shift_up(&self, k: usize) -> Self {
        if self.is_zero() {
            return Coefficients::zero();
        }
        let mut terms = vec![None; k];
        terms.extend(self.terms.iter().cloned());
        Coefficients::new(terms)
    }

    /// Simplifies every coefficient error-free; those that become zero drop out.
    pub(crate) fn tidy(self, cfg: &Config) -> Self {
        Coefficients::new(
            self.terms
                .into_iter()
                .map(|t| t.map(|c| simplify_errorfree(&c, cfg)))
                .collect(),
        )
    }

    pub(crate) fn add(&self, other: &Coefficients, cfg: &Config) -> Self {
        let n = self.len().max(other.len());
        let terms = (0..n)
            .map(|i| plus(self.get(i), other.get(i), cfg))
            .collect();
        Coefficients::new(terms)
    }

    pub(crate) fn sub(&self, other: &Coefficients, cfg: &Config) -> Self {
        self.add(&other.neg(cfg), cfg)
    }

    pub(crate) fn neg(&self, cfg: &Config) -> Self {
        self.map(|c| tidy(neg(c.clone()), cfg))
    }

    pub(crate) fn scale(&self, factor: &Node, cfg: &Config) -> Self {
        if factor.is_zero() {
            return Coefficients::zero();
        }
        self.map(|c| tidy(mul(c.clone(), factor.clone()), cfg))
    }

    pub(crate) fn divide(&self, divisor: &Node, cfg: &Config) -> Self {
        self.map(|c| tidy(crate::expr::div(c.clone(), divisor.clone()), cfg))
    }

    /// Convolution of the two coefficient vectors.
    pub(crate) fn mul(&self, other: &Coefficients, cfg: &Config) -> Self {
        if self.is_zero() || other.is_zero() {
            return Coefficients::zero();
        }
        let mut terms: Vec<Option<Node>> = vec![None; self.len() + other.len() - 1];
        for (i, a) in self.iter() {
            for (j, b) in other.iter() {
                let product = tidy(mul(a.clone(), b.clone()), cfg);
                terms[i + j] = plus(terms[i + j].as_ref(), product.as_ref(), cfg);
            }
        }
        Coefficients::new(terms)
    }

    /// `(c0 + t)^k` expanded binomially; `t^j` comes from repeated convolution.
    pub(crate) fn pow(&self, k: u32, cfg: &Config) -> Self {
        if k == 0 {
            return Coefficients::constant(one());
        }
        let mut tail = self.clone();
        let Some(c0) = tail.terms.first_mut().and_then(Option::take) else {
            // only the j = k term survives a zero constant term
            let mut result = tail.clone();
            for _ in 1..k {
                result = result.mul(&tail, cfg);
            }
            return result;
        };
        let tail = Coefficients::new(tail.terms);
        let mut result = Coefficients::zero();
        let mut tail_power = Coefficients::constant(one());
        let mut binomial = BigInt::from(1);
        for j in 0..=k {
            let factor = mul(
                Node::Constant(Real::from_int(binomial.clone())),
                pow(c0.clone(), int(i64::from(k - j))),
            );
            if let Some(factor) = tidy(factor, cfg) {
                result = result.add(&tail_power.scale(&factor, cfg), cfg);
            }
            if j < k {
                tail_power = tail_power.mul(&tail, cfg);
                binomial = binomial * (k - j) / (j + 1);
            }
        }
        result
    }

    /// `p(q(x))` by Horner's scheme over coefficient vectors.
    pub(crate) fn compose(&self, q: &Coefficients, cfg: &Config) -> Self {
        let mut acc = Coefficients::zero();
        for i in (0..self.len()).rev() {
            acc = acc.mul(q, cfg);
            if let Some(c) = self.get(i) {
                acc = acc.add(&Coefficients::constant(c.clone()), cfg);
            }
        }
        acc
    }

    /// Formal derivative; literal coefficients are multiplied exactly.
    pub(crate) fn derivative(&self) -> Self {
        let terms = self
            .iter()
            .filter(|(i, _)| *i > 0)
            .map(|(i, c)| {
                let factor = Real::from_int(i as u64);
                let scaled = match c.as_constant() {
                    Some(value) => Node::Constant(value.mul_exact(&factor)),
                    None => mul(Node::Constant(factor), c.clone()),
                };
                (i - 1, scaled)
            });
        Coefficients::from_pairs(terms)
    }

    fn map(&self, f: impl Fn(&Node) -> Option<Node>) -> Self {
        Coefficients::new(self.terms.iter().map(|t| t.as_ref().and_then(&f)).collect())
    }
}

fn tidy(node: Node, cfg: &Config) -> Option<Node> {
    let node = simplify_errorfree(&node, cfg);
    (!node.is_zero()).then_some(node)
}

fn plus(a: Option<&Node>, b: Option<&Node>, cfg: &Config) -> Option<Node> {
    match (a, b) {
        (None, None) => None,
        (Some(c), None) | (None, Some(c)) => Some(c.clone()),
        (Some(a), Some(b)) => tidy(add(a.clone(), b.clone()), cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::int;

    fn ints(values: &[i64]) -> Coefficients {
        Coefficients::new(values.iter().map(|v| Some(int(*v))).collect())
    }

    #[test]
    fn normalises_zeros() {
        let c = Coefficients::new(vec![Some(int(1)), Some(int(0)), None]);
        assert_eq!(c, ints(&[1]));
        assert_eq!(c.degree(), 0);
        assert!(Coefficients::new(vec![None, Some(int(0))]).is_zero());
    }

    #[test]
    fn binomial_power() {
        let cfg = Config::default();
        // (1 + x)^3
        assert_eq!(ints(&[1, 1]).pow(3, &cfg), ints(&[1, 3, 3, 1]));
        // (2x)^2 has no constant term
        assert_eq!(ints(&[0, 2]).pow(2, &cfg), ints(&[0, 0, 4]));
    }

    #[test]
    fn composition_and_derivative() {
        let cfg = Config::default();
        // p = 1 + x^2, q = x + x^2 gives 1 + x^2 + 2x^3 + x^4
        let composed = ints(&[1, 0, 1]).compose(&ints(&[0, 1, 1]), &cfg);
        assert_eq!(composed, ints(&[1, 0, 1, 2, 1]));
        assert_eq!(ints(&[5, 0, 3, 1]).derivative(), ints(&[0, 6, 3]));
    }

    #[test]
    fn symbolic_coefficients_stay_symbolic() {
        let cfg = Config::default();
        let c = Coefficients::new(vec![Some(Node::Pi), Some(int(1))]);
        let doubled = c.add(&c, &cfg);
        assert_eq!(doubled.get(1), Some(&int(2)));
        assert!(doubled.get(0).is_some_and(|c| c.is_constant() && !c.is_literal()));
    }
}
