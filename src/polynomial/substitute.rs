use num_bigint::BigInt;

use super::{extract_coefficients, is_polynomial, Coefficients, DENSE_DEGREE_LIMIT};
use crate::config::Config;
use crate::expr::{add, int, mul, pow, Node};
use crate::numeric::Real;
use crate::simplify::{simplify_errorfree, substitute_variable};

/// `p(q(x))`. Polynomial pairs are composed on their coefficients and come
/// back in Horner form; anything else is substituted structurally and
/// simplified error-free.
pub fn substitute(p: &Node, q: &Node, cfg: &Config) -> Node {
    let structural = || simplify_errorfree(&substitute_variable(p, q), cfg);
    if !is_polynomial(p) || !is_polynomial(q) {
        return structural();
    }
    let (Some(cp), Some(cq)) = (extract_coefficients(p, cfg), extract_coefficients(q, cfg)) else {
        return structural();
    };
    match cq.degree() {
        0 => structural(),
        1 => {
            tracing::debug!(degree = cp.degree(), "affine substitution");
            shift_and_scale(&cp, &cq, cfg).into_horner()
        }
        d if cp.degree().saturating_mul(d) > DENSE_DEGREE_LIMIT as usize => {
            tracing::debug!(degree = cp.degree(), inner = d, "composition too large, substituting");
            structural()
        }
        d => {
            tracing::debug!(degree = cp.degree(), inner = d, "composing polynomials");
            cp.compose(&cq, cfg).into_horner()
        }
    }
}

/// Coefficients of `p(a + b·x)`:
/// `r_k = b^k · Σ_{i ≥ k} binom(i, k) · a^(i-k) · c_i`.
fn shift_and_scale(cp: &Coefficients, cq: &Coefficients, cfg: &Config) -> Coefficients {
    let a = cq.get(0);
    let b = cq.coefficient(1);
    let terms = (0..cp.len())
        .map(|k| {
            let mut sum: Option<Node> = None;
            for (i, c) in cp.iter().filter(|(i, _)| *i >= k) {
                let shift = match a {
                    Some(a) => pow(a.clone(), int((i - k) as i64)),
                    None if i == k => crate::expr::one(),
                    None => continue,
                };
                let weight = Node::Constant(Real::from_int(binomial(i, k)));
                let term = mul(mul(weight, shift), c.clone());
                sum = Some(match sum {
                    Some(s) => add(s, term),
                    None => term,
                });
            }
            let r = mul(pow(b.clone(), int(k as i64)), sum?);
            Some(simplify_errorfree(&r, cfg))
        })
        .collect();
    Coefficients::new(terms)
}

fn binomial(n: usize, k: usize) -> BigInt {
    let mut b = BigInt::from(1);
    for j in 0..k {
        b = b * (n - j) / (j + 1);
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    #[test]
    fn binomials() {
        assert_eq!(binomial(5, 2), BigInt::from(10));
        assert_eq!(binomial(4, 0), BigInt::from(1));
        assert_eq!(binomial(6, 6), BigInt::from(1));
    }

    #[test]
    fn non_polynomial_outer_is_structural() {
        let cfg = Config::default();
        let p = parse_expr("sin(x) + 0").expect("parse input");
        let q = parse_expr("x^2").expect("parse input");
        let r = substitute(&p, &q, &cfg);
        assert_eq!(r, parse_expr("sin(x^2)").expect("parse input"));
    }
}
