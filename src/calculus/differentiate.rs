use crate::config::Config;
use crate::expr::{add, div, int, mul, neg, one, pi, pow, sub, zero, BinaryOp, Node, UnaryOp};
use crate::polynomial;
use crate::simplify::simplify_errorfree;

/// Polynomials this small are simplified before the normal-form check.
const SIMPLIFY_SIZE_LIMIT: usize = 100;
const SIMPLIFY_DEGREE_LIMIT: u32 = 25;

/// Symbolic derivative with respect to the free variable. The result is
/// not simplified.
pub fn differentiate(tree: &Node, cfg: &Config) -> Node {
    if polynomial::is_polynomial(tree) {
        let small = tree.tree_size() < SIMPLIFY_SIZE_LIMIT
            && polynomial::degree(tree).is_some_and(|d| d < SIMPLIFY_DEGREE_LIMIT);
        let candidate = if small {
            simplify_errorfree(tree, cfg)
        } else {
            tree.clone()
        };
        if let Some(d) = polynomial::differentiate_normal_form(&candidate) {
            tracing::debug!("differentiating a polynomial in normal form");
            return d;
        }
    }
    Differentiator.derive(tree)
}

/// `n`-th derivative, simplified error-free after every step.
pub fn differentiate_n(tree: &Node, n: u32, cfg: &Config) -> Node {
    let mut current = tree.clone();
    for _ in 0..n {
        current = simplify_errorfree(&differentiate(&current, cfg), cfg);
    }
    current
}

struct Differentiator;

impl Differentiator {
    fn derive(&self, expr: &Node) -> Node {
        match expr {
            Node::Variable => one(),
            Node::Constant(_) | Node::Pi | Node::LibraryConstant(_) => zero(),

            Node::Binary(BinaryOp::Add, a, b) => add(self.derive(a), self.derive(b)),
            Node::Binary(BinaryOp::Sub, a, b) => sub(self.derive(a), self.derive(b)),
            Node::Binary(BinaryOp::Mul, a, b) => self.product_rule(a, b),
            Node::Binary(BinaryOp::Div, a, b) => self.quotient_rule(a, b),
            Node::Binary(BinaryOp::Pow, a, b) => self.power_rule(a, b),

            Node::Unary(UnaryOp::Neg, a) => neg(self.derive(a)),
            Node::Unary(op, _) if op.is_rounding() => {
                tracing::warn!(
                    operator = op.name(),
                    "rounding operator differentiated as zero, correct almost everywhere"
                );
                zero()
            }
            Node::Unary(op, a) => self.chain_rule(a, |g| outer_derivative(*op, g)),

            Node::LibraryFunction { func, order, arg } => {
                self.chain_rule(arg, |g| Node::library_function(func.clone(), order + 1, g))
            }
            Node::Procedure { func, order, arg } => {
                self.chain_rule(arg, |g| Node::procedure(func.clone(), order + 1, g))
            }
        }
    }

    fn product_rule(&self, a: &Node, b: &Node) -> Node {
        if a.is_constant() {
            return mul(a.clone(), self.derive(b));
        }
        if b.is_constant() {
            return mul(self.derive(a), b.clone());
        }
        add(
            mul(self.derive(a), b.clone()),
            mul(a.clone(), self.derive(b)),
        )
    }

    fn quotient_rule(&self, a: &Node, b: &Node) -> Node {
        if b.is_constant() {
            return div(self.derive(a), b.clone());
        }
        let square = pow(b.clone(), int(2));
        if a.is_constant() {
            return neg(div(mul(a.clone(), self.derive(b)), square));
        }
        div(
            sub(mul(self.derive(a), b.clone()), mul(a.clone(), self.derive(b))),
            square,
        )
    }

    fn power_rule(&self, base: &Node, exp: &Node) -> Node {
        if exp.is_constant() {
            let lowered = match exp.as_constant() {
                Some(n) => Node::Constant(n.sub_exact(&crate::numeric::Real::from_int(1))),
                None => sub(exp.clone(), one()),
            };
            return self.chain_rule(base, |g| mul(exp.clone(), pow(g, lowered)));
        }
        let f = pow(base.clone(), exp.clone());
        if base.is_constant() {
            return self.chain_rule(exp, |_| mul(Node::log(base.clone()), f));
        }
        mul(
            f,
            add(
                mul(self.derive(exp), Node::log(base.clone())),
                div(mul(exp.clone(), self.derive(base)), base.clone()),
            ),
        )
    }

    /// `g' · outer(g)`, with the product dropped when `g` is the variable.
    fn chain_rule(&self, arg: &Node, outer: impl FnOnce(Node) -> Node) -> Node {
        let outside = outer(arg.clone());
        if arg.is_variable() {
            return outside;
        }
        mul(self.derive(arg), outside)
    }
}

/// Derivative of an elementary function, evaluated at `g`.
fn outer_derivative(op: UnaryOp, g: Node) -> Node {
    let square = || pow(g.clone(), int(2));
    match op {
        UnaryOp::Sqrt => div(one(), mul(int(2), Node::sqrt(g))),
        UnaryOp::Exp | UnaryOp::Expm1 => Node::exp(g),
        UnaryOp::Log => div(one(), g),
        UnaryOp::Log2 => div(one(), mul(g, Node::log(int(2)))),
        UnaryOp::Log10 => div(one(), mul(g, Node::log(int(10)))),
        UnaryOp::Log1p => div(one(), add(one(), g)),
        UnaryOp::Sin => Node::cos(g),
        UnaryOp::Cos => neg(Node::sin(g)),
        UnaryOp::Tan => add(one(), pow(Node::tan(g), int(2))),
        UnaryOp::Asin => div(one(), Node::sqrt(sub(one(), square()))),
        UnaryOp::Acos => neg(div(one(), Node::sqrt(sub(one(), square())))),
        UnaryOp::Atan => div(one(), add(one(), square())),
        UnaryOp::Sinh => Node::cosh(g),
        UnaryOp::Cosh => Node::sinh(g),
        UnaryOp::Tanh => sub(one(), pow(Node::tanh(g), int(2))),
        UnaryOp::Asinh => div(one(), Node::sqrt(add(square(), one()))),
        UnaryOp::Acosh => div(one(), Node::sqrt(sub(square(), one()))),
        UnaryOp::Atanh => div(one(), sub(one(), square())),
        UnaryOp::Abs => div(g.clone(), Node::abs(g)),
        UnaryOp::Erf => erf_derivative(square()),
        UnaryOp::Erfc => neg(erf_derivative(square())),
        // handled by the caller
        UnaryOp::Neg => neg(one()),
        _ => zero(),
    }
}

/// `2/sqrt(pi) · exp(-g²)`
fn erf_derivative(square: Node) -> Node {
    mul(div(int(2), Node::sqrt(pi())), Node::exp(neg(square)))
}
