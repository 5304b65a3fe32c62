use super::fold::exact_rounding;
use super::Simplifier;
use crate::expr::{add, div, mul, neg, one, pow, sub, zero, BinaryOp, Node, UnaryOp};
use crate::polynomial;

impl Simplifier<'_> {
    /// One bottom-up rewrite pass.
    pub(super) fn pass(&self, tree: &Node) -> Node {
        if let Some(r) = self.rationalize(tree) {
            return r;
        }
        match tree {
            Node::Variable | Node::Constant(_) => tree.clone(),
            Node::Pi | Node::LibraryConstant(_) => self.fold_node(tree.clone()),
            Node::Binary(op, a, b) => {
                let a = self.pass(a);
                let b = self.pass(b);
                if a.is_nan() || b.is_nan() {
                    return nan_rule(*op, a, b);
                }
                match op {
                    BinaryOp::Add => self.add(a, b),
                    BinaryOp::Sub => self.sub(a, b),
                    BinaryOp::Mul => self.mul(a, b),
                    BinaryOp::Div if self.mode.keep_division => div(a, b),
                    BinaryOp::Div => self.div(a, b),
                    BinaryOp::Pow => self.pow(a, b),
                }
            }
            Node::Unary(op, a) => {
                let a = self.pass(a);
                if a.is_nan() {
                    return a;
                }
                self.unary(*op, a)
            }
            Node::LibraryFunction { func, order, arg } => {
                let arg = self.pass(arg);
                if arg.is_nan() {
                    return arg;
                }
                self.fold_node(Node::library_function(func.clone(), *order, arg))
            }
            Node::Procedure { func, order, arg } => {
                let arg = self.pass(arg);
                if arg.is_nan() {
                    return arg;
                }
                self.fold_node(Node::procedure(func.clone(), *order, arg))
            }
        }
    }

    fn add(&self, a: Node, b: Node) -> Node {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if let Some(c) = self.fold_binary(BinaryOp::Add, x, y) {
                return c;
            }
        }
        if a.is_zero() {
            return b;
        }
        if b.is_zero() {
            return a;
        }
        match (a, b) {
            (a, Node::Unary(UnaryOp::Neg, y)) => self.sub(a, *y),
            (Node::Unary(UnaryOp::Neg, y), b) => self.sub(b, *y),
            (a, Node::Constant(c)) if c.is_negative() => sub(a, Node::Constant(c.negated())),
            (a, b) => add(a, b),
        }
    }

    fn sub(&self, a: Node, b: Node) -> Node {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if let Some(c) = self.fold_binary(BinaryOp::Sub, x, y) {
                return c;
            }
        }
        if b.is_zero() {
            return a;
        }
        if a.is_zero() {
            return self.negate(b);
        }
        if a == b && !is_unbounded(&a) {
            return zero();
        }
        match (a, b) {
            (a, Node::Unary(UnaryOp::Neg, y)) => self.add(a, *y),
            (a, Node::Constant(c)) if c.is_negative() => add(a, Node::Constant(c.negated())),
            (Node::Unary(UnaryOp::Exp, x), b) if b.is_one() => Node::expm1(*x),
            (a, b) => sub(a, b),
        }
    }

    fn mul(&self, a: Node, b: Node) -> Node {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if let Some(c) = self.fold_binary(BinaryOp::Mul, x, y) {
                return c;
            }
        }
        if (a.is_zero() && !is_unbounded(&b)) || (b.is_zero() && !is_unbounded(&a)) {
            return zero();
        }
        if a.is_one() {
            return b;
        }
        if b.is_one() {
            return a;
        }
        if is_minus_one(&a) {
            return self.negate(b);
        }
        if is_minus_one(&b) {
            return self.negate(a);
        }
        if self.mode.keep_division {
            return mul(a, b);
        }
        match (a, b) {
            (Node::Binary(BinaryOp::Div, n, x), y) if n.is_one() => self.div(y, *x),
            (x, Node::Binary(BinaryOp::Div, n, y)) if n.is_one() => self.div(x, *y),
            (a, b) => mul(a, b),
        }
    }

    fn div(&self, a: Node, b: Node) -> Node {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if let Some(c) = self.fold_binary(BinaryOp::Div, x, y) {
                return c;
            }
        }
        if b.is_one() {
            return a;
        }
        if a.is_zero() && !b.is_zero() && !is_unbounded(&b) {
            return zero();
        }
        if a == b && !a.is_zero() && !is_unbounded(&a) {
            return one();
        }
        if let Some(r) = self.cancel_common_power(&a, &b) {
            return r;
        }
        match (a, b) {
            (Node::Unary(UnaryOp::Sin, t), Node::Unary(UnaryOp::Cos, u)) if t == u => Node::tan(*t),
            (a, b) => div(a, b),
        }
    }

    fn pow(&self, a: Node, b: Node) -> Node {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if let Some(c) = self.fold_binary(BinaryOp::Pow, x, y) {
                return c;
            }
        }
        if b.is_zero() || a.is_one() {
            return one();
        }
        if b.is_one() {
            return a;
        }
        match (a, b) {
            (Node::Unary(UnaryOp::Sqrt, x), b) if is_two(&b) => Node::abs(*x),
            (a, b) => pow(a, b),
        }
    }

    fn negate(&self, a: Node) -> Node {
        if let Some(x) = a.as_constant() {
            return Node::Constant(x.negated());
        }
        match a {
            Node::Unary(UnaryOp::Neg, x) => *x,
            Node::Binary(BinaryOp::Sub, p, q) => sub(*q, *p),
            a => neg(a),
        }
    }

    fn unary(&self, op: UnaryOp, a: Node) -> Node {
        if op == UnaryOp::Neg {
            return self.negate(a);
        }
        if op.is_rounding() {
            return self.rounding(op, a);
        }
        if let Some(x) = a.as_constant() {
            if let Some(c) = self.fold_unary(op, x) {
                return c;
            }
        }
        match (op, a) {
            (UnaryOp::Log, Node::Unary(UnaryOp::Exp, x)) => *x,
            (UnaryOp::Log, Node::Binary(BinaryOp::Add, p, q)) if p.is_one() => Node::log1p(*q),
            (UnaryOp::Log, Node::Binary(BinaryOp::Add, p, q)) if q.is_one() => Node::log1p(*p),
            (UnaryOp::Abs, Node::Unary(UnaryOp::Abs, x)) => Node::abs(*x),
            (UnaryOp::Abs, Node::Unary(UnaryOp::Neg, x)) => Node::abs(*x),
            (op, a) => Node::unary(op, a),
        }
    }

    /// Format roundings and ceil/floor/nearestint. These are exact operators,
    /// so a literal operand always folds.
    fn rounding(&self, op: UnaryOp, a: Node) -> Node {
        if let Some(x) = a.as_constant() {
            if let Some(r) = exact_rounding(op, x) {
                return Node::Constant(r);
            }
        }
        if matches!(&a, Node::Unary(inner, _) if *inner == op) {
            return a;
        }
        if a.is_constant() {
            if let Some(c) = self.bracket_rounding(op, &a) {
                return c;
            }
        }
        Node::unary(op, a)
    }

    /// `P(x)/Q(x)` with both sides divisible by `x^k` loses the common power.
    fn cancel_common_power(&self, p: &Node, q: &Node) -> Option<Node> {
        if p.is_constant() || q.is_constant() {
            return None;
        }
        if !polynomial::is_polynomial(p) || !polynomial::is_polynomial(q) {
            return None;
        }
        let nested = self.cfg.nested()?;
        if !polynomial::within_dense_limit(p) || !polynomial::within_dense_limit(q) {
            let k = polynomial::lowest_power_bound(p).min(polynomial::lowest_power_bound(q));
            if k == 0 {
                return None;
            }
            tracing::debug!(power = k, "cancelling a common power of the variable structurally");
            let p = polynomial::divide_by_power(p, k);
            let q = polynomial::divide_by_power(q, k);
            return Some(div(p, q));
        }
        let cp = polynomial::extract_coefficients(p, &nested)?;
        let cq = polynomial::extract_coefficients(q, &nested)?;
        let k = cp.lowest_degree()?.min(cq.lowest_degree()?);
        if k == 0 {
            return None;
        }
        tracing::debug!(power = k, "cancelling a common power of the variable");
        let p = polynomial::rebuild_like(p, cp.shift_down(k));
        let q = polynomial::rebuild_like(q, cq.shift_down(k));
        Some(div(p, q))
    }
}

/// A NaN child collapses the node only when the other child is constant.
fn nan_rule(op: BinaryOp, a: Node, b: Node) -> Node {
    let (nan, other) = if a.is_nan() { (&a, &b) } else { (&b, &a) };
    if other.is_constant() {
        return nan.clone();
    }
    Node::binary(op, a, b)
}

fn is_unbounded(node: &Node) -> bool {
    matches!(node, Node::Constant(c) if !c.is_finite())
}

fn is_minus_one(node: &Node) -> bool {
    matches!(node, Node::Constant(c) if c.is_negative() && c.negated().is_one())
}

fn is_two(node: &Node) -> bool {
    matches!(node, Node::Constant(c) if c.to_i64() == Some(2))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::parser::parse_expr;
    use crate::simplify::{simplify_all_but_division, simplify_errorfree};

    fn errorfree(input: &str) -> String {
        let tree = parse_expr(input).expect("parse input");
        simplify_errorfree(&tree, &Config::default()).to_string()
    }

    #[test]
    fn identities() {
        assert_eq!(errorfree("x + 0"), "x");
        assert_eq!(errorfree("0 - x"), "-x");
        assert_eq!(errorfree("x * 1"), "x");
        assert_eq!(errorfree("-(-x)"), "x");
        assert_eq!(errorfree("x^1"), "x");
        assert_eq!(errorfree("x - x"), "0");
    }

    #[test]
    fn function_rewrites() {
        assert_eq!(errorfree("log(exp(x))"), "x");
        assert_eq!(errorfree("log(1 + x)"), "log1p(x)");
        assert_eq!(errorfree("exp(x) - 1"), "expm1(x)");
        assert_eq!(errorfree("sin(x) / cos(x)"), "tan(x)");
        assert_eq!(errorfree("sqrt(x)^2"), "abs(x)");
        assert_eq!(errorfree("abs(-abs(x))"), "abs(x)");
        assert_eq!(errorfree("double(double(x))"), "double(x)");
    }

    #[test]
    fn reciprocal_products() {
        assert_eq!(errorfree("(1/x) * sin(x)"), "sin(x) / x");
        assert_eq!(errorfree("sin(x) * (1/x)"), "sin(x) / x");
    }

    #[test]
    fn all_but_division_leaves_quotients() {
        let tree = parse_expr("(1/x) * (2 + 3)").expect("parse input");
        let r = simplify_all_but_division(&tree, &Config::default());
        assert_eq!(r.to_string(), "1 / x * 5");
    }
}
