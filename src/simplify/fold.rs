use super::Simplifier;
use crate::evaluate::{apply_binary, apply_unary, evaluate_constant};
use crate::expr::{BinaryOp, Node, UnaryOp, div};
use crate::numeric::{Interval, Real, Round, Rounded};
use crate::range::evaluate_range;
use crate::rational::{evaluate_rational, is_dyadic};

impl Simplifier<'_> {
    pub(super) fn fold_binary(&self, op: BinaryOp, a: &Real, b: &Real) -> Option<Node> {
        self.fold(&[a, b], |prec, rnd| apply_binary(op, a, b, prec, rnd))
    }

    pub(super) fn fold_unary(&self, op: UnaryOp, a: &Real) -> Option<Node> {
        self.fold(&[a], |prec, rnd| apply_unary(op, a, prec, rnd))
    }

    fn fold(&self, inputs: &[&Real], f: impl Fn(u32, Round) -> Rounded) -> Option<Node> {
        let working = self.cfg.precision;
        if self.mode.numeric {
            let r = f(working, Round::Nearest);
            if !r.exact && r.value.is_finite() {
                tracing::warn!(precision = working, "constant folding rounded the result");
            }
            return Some(Node::Constant(r.value));
        }
        let widest = inputs
            .iter()
            .map(|r| r.precision())
            .max()
            .unwrap_or(working)
            .max(working) as u64;
        let prec = (2 * widest + 10).min(256 * working as u64) as u32;
        let r = f(prec, Round::Nearest);
        if r.exact && r.value.is_finite() {
            Some(Node::Constant(shrink(r.value, working)))
        } else {
            tracing::trace!(precision = prec, "inexact fold kept symbolic");
            None
        }
    }

    /// Numeric mode replaces constant leaves and hosted calls on constants
    /// by their value.
    pub(super) fn fold_node(&self, node: Node) -> Node {
        if !self.mode.numeric || node.is_literal() {
            return node;
        }
        let evaluable = node.children().into_iter().all(Node::is_literal);
        if !evaluable {
            return node;
        }
        match evaluate_constant(&node, self.cfg.precision) {
            Some(value) => Node::Constant(value),
            None => node,
        }
    }

    /// In rational mode a constant subtree that evaluates to a rational is
    /// replaced by that rational, as a literal when it is dyadic and as a
    /// quotient of two literals otherwise.
    pub(super) fn rationalize(&self, tree: &Node) -> Option<Node> {
        if !self.mode.rational || self.mode.numeric || tree.is_literal() || !tree.is_constant() {
            return None;
        }
        let value = evaluate_rational(tree)?;
        if is_dyadic(&value) {
            let shift = value.denom().trailing_zeros().unwrap_or(0) as i64;
            return Some(Node::Constant(Real::dyadic(value.numer().clone(), -shift)));
        }
        Some(div(
            Node::Constant(Real::from_int(value.numer().clone())),
            Node::Constant(Real::from_int(value.denom().clone())),
        ))
    }

    /// Tries to collapse a rounding operator over a constant operand by
    /// bracketing the operand: both ends must round to the same value.
    pub(super) fn bracket_rounding(&self, op: UnaryOp, operand: &Node) -> Option<Node> {
        let prec = self.cfg.precision;
        let range = evaluate_range(operand, &Interval::point(Real::zero(prec)), prec);
        if range.is_nan() || !range.is_bounded() {
            return None;
        }
        let lo = exact_rounding(op, range.lo())?;
        let hi = exact_rounding(op, range.hi())?;
        if lo.is_finite() && lo == hi {
            tracing::debug!(operator = op.name(), "rounding collapsed through a bracket");
            Some(Node::Constant(lo))
        } else {
            None
        }
    }
}

/// Exact value of a rounding operator applied to `x`.
pub(super) fn exact_rounding(op: UnaryOp, x: &Real) -> Option<Real> {
    if let Some(format) = op.format() {
        return Some(x.round_to_format(format, Round::Nearest).value);
    }
    let whole = x.exponent().unwrap_or(0).max(0) as u32 + 2;
    let bits = x.significant_bits().max(whole);
    let r = match op {
        UnaryOp::Ceil => x.ceil(bits, Round::Nearest),
        UnaryOp::Floor => x.floor(bits, Round::Nearest),
        UnaryOp::NearestInt => x.nearest_int(bits, Round::Nearest),
        _ => return None,
    };
    Some(r.value)
}

/// Drops the precision of an exact fold back towards the working precision.
fn shrink(value: Real, working: u32) -> Real {
    let bits = value.significant_bits().max(working);
    if bits < value.precision() {
        value.round(bits, Round::Nearest).value
    } else {
        value
    }
}
