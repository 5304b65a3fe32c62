//! Precision-aware simplification and substitution.
//!
//! All three entry points run the same bottom-up rewrite pass until the tree
//! stops changing. They differ in how constants are folded:
//!
//! * error-free: a fold is kept only when the result is finite and exact at
//!   a precision grown from the operands' own precisions;
//! * numeric: every fold happens at the working precision;
//! * all-but-division: numeric, except that divisions stay symbolic.

mod fold;
mod rules;
mod substitute;

use crate::config::Config;
use crate::expr::Node;

pub use substitute::substitute_variable;

const MAX_PASSES: usize = 64;

#[derive(Clone, Copy, Debug)]
struct Mode {
    rational: bool,
    numeric: bool,
    keep_division: bool,
}

struct Simplifier<'a> {
    cfg: &'a Config,
    mode: Mode,
}

/// Rewrites `tree` without changing its exact mathematical value.
pub fn simplify_errorfree(tree: &Node, cfg: &Config) -> Node {
    let mode = Mode {
        rational: cfg.rational_mode,
        numeric: false,
        keep_division: false,
    };
    Simplifier { cfg, mode }.run(tree)
}

/// Rewrites `tree`, folding every constant at the working precision.
pub fn simplify_numeric(tree: &Node, cfg: &Config) -> Node {
    let mode = Mode {
        rational: false,
        numeric: true,
        keep_division: false,
    };
    Simplifier { cfg, mode }.run(tree)
}

/// Like [`simplify_numeric`], but `Div` nodes are neither folded nor rewritten.
pub fn simplify_all_but_division(tree: &Node, cfg: &Config) -> Node {
    let mode = Mode {
        rational: false,
        numeric: true,
        keep_division: true,
    };
    Simplifier { cfg, mode }.run(tree)
}

impl Simplifier<'_> {
    /// Apply passes until the tree stops changing or we hit the pass cap.
    fn run(&self, tree: &Node) -> Node {
        let mut current = self.pass(tree);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
        tracing::debug!(passes = MAX_PASSES, "simplification stopped before a fixed point");
        current
    }
}
