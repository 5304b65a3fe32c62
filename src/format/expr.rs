use crate::expr::{BinaryOp, Node, UnaryOp};

/// Renders a tree with the minimum of parentheses needed to read it back
/// with [`crate::parser::parse_expr`] into the same shape.
pub fn pretty(expr: &Node) -> String {
    fn pp(ctx: u8, expr: &Node) -> String {
        match expr {
            Node::Variable => "x".to_string(),
            Node::Pi => "pi".to_string(),
            Node::Constant(c) if c.is_negative() => bracket(ctx, 3, c.to_string()),
            Node::Constant(c) => c.to_string(),
            Node::LibraryConstant(c) => c.name().to_string(),

            Node::Binary(BinaryOp::Add, a, b) => {
                bracket(ctx, 1, format!("{} + {}", pp(1, a), pp(2, b)))
            }
            Node::Binary(BinaryOp::Sub, a, b) => {
                bracket(ctx, 1, format!("{} - {}", pp(1, a), pp(2, b)))
            }
            Node::Binary(BinaryOp::Mul, a, b) => {
                bracket(ctx, 2, format!("{} * {}", pp(2, a), pp(3, b)))
            }
            Node::Binary(BinaryOp::Div, a, b) => {
                bracket(ctx, 2, format!("{} / {}", pp(2, a), pp(3, b)))
            }
            Node::Binary(BinaryOp::Pow, a, b) => {
                bracket(ctx, 4, format!("{}^{}", pp(5, a), pp(3, b)))
            }

            Node::Unary(UnaryOp::Neg, a) => bracket(ctx, 3, format!("-{}", pp(3, a))),
            Node::Unary(op, a) => format!("{}({})", op.name(), pp(0, a)),

            Node::LibraryFunction { func, order, arg } => {
                call(func.name(), *order, &pp(0, arg))
            }
            Node::Procedure { func, order, arg } => {
                call(func.descriptor(), *order, &pp(0, arg))
            }
        }
    }

    pp(0, expr)
}

fn call(name: &str, order: u32, arg: &str) -> String {
    if order == 0 {
        format!("{name}({arg})")
    } else {
        format!("diff({name}, {order})({arg})")
    }
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}
