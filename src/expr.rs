//! Expression tree definitions and helpers.

use std::fmt;

use crate::error::{CoreError, Result};
use crate::hosted::{ConstantRef, FunctionRef, ProcedureRef};
use crate::numeric::{Format, Real};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Sqrt,
    Exp,
    Log,
    Log2,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Neg,
    Abs,
    Ceil,
    Floor,
    NearestInt,
    Erf,
    Erfc,
    Log1p,
    Expm1,
    ToDouble,
    ToSingle,
    ToQuad,
    ToHalfPrecision,
    ToDoubleDouble,
    ToTripleDouble,
    ToDoubleExtended,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 33] = [
        UnaryOp::Sqrt,
        UnaryOp::Exp,
        UnaryOp::Log,
        UnaryOp::Log2,
        UnaryOp::Log10,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Asin,
        UnaryOp::Acos,
        UnaryOp::Atan,
        UnaryOp::Sinh,
        UnaryOp::Cosh,
        UnaryOp::Tanh,
        UnaryOp::Asinh,
        UnaryOp::Acosh,
        UnaryOp::Atanh,
        UnaryOp::Neg,
        UnaryOp::Abs,
        UnaryOp::Ceil,
        UnaryOp::Floor,
        UnaryOp::NearestInt,
        UnaryOp::Erf,
        UnaryOp::Erfc,
        UnaryOp::Log1p,
        UnaryOp::Expm1,
        UnaryOp::ToDouble,
        UnaryOp::ToSingle,
        UnaryOp::ToQuad,
        UnaryOp::ToHalfPrecision,
        UnaryOp::ToDoubleDouble,
        UnaryOp::ToTripleDouble,
        UnaryOp::ToDoubleExtended,
    ];

    /// Function name used by the parser and the printer.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Log => "log",
            UnaryOp::Log2 => "log2",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Asinh => "asinh",
            UnaryOp::Acosh => "acosh",
            UnaryOp::Atanh => "atanh",
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Floor => "floor",
            UnaryOp::NearestInt => "nearestint",
            UnaryOp::Erf => "erf",
            UnaryOp::Erfc => "erfc",
            UnaryOp::Log1p => "log1p",
            UnaryOp::Expm1 => "expm1",
            UnaryOp::ToDouble => "double",
            UnaryOp::ToSingle => "single",
            UnaryOp::ToQuad => "quad",
            UnaryOp::ToHalfPrecision => "halfprecision",
            UnaryOp::ToDoubleDouble => "doubledouble",
            UnaryOp::ToTripleDouble => "tripledouble",
            UnaryOp::ToDoubleExtended => "doubleextended",
        }
    }

    pub fn from_name(name: &str) -> Option<UnaryOp> {
        UnaryOp::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Target format of a format-rounding operator.
    pub fn format(self) -> Option<Format> {
        match self {
            UnaryOp::ToDouble => Some(Format::Double),
            UnaryOp::ToSingle => Some(Format::Single),
            UnaryOp::ToQuad => Some(Format::Quad),
            UnaryOp::ToHalfPrecision => Some(Format::Half),
            UnaryOp::ToDoubleDouble => Some(Format::DoubleDouble),
            UnaryOp::ToTripleDouble => Some(Format::TripleDouble),
            UnaryOp::ToDoubleExtended => Some(Format::DoubleExtended),
            _ => None,
        }
    }

    /// Operators that map reals onto a discrete set: integer roundings and
    /// format roundings. They have no classical derivative.
    pub fn is_rounding(self) -> bool {
        matches!(self, UnaryOp::Ceil | UnaryOp::Floor | UnaryOp::NearestInt)
            || self.format().is_some()
    }

    pub fn kind(self) -> Kind {
        match self {
            UnaryOp::Sqrt => Kind::Sqrt,
            UnaryOp::Exp => Kind::Exp,
            UnaryOp::Log => Kind::Log,
            UnaryOp::Log2 => Kind::Log2,
            UnaryOp::Log10 => Kind::Log10,
            UnaryOp::Sin => Kind::Sin,
            UnaryOp::Cos => Kind::Cos,
            UnaryOp::Tan => Kind::Tan,
            UnaryOp::Asin => Kind::Asin,
            UnaryOp::Acos => Kind::Acos,
            UnaryOp::Atan => Kind::Atan,
            UnaryOp::Sinh => Kind::Sinh,
            UnaryOp::Cosh => Kind::Cosh,
            UnaryOp::Tanh => Kind::Tanh,
            UnaryOp::Asinh => Kind::Asinh,
            UnaryOp::Acosh => Kind::Acosh,
            UnaryOp::Atanh => Kind::Atanh,
            UnaryOp::Neg => Kind::Neg,
            UnaryOp::Abs => Kind::Abs,
            UnaryOp::Ceil => Kind::Ceil,
            UnaryOp::Floor => Kind::Floor,
            UnaryOp::NearestInt => Kind::NearestInt,
            UnaryOp::Erf => Kind::Erf,
            UnaryOp::Erfc => Kind::Erfc,
            UnaryOp::Log1p => Kind::Log1p,
            UnaryOp::Expm1 => Kind::Expm1,
            UnaryOp::ToDouble => Kind::ToDouble,
            UnaryOp::ToSingle => Kind::ToSingle,
            UnaryOp::ToQuad => Kind::ToQuad,
            UnaryOp::ToHalfPrecision => Kind::ToHalfPrecision,
            UnaryOp::ToDoubleDouble => Kind::ToDoubleDouble,
            UnaryOp::ToTripleDouble => Kind::ToTripleDouble,
            UnaryOp::ToDoubleExtended => Kind::ToDoubleExtended,
        }
    }
}

impl BinaryOp {
    pub fn kind(self) -> Kind {
        match self {
            BinaryOp::Add => Kind::Add,
            BinaryOp::Sub => Kind::Sub,
            BinaryOp::Mul => Kind::Mul,
            BinaryOp::Div => Kind::Div,
            BinaryOp::Pow => Kind::Pow,
        }
    }
}

/// Field-less tag of a [`Node`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    Variable,
    Constant,
    Pi,
    LibraryConstant,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Sqrt,
    Exp,
    Log,
    Log2,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Neg,
    Abs,
    Ceil,
    Floor,
    NearestInt,
    Erf,
    Erfc,
    Log1p,
    Expm1,
    ToDouble,
    ToSingle,
    ToQuad,
    ToHalfPrecision,
    ToDoubleDouble,
    ToTripleDouble,
    ToDoubleExtended,
    LibraryFunction,
    Procedure,
}

impl Kind {
    pub fn arity(self) -> usize {
        match self {
            Kind::Variable | Kind::Constant | Kind::Pi | Kind::LibraryConstant => 0,
            Kind::Add | Kind::Sub | Kind::Mul | Kind::Div | Kind::Pow => 2,
            _ => 1,
        }
    }

    fn binary_op(self) -> Option<BinaryOp> {
        match self {
            Kind::Add => Some(BinaryOp::Add),
            Kind::Sub => Some(BinaryOp::Sub),
            Kind::Mul => Some(BinaryOp::Mul),
            Kind::Div => Some(BinaryOp::Div),
            Kind::Pow => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    fn unary_op(self) -> Option<UnaryOp> {
        UnaryOp::ALL.into_iter().find(|op| op.kind() == self)
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    Variable,
    Constant(Real),
    Pi,
    LibraryConstant(ConstantRef),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Unary(UnaryOp, Box<Node>),
    LibraryFunction {
        func: FunctionRef,
        order: u32,
        arg: Box<Node>,
    },
    Procedure {
        func: ProcedureRef,
        order: u32,
        arg: Box<Node>,
    },
}

macro_rules! unary_constructors {
    ($($name:ident => $op:ident),* $(,)?) => {
        impl Node {
            $(
                pub fn $name(arg: Node) -> Node {
                    Node::Unary(UnaryOp::$op, arg.boxed())
                }
            )*
        }
    };
}

unary_constructors! {
    sqrt => Sqrt,
    exp => Exp,
    log => Log,
    log2 => Log2,
    log10 => Log10,
    sin => Sin,
    cos => Cos,
    tan => Tan,
    asin => Asin,
    acos => Acos,
    atan => Atan,
    sinh => Sinh,
    cosh => Cosh,
    tanh => Tanh,
    asinh => Asinh,
    acosh => Acosh,
    atanh => Atanh,
    abs => Abs,
    ceil => Ceil,
    floor => Floor,
    nearest_int => NearestInt,
    erf => Erf,
    erfc => Erfc,
    log1p => Log1p,
    expm1 => Expm1,
    to_double => ToDouble,
    to_single => ToSingle,
    to_quad => ToQuad,
    to_half_precision => ToHalfPrecision,
    to_double_double => ToDoubleDouble,
    to_triple_double => ToTripleDouble,
    to_double_extended => ToDoubleExtended,
}

impl Node {
    pub fn constant(value: Real) -> Self {
        Node::Constant(value)
    }

    pub fn integer(value: i64) -> Self {
        Node::Constant(Real::from_int(value))
    }

    pub fn nan() -> Self {
        Node::Constant(Real::nan(crate::numeric::MIN_PRECISION))
    }

    pub fn unary(op: UnaryOp, arg: Node) -> Self {
        Node::Unary(op, arg.boxed())
    }

    pub fn binary(op: BinaryOp, a: Node, b: Node) -> Self {
        Node::Binary(op, a.boxed(), b.boxed())
    }

    pub fn library_function(func: FunctionRef, order: u32, arg: Node) -> Self {
        Node::LibraryFunction {
            func,
            order,
            arg: arg.boxed(),
        }
    }

    pub fn procedure(func: ProcedureRef, order: u32, arg: Node) -> Self {
        Node::Procedure {
            func,
            order,
            arg: arg.boxed(),
        }
    }

    /// Builds a payload-free node from a dynamic tag, checking the child count.
    pub fn from_parts(kind: Kind, children: Vec<Node>) -> Result<Node> {
        if children.len() != kind.arity() {
            return Err(CoreError::Arity {
                kind,
                expected: kind.arity(),
                found: children.len(),
            });
        }
        let mut children = children.into_iter();
        let mut next = || {
            children
                .next()
                .ok_or_else(|| CoreError::Invariant(format!("missing operand of {kind:?}")))
        };
        match kind {
            Kind::Variable => Ok(Node::Variable),
            Kind::Pi => Ok(Node::Pi),
            Kind::Constant | Kind::LibraryConstant | Kind::LibraryFunction | Kind::Procedure => {
                Err(CoreError::Invariant(format!("{kind:?} needs its own constructor")))
            }
            _ => {
                if let Some(op) = kind.binary_op() {
                    let a = next()?;
                    let b = next()?;
                    Ok(Node::binary(op, a, b))
                } else if let Some(op) = kind.unary_op() {
                    Ok(Node::unary(op, next()?))
                } else {
                    Err(CoreError::Invariant(format!("unhandled kind {kind:?}")))
                }
            }
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Variable => Kind::Variable,
            Node::Constant(_) => Kind::Constant,
            Node::Pi => Kind::Pi,
            Node::LibraryConstant(_) => Kind::LibraryConstant,
            Node::Binary(op, _, _) => op.kind(),
            Node::Unary(op, _) => op.kind(),
            Node::LibraryFunction { .. } => Kind::LibraryFunction,
            Node::Procedure { .. } => Kind::Procedure,
        }
    }

    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Variable | Node::Constant(_) | Node::Pi | Node::LibraryConstant(_) => vec![],
            Node::Binary(_, a, b) => vec![&**a, &**b],
            Node::Unary(_, a)
            | Node::LibraryFunction { arg: a, .. }
            | Node::Procedure { arg: a, .. } => vec![&**a],
        }
    }

    /// Structural equality; constants compare numerically, NaN equals NaN,
    /// hosted handles by identity and derivative order.
    pub fn is_syntactically_equal(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Variable, Node::Variable) | (Node::Pi, Node::Pi) => true,
            (Node::Constant(a), Node::Constant(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Node::LibraryConstant(a), Node::LibraryConstant(b)) => a.same(b),
            (Node::Binary(op1, a1, b1), Node::Binary(op2, a2, b2)) => {
                op1 == op2 && a1.is_syntactically_equal(a2) && b1.is_syntactically_equal(b2)
            }
            (Node::Unary(op1, a1), Node::Unary(op2, a2)) => {
                op1 == op2 && a1.is_syntactically_equal(a2)
            }
            (
                Node::LibraryFunction {
                    func: f1,
                    order: o1,
                    arg: a1,
                },
                Node::LibraryFunction {
                    func: f2,
                    order: o2,
                    arg: a2,
                },
            ) => f1.same(f2) && o1 == o2 && a1.is_syntactically_equal(a2),
            (
                Node::Procedure {
                    func: f1,
                    order: o1,
                    arg: a1,
                },
                Node::Procedure {
                    func: f2,
                    order: o2,
                    arg: a2,
                },
            ) => f1.same(f2) && o1 == o2 && a1.is_syntactically_equal(a2),
            _ => false,
        }
    }

    pub fn tree_size(&self) -> usize {
        1 + self.children().into_iter().map(Node::tree_size).sum::<usize>()
    }

    /// True when the tree does not mention the free variable.
    pub fn is_constant(&self) -> bool {
        match self {
            Node::Variable => false,
            _ => self.children().into_iter().all(Node::is_constant),
        }
    }

    pub fn contains_nan(&self) -> bool {
        match self {
            Node::Constant(c) => c.is_nan(),
            _ => self.children().into_iter().any(Node::contains_nan),
        }
    }

    pub fn as_constant(&self) -> Option<&Real> {
        if let Node::Constant(c) = self {
            Some(c)
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Node::Constant(c) if c.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Node::Constant(c) if c.is_one())
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Node::Constant(c) if c.is_nan())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Rebuilds the node with `f` applied to each child.
    pub fn map_children(&self, mut f: impl FnMut(&Node) -> Node) -> Node {
        match self {
            Node::Binary(op, a, b) => Node::Binary(*op, f(a).boxed(), f(b).boxed()),
            Node::Unary(op, a) => Node::Unary(*op, f(a).boxed()),
            Node::LibraryFunction { func, order, arg } => Node::LibraryFunction {
                func: func.clone(),
                order: *order,
                arg: f(arg).boxed(),
            },
            Node::Procedure { func, order, arg } => Node::Procedure {
                func: func.clone(),
                order: *order,
                arg: f(arg).boxed(),
            },
            Node::Variable | Node::Constant(_) | Node::Pi | Node::LibraryConstant(_) => {
                self.clone()
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        self.is_syntactically_equal(other)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

pub fn var() -> Node {
    Node::Variable
}

pub fn constant(value: Real) -> Node {
    Node::Constant(value)
}

pub fn int(value: i64) -> Node {
    Node::integer(value)
}

pub fn zero() -> Node {
    Node::integer(0)
}

pub fn one() -> Node {
    Node::integer(1)
}

pub fn pi() -> Node {
    Node::Pi
}

pub fn add(a: Node, b: Node) -> Node {
    Node::binary(BinaryOp::Add, a, b)
}

pub fn sub(a: Node, b: Node) -> Node {
    Node::binary(BinaryOp::Sub, a, b)
}

pub fn mul(a: Node, b: Node) -> Node {
    Node::binary(BinaryOp::Mul, a, b)
}

pub fn div(a: Node, b: Node) -> Node {
    Node::binary(BinaryOp::Div, a, b)
}

pub fn pow(base: Node, exp: Node) -> Node {
    Node::binary(BinaryOp::Pow, base, exp)
}

pub fn neg(a: Node) -> Node {
    Node::unary(UnaryOp::Neg, a)
}
