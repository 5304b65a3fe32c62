use thiserror::Error;

use crate::expr::Kind;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{kind:?} takes {expected} operand(s), got {found}")]
    Arity {
        kind: Kind,
        expected: usize,
        found: usize,
    },
    #[error("broken invariant: {0}")]
    Invariant(String),
}
