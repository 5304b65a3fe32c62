//! Text rendering of expression trees.

pub mod expr;

pub use expr::pretty;
