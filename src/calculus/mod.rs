//! Symbolic differentiation.

pub mod differentiate;

pub use differentiate::{differentiate, differentiate_n};
