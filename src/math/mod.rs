//! Mathematical building blocks: dense primitives and triangular solves.

pub mod dense;
pub mod triangular;

pub use dense::*;
pub use triangular::*;
