//! Factorization backends.
//!
//! - `cholesky`: `G = L Lᵀ` for symmetric positive definite `G`
//! - `lu`: `G = P L U` with partial pivoting, `P` kept as an index array
//! - `qr`: `A = Q R` by Householder reflections
//! - `svd`: `A = U Σ Vᵀ` by one-sided Jacobi rotations
//!
//! Every factor is an owned value with no reference back to its input and
//! can rebuild the matrix it came from (`reconstruct`).

pub mod cholesky;
pub mod lu;
pub mod qr;
pub mod svd;

pub use cholesky::Cholesky;
pub use lu::Lu;
pub use qr::Qr;
pub use svd::Svd;
