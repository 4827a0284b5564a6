//! Polynomial arithmetic over radix-2 evaluation domains.

/// Module for evaluation domains.
pub mod domain;

/// Module for polynomials in coefficient form.
pub mod polynomial;

/// Module for polynomials in evaluation (DFS) form.
pub mod polynomial_dfs;

pub use domain::EvaluationDomain;
pub use polynomial::FpPolynomial;
pub use polynomial_dfs::PolynomialDfs;
