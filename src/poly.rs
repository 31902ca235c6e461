//! Sparse multivariate polynomials with machine integer and real coefficients.

pub mod monomial;
pub mod polynomial;

/// Number of variable factors a monomial stores inline before it allocates.
pub const INLINED_FACTORS: usize = 4;
