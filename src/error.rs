use thiserror::Error;

use crate::{coefficient::Coefficient, poly::monomial::Variable};

/// Reasons an expression, assignment or relation system cannot be evaluated.
/// These are expected outcomes of user input; evaluation of the current
/// statement is abandoned and the environment is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("division by a polynomial is not supported")]
    UnsupportedDivisor,
    #[error("raising a polynomial to the power {0} is not supported")]
    UnsupportedExponent(Coefficient),
    #[error("exponentiation with a polynomial exponent is not supported")]
    UnsupportedPolynomialExponent,
    #[error("`{0}` refers to itself in its own definition")]
    SelfReference(Variable),
    #[error("`{0}` is already defined")]
    DuplicateDefinition(Variable),
}

/// A malformed statement. `position` is the byte offset into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character `{character}` at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("unexpected {found} at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        position: usize,
    },
    #[error("number `{literal}` at position {position} is out of range")]
    NumberOutOfRange { literal: String, position: usize },
    #[error("the left-hand side of `:=` at position {position} must be a variable")]
    InvalidAssignmentTarget { position: usize },
}
