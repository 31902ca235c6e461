//! Symrel is a small computer algebra evaluator for polynomial expressions and
//! systems of relations.
//!
//! Expressions over integers, reals and symbolic variables are reduced to a
//! canonical sparse multivariate polynomial. Variables can be bound once with
//! `:=`, and chains of (in)equalities joined by `&` are normalized and merged
//! into a sorted system, or proven inconsistent.
//!
//! For example:
//!
//! ```
//! use symrel::{environment::Environment, evaluate::evaluate, parser::parse};
//!
//! let mut env = Environment::new();
//! let r = evaluate(&parse("(x + 1)^2").unwrap(), &mut env).unwrap();
//! assert_eq!(r.to_string(), "x^2 + 2 x + 1");
//!
//! let r = evaluate(&parse("2 x >= 6 & x <= 3").unwrap(), &mut env).unwrap();
//! assert_eq!(r.to_string(), "x + -3 = 0");
//! ```

pub mod ast;
pub mod coefficient;
pub mod environment;
pub mod error;
pub mod evaluate;
pub mod parser;
pub mod poly;
pub mod printer;
pub mod relation;
pub mod utils;
