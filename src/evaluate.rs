//! Evaluation of parsed statements against an [`Environment`].
//!
//! Expressions are reduced to canonical polynomials, assignments extend the
//! environment and relation chains are merged into a [`RelationSystem`].
//! Evaluation is all-or-nothing: on error nothing is added to the environment.

use std::fmt;

use tracing::{debug, instrument};

use crate::ast::{BinaryOperator, Expression, RelationNode, Statement};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::poly::{monomial::Variable, polynomial::Polynomial};
use crate::printer::{PolynomialPrinter, PrintOptions, RelationSystemPrinter};
use crate::relation::{Relation, RelationSystem};

/// The result of evaluating a [`Statement`].
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Polynomial(Polynomial),
    Assignment { name: Variable, value: Polynomial },
    System(RelationSystem),
}

impl Evaluation {
    pub fn printer(&self, opts: PrintOptions) -> EvaluationPrinter<'_> {
        EvaluationPrinter {
            evaluation: self,
            opts,
        }
    }
}

pub struct EvaluationPrinter<'a> {
    evaluation: &'a Evaluation,
    opts: PrintOptions,
}

impl fmt::Display for EvaluationPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.evaluation {
            Evaluation::Polynomial(p) => {
                fmt::Display::fmt(&PolynomialPrinter::new_with_options(p, self.opts), f)
            }
            Evaluation::Assignment { name, value } => write!(
                f,
                "{} := {}",
                name,
                PolynomialPrinter::new_with_options(value, self.opts)
            ),
            Evaluation::System(s) => {
                fmt::Display::fmt(&RelationSystemPrinter::new_with_options(s, self.opts), f)
            }
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.printer(PrintOptions::new()), f)
    }
}

/// Evaluate a statement. Only a successful assignment modifies `env`.
pub fn evaluate(statement: &Statement, env: &mut Environment) -> Result<Evaluation, EvalError> {
    match statement {
        Statement::Expression(e) => evaluate_polynomial(e, env).map(Evaluation::Polynomial),
        Statement::Assignment { name, value } => {
            let value = evaluate_assignment(name, value, env)?;
            Ok(Evaluation::Assignment {
                name: name.clone(),
                value,
            })
        }
        Statement::RelationChain(chain) => {
            evaluate_relation_system(chain, env).map(Evaluation::System)
        }
    }
}

enum Task<'a> {
    Visit(&'a Expression),
    Apply(BinaryOperator),
    Negate,
}

/// Reduce an expression to a canonical polynomial. Bound variables are
/// replaced by a copy of their value, unbound ones stand for themselves.
///
/// The tree is walked with an explicit stack. Operands are evaluated and
/// combined from left to right, so the first failing operation is reported.
pub fn evaluate_polynomial(expr: &Expression, env: &Environment) -> Result<Polynomial, EvalError> {
    let mut tasks = vec![Task::Visit(expr)];
    let mut values: Vec<Polynomial> = vec![];

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(Expression::Chain(first, rest)) => {
                for (op, e) in rest.iter().rev() {
                    tasks.push(Task::Apply(*op));
                    tasks.push(Task::Visit(e));
                }
                tasks.push(Task::Visit(&**first));
            }
            Task::Visit(Expression::Negate(e)) => {
                tasks.push(Task::Negate);
                tasks.push(Task::Visit(&**e));
            }
            Task::Visit(Expression::Integer(n)) => values.push(Polynomial::constant(*n)),
            Task::Visit(Expression::Real(r)) => values.push(Polynomial::constant(*r)),
            Task::Visit(Expression::Variable(name)) => values.push(
                env.get(name)
                    .cloned()
                    .unwrap_or_else(|| Polynomial::variable(name)),
            ),
            Task::Apply(op) => {
                // both operands were pushed by the preceding visits
                let r = values.pop().unwrap_or_default();
                let l = values.pop().unwrap_or_default();
                values.push(match op {
                    BinaryOperator::Add => l + r,
                    BinaryOperator::Sub => l - r,
                    BinaryOperator::Mul => l * r,
                    BinaryOperator::Div => l.checked_div(r)?,
                    BinaryOperator::Pow => l.checked_pow(r)?,
                });
            }
            Task::Negate => {
                let v = values.pop().unwrap_or_default();
                values.push(-v);
            }
        }
    }

    Ok(values.pop().unwrap_or_default())
}

/// Evaluate `value` and bind it to `name`.
///
/// The right-hand side is evaluated before `name` is bound, so any occurrence
/// of `name` in the result is a self-reference and is rejected. The environment
/// keeps the bound polynomial; the caller receives a copy.
#[instrument(level = "debug", skip_all, fields(%name))]
pub fn evaluate_assignment(
    name: &Variable,
    value: &Expression,
    env: &mut Environment,
) -> Result<Polynomial, EvalError> {
    let poly = evaluate_polynomial(value, env)?;

    if poly.contains_variable(name) {
        debug!("{} occurs in its own definition {}", name, poly);
        return Err(EvalError::SelfReference(name.clone()));
    }

    env.insert(name.clone(), poly.clone())?;
    Ok(poly)
}

/// Evaluate a chain `r1 & r2 & ...` into a sorted, merged system.
///
/// Each relation is evaluated and normalized from left to right. A constant
/// relation that does not hold stops the evaluation; the relations after it
/// are never evaluated, so they cannot produce errors either.
#[instrument(level = "debug", skip_all, fields(relations = chain.len()))]
pub fn evaluate_relation_system(
    chain: &[RelationNode],
    env: &Environment,
) -> Result<RelationSystem, EvalError> {
    RelationSystem::try_from_relations(chain.iter().map(|r| -> Result<Relation, EvalError> {
        let left = evaluate_polynomial(&r.left, env)?;
        let right = evaluate_polynomial(&r.right, env)?;
        Ok(Relation::new(r.outcome, left, right))
    }))
}

#[cfg(test)]
mod test {
    use crate::ast::{BinaryOperator, Expression, RelationNode, Statement};
    use crate::coefficient::Coefficient;
    use crate::environment::Environment;
    use crate::error::EvalError;
    use crate::poly::polynomial::Polynomial;
    use crate::relation::{OutcomeSet, RelationSystem};

    use super::{evaluate, evaluate_polynomial, evaluate_relation_system, Evaluation};

    fn var(name: &str) -> Expression {
        Expression::variable(name)
    }

    fn bin(op: BinaryOperator, l: Expression, r: Expression) -> Expression {
        Expression::binary(op, l, r)
    }

    fn assign(name: &str, value: Expression) -> Statement {
        Statement::Assignment {
            name: name.into(),
            value,
        }
    }

    fn rel(outcome: OutcomeSet, left: Expression, right: Expression) -> RelationNode {
        RelationNode {
            outcome,
            left,
            right,
        }
    }

    #[test]
    fn literals_and_variables() {
        let env = Environment::new();
        assert_eq!(
            evaluate_polynomial(&Expression::Integer(3), &env),
            Ok(Polynomial::constant(3i64))
        );
        assert_eq!(
            evaluate_polynomial(&Expression::Real(0.5), &env),
            Ok(Polynomial::constant(0.5))
        );
        assert_eq!(
            evaluate_polynomial(&var("x"), &env),
            Ok(Polynomial::variable("x"))
        );
        assert_eq!(
            evaluate_polynomial(&Expression::negate(var("x")), &env),
            Ok(-Polynomial::variable("x"))
        );
    }

    #[test]
    fn substitution() {
        let mut env = Environment::new();
        let r = evaluate(
            &assign("y", bin(BinaryOperator::Add, var("x"), Expression::Integer(1))),
            &mut env,
        );
        assert!(matches!(r, Ok(Evaluation::Assignment { .. })));

        // y^2 = x^2 + 2x + 1
        let e = bin(BinaryOperator::Pow, var("y"), Expression::Integer(2));
        let p = evaluate_polynomial(&e, &env).unwrap();
        assert_eq!(p.to_string(), "x^2 + 2 x + 1");
    }

    #[test]
    fn self_reference() {
        let mut env = Environment::new();
        let s = assign("x", bin(BinaryOperator::Add, var("x"), Expression::Integer(1)));
        assert_eq!(
            evaluate(&s, &mut env),
            Err(EvalError::SelfReference("x".into()))
        );
        assert!(env.is_empty());

        // x - x cancels, so there is no occurrence left
        let s = assign("x", bin(BinaryOperator::Sub, var("x"), var("x")));
        assert!(evaluate(&s, &mut env).is_ok());
        assert_eq!(env.get("x"), Some(&Polynomial::zero()));
    }

    #[test]
    fn duplicate_definition() {
        let mut env = Environment::new();
        assert_eq!(
            evaluate(&assign("x", Expression::Integer(5)), &mut env),
            Ok(Evaluation::Assignment {
                name: "x".into(),
                value: Polynomial::constant(5i64)
            })
        );
        assert_eq!(
            evaluate(&assign("x", Expression::Integer(7)), &mut env),
            Err(EvalError::DuplicateDefinition("x".into()))
        );
        assert_eq!(env.get("x"), Some(&Polynomial::constant(5i64)));
    }

    #[test]
    fn arithmetic_errors_propagate() {
        let env = Environment::new();
        let e = bin(
            BinaryOperator::Add,
            Expression::Integer(1),
            bin(BinaryOperator::Div, var("x"), Expression::Integer(0)),
        );
        assert_eq!(evaluate_polynomial(&e, &env), Err(EvalError::DivisionByZero));

        let e = bin(BinaryOperator::Pow, var("x"), Expression::Integer(-1));
        assert_eq!(
            evaluate_polynomial(&e, &env),
            Err(EvalError::UnsupportedExponent(Coefficient::Integer(-1)))
        );
    }

    #[test]
    fn first_failing_operation_is_reported() {
        let env = Environment::new();
        // x / 0 * (1 / y): the division by zero is applied before 1 / y is evaluated
        let e = Expression::binary(BinaryOperator::Div, var("x"), Expression::Integer(0)).extend(
            BinaryOperator::Mul,
            bin(BinaryOperator::Div, Expression::Integer(1), var("y")),
        );
        assert_eq!(evaluate_polynomial(&e, &env), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn long_and_deep_expressions() {
        let env = Environment::new();
        let mut e = Expression::Integer(1);
        for _ in 1..20_000 {
            e = e.extend(BinaryOperator::Add, Expression::Integer(1));
        }
        assert_eq!(
            evaluate_polynomial(&e, &env),
            Ok(Polynomial::constant(20_000i64))
        );

        // 1 + (1 + (1 + ... x))
        let mut e = var("x");
        for _ in 0..50_000 {
            e = bin(BinaryOperator::Add, Expression::Integer(1), e);
        }
        let p = evaluate_polynomial(&e, &env).unwrap();
        assert_eq!(p.to_string(), "x + 50000");
    }

    #[test]
    fn relation_system() {
        let env = Environment::new();
        let chain = [
            rel(OutcomeSet::GREATER_EQUAL, var("x"), Expression::Integer(3)),
            rel(OutcomeSet::LESS_EQUAL, var("x"), Expression::Integer(3)),
        ];
        let s = evaluate_relation_system(&chain, &env).unwrap();
        assert_eq!(s.to_string(), "x + -3 = 0");
    }

    #[test]
    fn false_constant_skips_remaining_relations() {
        let env = Environment::new();
        // 1 > 2 & x / 0 = 0: the division is never evaluated
        let chain = [
            rel(OutcomeSet::GREATER, Expression::Integer(1), Expression::Integer(2)),
            rel(
                OutcomeSet::EQUAL,
                bin(BinaryOperator::Div, var("x"), Expression::Integer(0)),
                Expression::Integer(0),
            ),
        ];
        assert_eq!(
            evaluate_relation_system(&chain, &env),
            Ok(RelationSystem::Inconsistent)
        );

        // the other way round the error comes first
        let chain = [chain[1].clone(), chain[0].clone()];
        assert_eq!(
            evaluate_relation_system(&chain, &env),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn relations_use_bindings() {
        let mut env = Environment::new();
        evaluate(&assign("a", Expression::Integer(2)), &mut env).unwrap();
        let chain = [rel(OutcomeSet::LESS, var("a"), Expression::Integer(1))];
        assert_eq!(
            evaluate(&Statement::RelationChain(chain.to_vec()), &mut env),
            Ok(Evaluation::System(RelationSystem::Inconsistent))
        );
    }
}
