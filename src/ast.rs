//! Expression trees produced by the parser and consumed by the evaluator.
//!
//! Operators of one precedence level are kept in a flat [`Expression::Chain`],
//! so a long sum is a single node. Printing and dropping walk the tree with an
//! explicit stack, which keeps deeply nested input off the call stack.

use std::fmt::{self, Write};
use std::mem;

use crate::poly::monomial::Variable;
use crate::relation::OutcomeSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOperator {
    /// Binding strength. Negation sits between `Mul` and `Pow`.
    #[inline]
    pub fn get_precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Sub => 1,
            BinaryOperator::Mul | BinaryOperator::Div => 2,
            BinaryOperator::Pow => 4,
        }
    }

    #[inline]
    pub fn right_associative(&self) -> bool {
        *self == BinaryOperator::Pow
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Add => f.write_char('+'),
            BinaryOperator::Sub => f.write_char('-'),
            BinaryOperator::Mul => f.write_char('*'),
            BinaryOperator::Div => f.write_char('/'),
            BinaryOperator::Pow => f.write_char('^'),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `first op_1 e_1 op_2 e_2 ...`, applied from left to right.
    Chain(Box<Expression>, Vec<(BinaryOperator, Expression)>),
    Negate(Box<Expression>),
    Integer(i64),
    Real(f64),
    Variable(Variable),
}

impl Expression {
    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::Chain(Box::new(left), vec![(op, right)])
    }

    pub fn negate(e: Expression) -> Expression {
        Expression::Negate(Box::new(e))
    }

    pub fn variable(name: &str) -> Expression {
        Expression::Variable(name.into())
    }

    /// Apply `op` to `self` and `right`. If `self` is a chain at the same
    /// precedence level, `right` is appended to it instead of nesting.
    pub fn extend(mut self, op: BinaryOperator, right: Expression) -> Expression {
        if let Expression::Chain(_, rest) = &mut self {
            if rest
                .first()
                .is_some_and(|(o, _)| o.get_precedence() == op.get_precedence())
            {
                rest.push((op, right));
                return self;
            }
        }
        Expression::binary(op, self, right)
    }

    /// Move the children of `self` onto `stack`, leaving leaves behind.
    fn detach_children(&mut self, stack: &mut Vec<Expression>) {
        match self {
            Expression::Chain(first, rest) => {
                stack.push(mem::replace(&mut **first, Expression::Integer(0)));
                stack.extend(rest.drain(..).map(|(_, e)| e));
            }
            Expression::Negate(e) => stack.push(mem::replace(&mut **e, Expression::Integer(0))),
            Expression::Integer(_) | Expression::Real(_) | Expression::Variable(_) => {}
        }
    }
}

impl Drop for Expression {
    fn drop(&mut self) {
        let mut stack = vec![];
        self.detach_children(&mut stack);
        while let Some(mut e) = stack.pop() {
            e.detach_children(&mut stack);
        }
    }
}

/// One relation `left OP right` of a chain `r1 & r2 & ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationNode {
    pub outcome: OutcomeSet,
    pub left: Expression,
    pub right: Expression,
}

/// A single top-level input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment { name: Variable, value: Expression },
    RelationChain(Vec<RelationNode>),
    Expression(Expression),
}

enum Piece<'a> {
    Expr(&'a Expression),
    Op(BinaryOperator),
    Text(&'static str),
}

impl fmt::Display for Expression {
    /// Print as an S-expression, e.g. `(+ 1 (* 2 x))`. A chain prints as
    /// nested binary operations: `1 - x - y` is `(- (- 1 x) y)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Expr(self)];

        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(s) => f.write_str(s)?,
                Piece::Op(op) => write!(f, "{}", op)?,
                Piece::Expr(Expression::Chain(first, rest)) => {
                    for (_, e) in rest.iter().rev() {
                        stack.push(Piece::Text(")"));
                        stack.push(Piece::Expr(e));
                        stack.push(Piece::Text(" "));
                    }
                    stack.push(Piece::Expr(&**first));
                    for (op, _) in rest {
                        stack.push(Piece::Text(" "));
                        stack.push(Piece::Op(*op));
                        stack.push(Piece::Text("("));
                    }
                }
                Piece::Expr(Expression::Negate(e)) => {
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Expr(&**e));
                    stack.push(Piece::Text("(- "));
                }
                Piece::Expr(Expression::Integer(n)) => write!(f, "{}", n)?,
                Piece::Expr(Expression::Real(r)) => write!(f, "{:?}", r)?,
                Piece::Expr(Expression::Variable(v)) => f.write_str(v)?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for RelationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.outcome, self.left, self.right)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment { name, value } => write!(f, "(:= {} {})", name, value),
            Statement::RelationChain(chain) => {
                let mut first = true;
                for r in chain {
                    if !first {
                        f.write_str(" & ")?;
                    }
                    first = false;
                    write!(f, "{}", r)?;
                }
                Ok(())
            }
            Statement::Expression(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::relation::OutcomeSet;

    use super::{BinaryOperator, Expression, RelationNode, Statement};

    #[test]
    fn s_expressions() {
        let e = Expression::binary(
            BinaryOperator::Add,
            Expression::Integer(1),
            Expression::binary(
                BinaryOperator::Pow,
                Expression::variable("x"),
                Expression::negate(Expression::Real(0.5)),
            ),
        );
        assert_eq!(e.to_string(), "(+ 1 (^ x (- 0.5)))");

        let s = Statement::Assignment {
            name: "y".into(),
            value: Expression::Real(2.),
        };
        assert_eq!(s.to_string(), "(:= y 2.0)");

        let s = Statement::RelationChain(vec![
            RelationNode {
                outcome: OutcomeSet::EQUAL,
                left: Expression::variable("a"),
                right: Expression::variable("b"),
            },
            RelationNode {
                outcome: OutcomeSet::GREATER,
                left: Expression::variable("c"),
                right: Expression::Integer(0),
            },
        ]);
        assert_eq!(s.to_string(), "(= a b) & (> c 0)");
    }

    #[test]
    fn chains() {
        let e = Expression::variable("a")
            .extend(BinaryOperator::Sub, Expression::variable("b"))
            .extend(BinaryOperator::Add, Expression::Integer(1))
            .extend(BinaryOperator::Mul, Expression::variable("c"));
        assert!(matches!(&e, Expression::Chain(_, rest) if rest.len() == 1));
        assert_eq!(e.to_string(), "(* (+ (- a b) 1) c)");
    }

    #[test]
    fn deep_trees() {
        let mut e = Expression::variable("x");
        for _ in 0..100_000 {
            e = Expression::negate(Expression::binary(
                BinaryOperator::Add,
                Expression::Integer(1),
                e,
            ));
        }
        assert!(e.to_string().starts_with("(- (+ 1 (- (+ 1 "));
    }
}
