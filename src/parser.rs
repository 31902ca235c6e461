//! Tokenizer and parser for single-line statements.
//!
//! ```text
//! statement := IDENT ":=" expr | relation ("&" relation)* | expr
//! relation  := expr ("=" | ">" | ">=" | "<" | "<=") expr
//! expr      := term (("+" | "-") term)*
//! term      := unary (("*" | "/") unary | power)*
//! unary     := "-" unary | power
//! power     := primary (("^" | "**") unary)?
//! primary   := INTEGER | REAL | IDENT | "(" expr ")"
//! ```
//!
//! A primary directly following another factor multiplies it, so that
//! `2 x y^2` reads as `2*x*y^2` and printed polynomials parse back.
//! Statements are split recursively; expressions are reduced on an operator
//! stack so that long or deeply nested input does not recurse.

use std::fmt;

use crate::ast::{BinaryOperator, Expression, RelationNode, Statement};
use crate::error::ParseError;
use crate::poly::monomial::Variable;
use crate::relation::OutcomeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Real(f64),
    ID(Variable),
    Op(BinaryOperator),
    Relation(OutcomeSet),
    Assign,
    And,
    OpenParenthesis,
    CloseParenthesis,
    EOF,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "number `{}`", n),
            Token::Real(r) => write!(f, "number `{}`", r),
            Token::ID(v) => write!(f, "variable `{}`", v),
            Token::Op(o) => write!(f, "`{}`", o),
            Token::Relation(r) => write!(f, "`{}`", r),
            Token::Assign => f.write_str("`:=`"),
            Token::And => f.write_str("`&`"),
            Token::OpenParenthesis => f.write_str("`(`"),
            Token::CloseParenthesis => f.write_str("`)`"),
            Token::EOF => f.write_str("end of input"),
        }
    }
}

/// Split `input` into tokens, each paired with its byte offset. The list is
/// terminated by [`Token::EOF`].
pub fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = vec![];
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            i = scan_number(bytes, i);
            tokens.push((parse_number(&input[start..i], start)?, start));
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push((Token::ID(input[start..i].into()), start));
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (token, len) = match (c, next) {
            (b'*', Some(b'*')) => (Token::Op(BinaryOperator::Pow), 2),
            (b':', Some(b'=')) => (Token::Assign, 2),
            (b'>', Some(b'=')) => (Token::Relation(OutcomeSet::GREATER_EQUAL), 2),
            (b'<', Some(b'=')) => (Token::Relation(OutcomeSet::LESS_EQUAL), 2),
            (b'+', _) => (Token::Op(BinaryOperator::Add), 1),
            (b'-', _) => (Token::Op(BinaryOperator::Sub), 1),
            (b'*', _) => (Token::Op(BinaryOperator::Mul), 1),
            (b'/', _) => (Token::Op(BinaryOperator::Div), 1),
            (b'^', _) => (Token::Op(BinaryOperator::Pow), 1),
            (b'=', _) => (Token::Relation(OutcomeSet::EQUAL), 1),
            (b'>', _) => (Token::Relation(OutcomeSet::GREATER), 1),
            (b'<', _) => (Token::Relation(OutcomeSet::LESS), 1),
            (b'&', _) => (Token::And, 1),
            (b'(', _) => (Token::OpenParenthesis, 1),
            (b')', _) => (Token::CloseParenthesis, 1),
            _ => {
                return Err(ParseError::UnexpectedCharacter {
                    character: input[start..].chars().next().unwrap_or_default(),
                    position: start,
                })
            }
        };

        tokens.push((token, start));
        i += len;
    }

    tokens.push((Token::EOF, input.len()));
    Ok(tokens)
}

/// Return the end of the number literal starting at `i`: digits, an optional
/// fraction and an optional exponent. An `e` that is not followed by digits is
/// not part of the number.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    i = digits(i);

    if i < bytes.len() && bytes[i] == b'.' {
        i = digits(i + 1);
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = digits(j);
        }
    }

    i
}

fn parse_number(literal: &str, position: usize) -> Result<Token, ParseError> {
    let out_of_range = || ParseError::NumberOutOfRange {
        literal: literal.to_owned(),
        position,
    };

    if literal.bytes().all(|b| b.is_ascii_digit()) {
        literal
            .parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| out_of_range())
    } else {
        match literal.parse::<f64>() {
            Ok(r) if r.is_finite() => Ok(Token::Real(r)),
            _ => Err(out_of_range()),
        }
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map_or(&Token::EOF, |(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |(_, p)| *p)
    }

    fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.peek().to_string(),
            expected,
            position: self.position(),
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        if *self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        if let (Token::ID(name), Token::Assign) = (self.peek_nth(0), self.peek_nth(1)) {
            let name = name.clone();
            self.pos += 2;
            let value = self.expression()?;
            return Ok(Statement::Assignment { name, value });
        }

        let left = self.expression()?;

        match self.peek() {
            Token::Relation(_) => self.relation_chain(left),
            Token::Assign => Err(ParseError::InvalidAssignmentTarget {
                position: self.position(),
            }),
            _ => Ok(Statement::Expression(left)),
        }
    }

    fn relation_chain(&mut self, mut left: Expression) -> Result<Statement, ParseError> {
        let mut chain = vec![];
        loop {
            let Token::Relation(outcome) = *self.peek() else {
                return Err(self.unexpected("a relational operator"));
            };
            self.advance();

            let right = self.expression()?;
            chain.push(RelationNode {
                outcome,
                left,
                right,
            });

            if *self.peek() != Token::And {
                return Ok(Statement::RelationChain(chain));
            }
            self.advance();
            left = self.expression()?;
        }
    }

    /// Parse an expression with an explicit operator stack. Parentheses and
    /// prefix negation are pushed as markers, so nesting depth is bounded
    /// by memory and not by the call stack.
    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut operands: Vec<Expression> = vec![];
        let mut ops: Vec<StackOp> = vec![];
        let mut open = 0usize;
        let mut expect_operand = true;

        loop {
            if expect_operand {
                match self.peek() {
                    Token::Integer(n) => {
                        operands.push(Expression::Integer(*n));
                        expect_operand = false;
                    }
                    Token::Real(r) => {
                        operands.push(Expression::Real(*r));
                        expect_operand = false;
                    }
                    Token::ID(name) => {
                        operands.push(Expression::Variable(name.clone()));
                        expect_operand = false;
                    }
                    Token::Op(BinaryOperator::Sub) => ops.push(StackOp::Negate),
                    Token::OpenParenthesis => {
                        ops.push(StackOp::Open);
                        open += 1;
                    }
                    _ => return Err(self.unexpected("a number, a variable or `(`")),
                }
                self.advance();
                continue;
            }

            match self.peek() {
                Token::Op(op) => {
                    let op = *op;
                    self.advance();
                    push_operator(op, &mut ops, &mut operands)
                        .ok_or_else(|| self.unexpected("an operand"))?;
                    expect_operand = true;
                }
                // juxtaposition multiplies; the operand is read on the next pass
                Token::Integer(_) | Token::Real(_) | Token::ID(_) | Token::OpenParenthesis => {
                    push_operator(BinaryOperator::Mul, &mut ops, &mut operands)
                        .ok_or_else(|| self.unexpected("an operand"))?;
                    expect_operand = true;
                }
                Token::CloseParenthesis if open > 0 => {
                    while let Some(top) = ops.pop() {
                        if top == StackOp::Open {
                            break;
                        }
                        reduce(top, &mut operands).ok_or_else(|| self.unexpected("an operand"))?;
                    }
                    open -= 1;
                    self.advance();
                }
                _ => break,
            }
        }

        if open > 0 {
            return Err(self.unexpected("`)`"));
        }

        while let Some(top) = ops.pop() {
            reduce(top, &mut operands).ok_or_else(|| self.unexpected("an operand"))?;
        }

        match (operands.pop(), operands.is_empty()) {
            (Some(e), true) => Ok(e),
            _ => Err(self.unexpected("an operand")),
        }
    }
}

/// Entries of the operator stack in [`Parser::expression`].
#[derive(Debug, Copy, Clone, PartialEq)]
enum StackOp {
    Binary(BinaryOperator),
    Negate,
    Open,
}

impl StackOp {
    fn get_precedence(&self) -> u8 {
        match self {
            StackOp::Binary(op) => op.get_precedence(),
            StackOp::Negate => 3,
            StackOp::Open => 0,
        }
    }
}

/// Reduce every stacked operator that binds at least as tightly as `op`,
/// then push `op`. Returns `None` if an operand is missing.
fn push_operator(
    op: BinaryOperator,
    ops: &mut Vec<StackOp>,
    operands: &mut Vec<Expression>,
) -> Option<()> {
    while let Some(&top) = ops.last() {
        let p = top.get_precedence();
        if top == StackOp::Open
            || p < op.get_precedence()
            || (p == op.get_precedence() && op.right_associative())
        {
            break;
        }
        ops.pop();
        reduce(top, operands)?;
    }
    ops.push(StackOp::Binary(op));
    Some(())
}

fn reduce(op: StackOp, operands: &mut Vec<Expression>) -> Option<()> {
    let e = match op {
        StackOp::Binary(op) => {
            let right = operands.pop()?;
            let left = operands.pop()?;
            left.extend(op, right)
        }
        StackOp::Negate => Expression::negate(operands.pop()?),
        StackOp::Open => return None,
    };
    operands.push(e);
    Some(())
}

/// Parse a single statement. The whole input must be consumed.
pub fn parse(input: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
    };

    let statement = parser.statement()?;
    parser.expect(Token::EOF, "end of input")?;
    Ok(statement)
}

#[cfg(test)]
mod test {
    use crate::ast::{Expression, Statement};
    use crate::error::ParseError;
    use crate::relation::OutcomeSet;

    use super::{parse, tokenize, Token};

    fn tree(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn tokens() {
        let t: Vec<Token> = tokenize("x1 := 2.5e1 ** 3 >= 1e")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            t,
            vec![
                Token::ID("x1".into()),
                Token::Assign,
                Token::Real(25.),
                Token::Op(crate::ast::BinaryOperator::Pow),
                Token::Integer(3),
                Token::Relation(OutcomeSet::GREATER_EQUAL),
                Token::Integer(1),
                Token::ID("e".into()),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn precedence() {
        assert_eq!(tree("1 + 2 * x"), "(+ 1 (* 2 x))");
        assert_eq!(tree("1 - x - y"), "(- (- 1 x) y)");
        assert_eq!(tree("x / 2 * y"), "(* (/ x 2) y)");
        assert_eq!(tree("(1 + x) * y"), "(* (+ 1 x) y)");
    }

    #[test]
    fn powers() {
        assert_eq!(tree("2^3^2"), "(^ 2 (^ 3 2))");
        assert_eq!(tree("-x^2"), "(- (^ x 2))");
        assert_eq!(tree("x^-1"), "(^ x (- 1))");
        assert_eq!(tree("x**2"), "(^ x 2)");
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(tree("2 x y^2 + 5 y + 9"), "(+ (+ (* (* 2 x) (^ y 2)) (* 5 y)) 9)");
        assert_eq!(tree("x + -1.5"), "(+ x (- 1.5))");
        assert_eq!(tree("2(x + 1)"), "(* 2 (+ x 1))");
        assert_eq!(tree("x * -y z"), "(* (* x (- y)) z)");
        assert_eq!(tree("(x + 1)(x - 1)"), "(* (+ x 1) (- x 1))");
    }

    #[test]
    fn long_chains_are_flat() {
        let input = vec!["1"; 20_000].join(" + ");
        let Ok(Statement::Expression(e)) = parse(&input) else {
            panic!("expected an expression");
        };
        assert!(matches!(&e, Expression::Chain(_, rest) if rest.len() == 19_999));
    }

    #[test]
    fn deep_nesting() {
        let n = 100_000;
        let input = format!("{}x + 1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(tree(&input), "(+ x 1)");

        let input = format!("{}x{}", "-(1 + ".repeat(n), ")".repeat(n));
        assert!(tree(&input).starts_with("(- (+ 1 (- (+ 1 "));

        let input = format!("{}x{}", "(".repeat(n), ")".repeat(n - 1));
        assert!(matches!(
            parse(&input),
            Err(ParseError::UnexpectedToken { expected: "`)`", .. })
        ));
    }

    #[test]
    fn statements() {
        assert_eq!(tree("y := x + 1"), "(:= y (+ x 1))");
        assert_eq!(tree("x >= 3 & x <= 3"), "(>= x 3) & (<= x 3)");
        assert_eq!(tree("a = b"), "(= a b)");
        assert!(matches!(parse("x"), Ok(Statement::Expression(_))));
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse("1 +"),
            Err(ParseError::UnexpectedToken {
                found: "end of input".to_owned(),
                expected: "a number, a variable or `(`",
                position: 3
            })
        );
        assert_eq!(
            parse("x $ 1"),
            Err(ParseError::UnexpectedCharacter {
                character: '$',
                position: 2
            })
        );
        assert_eq!(
            parse("99999999999999999999"),
            Err(ParseError::NumberOutOfRange {
                literal: "99999999999999999999".to_owned(),
                position: 0
            })
        );
        assert_eq!(
            parse("x + 1 := 2"),
            Err(ParseError::InvalidAssignmentTarget { position: 6 })
        );
        assert!(matches!(
            parse("(x + 1"),
            Err(ParseError::UnexpectedToken { expected: "`)`", .. })
        ));
        assert!(matches!(
            parse("x > 1 & y"),
            Err(ParseError::UnexpectedToken {
                expected: "a relational operator",
                ..
            })
        ));
        assert!(matches!(
            parse("x & y"),
            Err(ParseError::UnexpectedToken {
                expected: "end of input",
                ..
            })
        ));
    }
}
