use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::mem;
use std::ops::{Add, Mul, Neg, Sub};

use tracing::{debug, trace};

use crate::coefficient::Coefficient;
use crate::error::EvalError;
use crate::printer::{PolynomialPrinter, PrintOptions};

use super::monomial::{Monomial, Variable};

/// A coefficient together with the monomial it multiplies.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub coefficient: Coefficient,
    pub monomial: Monomial,
}

impl Term {
    #[inline]
    pub fn new(coefficient: Coefficient, monomial: Monomial) -> Term {
        Term {
            coefficient,
            monomial,
        }
    }

    /// Multiply the term by `other` in place.
    #[inline]
    fn mul_assign(&mut self, other: &Term) {
        self.coefficient = self.coefficient * other.coefficient;
        if !other.monomial.is_one() {
            self.monomial = mem::take(&mut self.monomial) * &other.monomial;
        }
    }
}

/// Sparse multivariate polynomial in canonical form.
///
/// Terms are sorted by strictly decreasing monomial, no two terms share a
/// monomial and no coefficient is zero. The only exception is the zero
/// polynomial itself, which is stored as the single term `0` (an integer zero
/// times the empty monomial), so that the list of terms is never empty.
///
/// All binary operations take both operands by value: the right-hand side is
/// consumed and its terms are moved into the result or dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    terms: Vec<Term>,
}

impl Default for Polynomial {
    fn default() -> Self {
        Polynomial::zero()
    }
}

impl Polynomial {
    /// The canonical zero polynomial.
    #[inline]
    pub fn zero() -> Polynomial {
        Polynomial {
            terms: vec![Term::new(Coefficient::Integer(0), Monomial::one())],
        }
    }

    /// The multiplicative identity, the integer `1`.
    #[inline]
    pub fn one() -> Polynomial {
        Polynomial::constant(1i64)
    }

    /// A constant polynomial. A zero constant, integer or real, yields the
    /// canonical zero.
    pub fn constant(coeff: impl Into<Coefficient>) -> Polynomial {
        Polynomial::monomial(coeff, Monomial::one())
    }

    /// The polynomial `1 * name^1`.
    pub fn variable(name: &str) -> Polynomial {
        Polynomial::monomial(1i64, Monomial::variable(name))
    }

    /// A polynomial consisting of a single term.
    pub fn monomial(coeff: impl Into<Coefficient>, monomial: Monomial) -> Polynomial {
        let coefficient = coeff.into();
        if coefficient.is_zero() {
            return Polynomial::zero();
        }

        Polynomial {
            terms: vec![Term::new(coefficient, monomial)],
        }
    }

    /// Build a polynomial from terms in arbitrary order, merging equal
    /// monomials and removing zeros.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Polynomial {
        terms.into_iter().fold(Polynomial::zero(), |acc, t| {
            acc + Polynomial::monomial(t.coefficient, t.monomial)
        })
    }

    /// Returns `true` if the polynomial is identically zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.len() == 1
            && self.terms[0].monomial.is_one()
            && self.terms[0].coefficient.is_zero()
    }

    /// Returns `true` if the polynomial is the integer `1`.
    #[inline]
    pub fn is_one(&self) -> bool {
        self.terms.len() == 1
            && self.terms[0].monomial.is_one()
            && self.terms[0].coefficient.is_one()
    }

    /// Returns `true` if the polynomial has no variables. Since the empty
    /// monomial sorts last, only the leading term has to be inspected.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.first().map_or(true, |t| t.monomial.is_one())
    }

    /// The value of a constant polynomial.
    #[inline]
    pub fn constant_value(&self) -> Option<Coefficient> {
        if self.is_constant() {
            Some(self.lcoeff())
        } else {
            None
        }
    }

    /// Returns the number of terms in the polynomial.
    #[inline]
    pub fn nterms(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The coefficient of the leading term.
    #[inline]
    pub fn lcoeff(&self) -> Coefficient {
        self.terms
            .first()
            .map_or(Coefficient::Integer(0), |t| t.coefficient)
    }

    /// Check if `name` occurs in any of the terms.
    pub fn contains_variable(&self, name: &str) -> bool {
        self.terms.iter().any(|t| t.monomial.contains(name))
    }

    /// All variables that occur in the polynomial, sorted by priority.
    pub fn variables(&self) -> Vec<Variable> {
        let mut vars: Vec<Variable> = self
            .terms
            .iter()
            .flat_map(|t| t.monomial.factors().iter().map(|f| f.name.clone()))
            .collect();
        vars.sort();
        vars.dedup();
        vars
    }

    /// Check if the polynomial is sorted and has only non-zero coefficients.
    pub fn check_consistency(&self) {
        assert!(!self.terms.is_empty(), "Inconsistent polynomial (no terms)");

        if self.terms.len() == 1 && self.terms[0].monomial.is_one() {
            if let Coefficient::Real(r) = self.terms[0].coefficient {
                assert!(r != 0., "Inconsistent polynomial (real zero): {:?}", self);
            }
        } else {
            for t in &self.terms {
                if t.coefficient.is_zero() {
                    panic!("Inconsistent polynomial (0 coefficient): {:?}", self);
                }
            }
        }

        for t in &self.terms {
            for f in t.monomial.factors() {
                if f.exponent <= 0 {
                    panic!("Inconsistent polynomial (exponent {}): {:?}", f.exponent, self);
                }
            }
            for w in t.monomial.factors().windows(2) {
                if w[0].name >= w[1].name {
                    panic!("Inconsistent polynomial (unsorted factors): {:?}", self);
                }
            }
        }

        for w in self.terms.windows(2) {
            match w[0].monomial.cmp(&w[1].monomial) {
                Ordering::Equal => panic!("Inconsistent polynomial (equal monomials): {:?}", self),
                Ordering::Less => panic!(
                    "Inconsistent polynomial (wrong monomial ordering): {:?}",
                    self
                ),
                Ordering::Greater => {}
            }
        }
    }

    /// Compare two polynomials term by term: first the monomials, then the
    /// coefficients. A polynomial that runs out of terms first is smaller.
    /// This order is used to sort the relations of a system.
    pub fn compare(&self, other: &Polynomial) -> Ordering {
        for (a, b) in self.terms.iter().zip(&other.terms) {
            let c = a
                .monomial
                .cmp(&b.monomial)
                .then_with(|| a.coefficient.compare(&b.coefficient));
            if c != Ordering::Equal {
                return c;
            }
        }
        self.terms.len().cmp(&other.terms.len())
    }

    /// Apply `f` to every coefficient. The monomials, and therefore the order of
    /// the terms, are unchanged. Terms that become zero are removed.
    pub fn map_coefficients<F: FnMut(Coefficient) -> Coefficient>(mut self, mut f: F) -> Self {
        for t in &mut self.terms {
            t.coefficient = f(t.coefficient);
        }
        self.reduce_zero();
        self
    }

    /// Remove every zero term. If nothing is left, the polynomial becomes the
    /// canonical zero.
    fn reduce_zero(&mut self) {
        self.terms.retain(|t| !t.coefficient.is_zero());
        if self.terms.is_empty() {
            self.terms
                .push(Term::new(Coefficient::Integer(0), Monomial::one()));
        }
    }

    /// Divide by a polynomial that must be a non-zero constant.
    pub fn checked_div(self, divisor: Polynomial) -> Result<Polynomial, EvalError> {
        let Some(d) = divisor.constant_value() else {
            debug!("Rejected division by non-constant {}", divisor);
            return Err(EvalError::UnsupportedDivisor);
        };

        if d.is_zero() {
            debug!("Rejected division of {} by zero", self);
            return Err(EvalError::DivisionByZero);
        }

        Ok(self.map_coefficients(|c| c / d))
    }

    /// Raise to the power `exponent`, which must be a constant.
    ///
    /// A constant base is raised numerically, so negative and real exponents are
    /// allowed there. A base with variables only accepts non-negative integers.
    pub fn checked_pow(self, exponent: Polynomial) -> Result<Polynomial, EvalError> {
        let Some(e) = exponent.constant_value() else {
            debug!("Rejected polynomial exponent {}", exponent);
            return Err(EvalError::UnsupportedPolynomialExponent);
        };

        if let Some(base) = self.constant_value() {
            return Ok(Polynomial::constant(base.pow(e)));
        }

        match e {
            Coefficient::Integer(0) => Ok(Polynomial::one()),
            Coefficient::Integer(n) if n > 0 => Ok(self.pow(n as u64)),
            _ => {
                debug!("Rejected exponent {} for {}", e, self);
                Err(EvalError::UnsupportedExponent(e))
            }
        }
    }

    /// Compute `self^exp` by repeated squaring: an odd power is the previous
    /// power times `self`, an even power is the square of the half power.
    pub fn pow(&self, exp: u64) -> Polynomial {
        trace!("pow {}: {} terms", exp, self.nterms());
        match exp {
            0 => Polynomial::one(),
            1 => self.clone(),
            _ if exp % 2 == 1 => self.pow(exp - 1) * self.clone(),
            _ => {
                let half = self.pow(exp / 2);
                half.clone() * half
            }
        }
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    /// Merge the two sorted term lists. Equal monomials are combined into one
    /// term; the result is zero-reduced.
    fn add(self, other: Polynomial) -> Polynomial {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        let mut lhs = self.terms.into_iter().peekable();
        let mut rhs = other.terms.into_iter().peekable();

        loop {
            let c = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => a.monomial.cmp(&b.monomial),
                (Some(_), None) => {
                    terms.extend(lhs);
                    break;
                }
                (None, Some(_)) => {
                    terms.extend(rhs);
                    break;
                }
                (None, None) => break,
            };

            match c {
                Ordering::Greater => terms.extend(lhs.next()),
                Ordering::Less => terms.extend(rhs.next()),
                Ordering::Equal => {
                    if let (Some(mut a), Some(b)) = (lhs.next(), rhs.next()) {
                        a.coefficient = a.coefficient + b.coefficient;
                        terms.push(a);
                    }
                }
            }
        }

        let mut res = Polynomial { terms };
        res.reduce_zero();
        res
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, other: Polynomial) -> Polynomial {
        self + other.neg()
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(mut self) -> Polynomial {
        // Negate coefficients of all terms.
        for t in &mut self.terms {
            t.coefficient = -t.coefficient;
        }
        self
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    /// Distribute `self` over the terms of `other`. Every term of `other` except
    /// the last multiplies a fresh copy of `self`; the last one reuses `self`.
    /// The partial products are summed with the sorted merge of `add`.
    fn mul(self, other: Polynomial) -> Polynomial {
        let n = other.terms.len();
        let mut base = Some(self);
        let mut product: Option<Polynomial> = None;

        for (i, factor) in other.terms.into_iter().enumerate() {
            let partial = if i + 1 < n { base.clone() } else { base.take() };
            let Some(mut partial) = partial else {
                break;
            };

            // a monomial-preserving product keeps the terms sorted
            for t in &mut partial.terms {
                t.mul_assign(&factor);
            }

            product = Some(match product {
                Some(p) => p + partial,
                None => partial,
            });
        }

        let mut res = product.unwrap_or_default();
        res.reduce_zero();
        res
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        PolynomialPrinter::new_with_options(self, PrintOptions::new()).fmt(f)
    }
}
