//! Numeric coefficients of polynomial terms.
//!
//! A coefficient is either an exact machine integer or a double precision real.
//! Arithmetic keeps integers integral for as long as both operands are integers,
//! and promotes to a real as soon as a real is involved (or an integer division
//! is not exact). Integer arithmetic wraps around on overflow.

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Mul, Neg},
};

use crate::utils;

/// Number of digits printed after the decimal point of a real coefficient,
/// unless a precision is requested explicitly.
pub const DEFAULT_REAL_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    Integer(i64),
    Real(f64),
}

impl From<i64> for Coefficient {
    fn from(value: i64) -> Self {
        Coefficient::Integer(value)
    }
}

impl From<f64> for Coefficient {
    fn from(value: f64) -> Self {
        Coefficient::Real(value)
    }
}

impl Default for Coefficient {
    fn default() -> Self {
        Coefficient::Integer(0)
    }
}

impl Coefficient {
    #[inline]
    pub fn is_zero(&self) -> bool {
        match *self {
            Coefficient::Integer(n) => n == 0,
            Coefficient::Real(r) => r == 0.,
        }
    }

    /// Returns `true` only for the integer `1`; a real `1.0` is not an exact one.
    #[inline]
    pub fn is_one(&self) -> bool {
        matches!(self, Coefficient::Integer(1))
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, Coefficient::Integer(_))
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.sign() == Ordering::Less
    }

    #[inline]
    pub fn to_f64(&self) -> f64 {
        match *self {
            Coefficient::Integer(n) => n as f64,
            Coefficient::Real(r) => r,
        }
    }

    /// Compare two coefficients numerically. Integers are promoted to reals for
    /// the comparison only when the other side is real.
    ///
    /// Unordered values (NaN, e.g. from `inf - inf`) intentionally compare
    /// equal. Constant relations are checked with this function, so a NaN
    /// constant satisfies `=`, `>=` and `<=`, and polynomials that differ only
    /// in a NaN coefficient sort as equal and merge in a system.
    pub fn compare(&self, other: &Coefficient) -> Ordering {
        match (self, other) {
            (Coefficient::Integer(a), Coefficient::Integer(b)) => a.cmp(b),
            _ => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }

    /// The sign of the coefficient as its ordering relative to zero.
    #[inline]
    pub fn sign(&self) -> Ordering {
        self.compare(&Coefficient::Integer(0))
    }

    /// Raise `self` to the power `exp`. A negative integer exponent or a real on
    /// either side yields a real.
    pub fn pow(self, exp: Coefficient) -> Coefficient {
        match (self, exp) {
            (Coefficient::Integer(b), Coefficient::Integer(e)) => {
                if e < 0 {
                    Coefficient::Real((b as f64).powf(e as f64))
                } else {
                    Coefficient::Integer(utils::wrapping_pow_i64(b, e as u64))
                }
            }
            (Coefficient::Integer(b), Coefficient::Real(e)) => {
                Coefficient::Real((b as f64).powf(e))
            }
            (Coefficient::Real(b), Coefficient::Integer(e)) => Coefficient::Real(b.powf(e as f64)),
            (Coefficient::Real(b), Coefficient::Real(e)) => Coefficient::Real(b.powf(e)),
        }
    }
}

impl Add for Coefficient {
    type Output = Coefficient;

    fn add(self, other: Coefficient) -> Coefficient {
        match (self, other) {
            (Coefficient::Integer(a), Coefficient::Integer(b)) => {
                Coefficient::Integer(a.wrapping_add(b))
            }
            (Coefficient::Integer(a), Coefficient::Real(b)) => Coefficient::Real(a as f64 + b),
            (Coefficient::Real(a), Coefficient::Integer(b)) => Coefficient::Real(a + b as f64),
            (Coefficient::Real(a), Coefficient::Real(b)) => Coefficient::Real(a + b),
        }
    }
}

impl Mul for Coefficient {
    type Output = Coefficient;

    fn mul(self, other: Coefficient) -> Coefficient {
        match (self, other) {
            (Coefficient::Integer(a), Coefficient::Integer(b)) => {
                Coefficient::Integer(a.wrapping_mul(b))
            }
            (Coefficient::Integer(a), Coefficient::Real(b)) => Coefficient::Real(a as f64 * b),
            (Coefficient::Real(a), Coefficient::Integer(b)) => Coefficient::Real(a * b as f64),
            (Coefficient::Real(a), Coefficient::Real(b)) => Coefficient::Real(a * b),
        }
    }
}

impl Div for Coefficient {
    type Output = Coefficient;

    /// Divide by a non-zero coefficient. An inexact integer division promotes
    /// the quotient to a real.
    fn div(self, other: Coefficient) -> Coefficient {
        match (self, other) {
            (Coefficient::Integer(a), Coefficient::Integer(b)) => {
                if a.wrapping_rem(b) != 0 {
                    Coefficient::Real(a as f64 / b as f64)
                } else {
                    Coefficient::Integer(a.wrapping_div(b))
                }
            }
            (Coefficient::Integer(a), Coefficient::Real(b)) => Coefficient::Real(a as f64 / b),
            (Coefficient::Real(a), Coefficient::Integer(b)) => Coefficient::Real(a / b as f64),
            (Coefficient::Real(a), Coefficient::Real(b)) => Coefficient::Real(a / b),
        }
    }
}

impl Neg for Coefficient {
    type Output = Coefficient;

    fn neg(self) -> Coefficient {
        match self {
            Coefficient::Integer(n) => Coefficient::Integer(n.wrapping_neg()),
            Coefficient::Real(r) => Coefficient::Real(-r),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coefficient::Integer(n) => write!(f, "{}", n),
            Coefficient::Real(r) => {
                let precision = f.precision().unwrap_or(DEFAULT_REAL_PRECISION);
                write!(f, "{:.*}", precision, r)
            }
        }
    }
}
