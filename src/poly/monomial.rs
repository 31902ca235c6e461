use std::cmp::Ordering;
use std::ops::Mul;

use smallvec::SmallVec;
use smartstring::{LazyCompact, SmartString};

use super::INLINED_FACTORS;

pub type Variable = SmartString<LazyCompact>;

/// A variable raised to a positive integer power.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarFactor {
    pub name: Variable,
    pub exponent: i64,
}

impl VarFactor {
    #[inline]
    pub fn new(name: &str, exponent: i64) -> VarFactor {
        VarFactor {
            name: name.into(),
            exponent,
        }
    }
}

impl PartialOrd for VarFactor {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VarFactor {
    /// Reverse-lexicographic in the name, so that `x > y > z`, and then ascending
    /// in the exponent.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .name
            .cmp(&self.name)
            .then(self.exponent.cmp(&other.exponent))
    }
}

/// A product of variable powers. The factors are kept sorted by name in
/// reverse-lexicographic priority (`x` before `y` before `z`) and every name
/// occurs at most once. The empty product is the constant 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Monomial {
    factors: SmallVec<[VarFactor; INLINED_FACTORS]>,
}

impl Monomial {
    /// The empty monomial.
    #[inline]
    pub fn one() -> Monomial {
        Monomial {
            factors: SmallVec::new(),
        }
    }

    /// The monomial `name^1`.
    #[inline]
    pub fn variable(name: &str) -> Monomial {
        Self::power(name, 1)
    }

    /// The monomial `name^exponent`. A zero exponent gives the empty monomial.
    pub fn power(name: &str, exponent: i64) -> Monomial {
        let mut m = Monomial::one();
        if exponent != 0 {
            m.factors.push(VarFactor::new(name, exponent));
        }
        m
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.factors.is_empty()
    }

    #[inline]
    pub fn factors(&self) -> &[VarFactor] {
        &self.factors
    }

    /// Total degree of the monomial.
    pub fn degree(&self) -> i64 {
        self.factors
            .iter()
            .fold(0i64, |acc, f| acc.wrapping_add(f.exponent))
    }

    /// Check whether `name` occurs in the monomial. The scan stops as soon as it
    /// passes the position where `name` would be stored.
    pub fn contains(&self, name: &str) -> bool {
        for f in &self.factors {
            match f.name.as_str().cmp(name) {
                Ordering::Equal => return true,
                Ordering::Greater => return false,
                Ordering::Less => {}
            }
        }
        false
    }
}

impl PartialOrd for Monomial {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Monomial {
    /// Compare factor by factor. When one monomial is a prefix of the other, the
    /// shorter one is smaller, so the empty monomial is the smallest of all.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.factors.iter().cmp(other.factors.iter())
    }
}

impl FromIterator<VarFactor> for Monomial {
    /// Multiply the factors together, merging equal names.
    fn from_iter<T: IntoIterator<Item = VarFactor>>(iter: T) -> Self {
        iter.into_iter()
            .filter(|f| f.exponent != 0)
            .fold(Monomial::one(), |acc, f| {
                let mut m = Monomial::one();
                m.factors.push(f);
                acc * m
            })
    }
}

impl Mul for Monomial {
    type Output = Monomial;

    /// Merge two sorted factor lists, adding the exponents of equal names.
    fn mul(self, other: Monomial) -> Monomial {
        if self.is_one() {
            return other;
        }
        if other.is_one() {
            return self;
        }

        let mut factors = SmallVec::with_capacity(self.factors.len() + other.factors.len());
        let mut lhs = self.factors.into_iter();
        let mut rhs = other.factors.into_iter();
        let mut a = lhs.next();
        let mut b = rhs.next();

        loop {
            match (a.take(), b.take()) {
                (Some(x), Some(y)) => match x.name.cmp(&y.name) {
                    Ordering::Less => {
                        factors.push(x);
                        a = lhs.next();
                        b = Some(y);
                    }
                    Ordering::Greater => {
                        factors.push(y);
                        a = Some(x);
                        b = rhs.next();
                    }
                    Ordering::Equal => {
                        factors.push(VarFactor {
                            name: x.name,
                            exponent: x.exponent.wrapping_add(y.exponent),
                        });
                        a = lhs.next();
                        b = rhs.next();
                    }
                },
                (Some(x), None) => {
                    factors.push(x);
                    factors.extend(lhs);
                    break;
                }
                (None, Some(y)) => {
                    factors.push(y);
                    factors.extend(rhs);
                    break;
                }
                (None, None) => break,
            }
        }

        Monomial { factors }
    }
}

impl<'a> Mul<&'a Monomial> for Monomial {
    type Output = Monomial;

    #[inline]
    fn mul(self, other: &'a Monomial) -> Monomial {
        if other.is_one() {
            return self;
        }
        self * other.clone()
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use super::{Monomial, VarFactor};

    fn mono(factors: &[(&str, i64)]) -> Monomial {
        factors.iter().map(|(n, e)| VarFactor::new(n, *e)).collect()
    }

    #[test]
    fn reverse_lexicographic() {
        assert_eq!(
            Monomial::variable("x").cmp(&Monomial::variable("y")),
            Ordering::Greater
        );
        assert_eq!(
            Monomial::variable("z").cmp(&Monomial::variable("y")),
            Ordering::Less
        );
        assert_eq!(
            Monomial::power("x", 2).cmp(&Monomial::variable("x")),
            Ordering::Greater
        );
    }

    #[test]
    fn prefix_is_smaller() {
        assert_eq!(
            mono(&[("x", 1), ("y", 1)]).cmp(&Monomial::variable("x")),
            Ordering::Greater
        );
        assert_eq!(Monomial::one().cmp(&Monomial::variable("z")), Ordering::Less);
        assert_eq!(Monomial::one().cmp(&Monomial::one()), Ordering::Equal);
    }

    #[test]
    fn multiplication_merges_names() {
        let a = mono(&[("x", 1), ("z", 2)]);
        let b = mono(&[("y", 3), ("z", 1)]);
        let c = a * b;
        assert_eq!(
            c.factors(),
            &[
                VarFactor::new("x", 1),
                VarFactor::new("y", 3),
                VarFactor::new("z", 3)
            ]
        );
        assert_eq!(c.degree(), 7);
    }

    #[test]
    fn collect_sorts_factors() {
        let m = mono(&[("z", 1), ("x", 2), ("z", 1), ("y", 0)]);
        assert_eq!(
            m.factors(),
            &[VarFactor::new("x", 2), VarFactor::new("z", 2)]
        );
    }

    #[test]
    fn contains() {
        let m = mono(&[("a", 1), ("c", 2), ("x", 1)]);
        assert!(m.contains("c"));
        assert!(m.contains("x"));
        assert!(!m.contains("b"));
        assert!(!m.contains("y"));
        assert!(!Monomial::one().contains("x"));
    }
}
