//! Relations between polynomials and systems of simultaneous relations.
//!
//! A relation `left OP right` is normalized to `p OP 0`, where `p` has a
//! positive leading coefficient and coprime integer coefficients. A system is a
//! conjunction of normalized relations, sorted by [`Polynomial::compare`] with
//! the largest polynomial first, with at most one relation per polynomial.
//! Two relations on the same polynomial are merged by intersecting the sets of
//! outcomes they allow; an empty intersection proves the system inconsistent.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::mem;
use std::ops::BitAnd;

use tracing::{debug, instrument};

use crate::coefficient::Coefficient;
use crate::poly::polynomial::Polynomial;
use crate::printer::{RelationPrinter, RelationSystemPrinter};
use crate::utils;

/// The subset of `{<, =, >}` a relation allows, as a 3-bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutcomeSet(u8);

impl OutcomeSet {
    pub const EMPTY: OutcomeSet = OutcomeSet(0);
    pub const EQUAL: OutcomeSet = OutcomeSet(0b001);
    pub const GREATER: OutcomeSet = OutcomeSet(0b010);
    pub const GREATER_EQUAL: OutcomeSet = OutcomeSet(0b011);
    pub const LESS: OutcomeSet = OutcomeSet(0b100);
    pub const LESS_EQUAL: OutcomeSet = OutcomeSet(0b101);

    const ALL: u8 = 0b111;

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Option<OutcomeSet> {
        if bits & !Self::ALL == 0 {
            Some(OutcomeSet(bits))
        } else {
            None
        }
    }

    /// The single outcome of comparing a value with zero.
    #[inline]
    pub const fn from_ordering(o: Ordering) -> OutcomeSet {
        match o {
            Ordering::Less => Self::LESS,
            Ordering::Equal => Self::EQUAL,
            Ordering::Greater => Self::GREATER,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, o: Ordering) -> bool {
        self.0 & Self::from_ordering(o).0 != 0
    }

    #[inline]
    pub const fn intersection(self, other: OutcomeSet) -> OutcomeSet {
        OutcomeSet(self.0 & other.0)
    }

    /// The outcomes after swapping the sides of the relation: `<` and `>` trade
    /// places, `=` stays.
    #[inline]
    pub const fn reverse(self) -> OutcomeSet {
        OutcomeSet(
            (self.0 & Self::EQUAL.0)
                | ((self.0 & Self::GREATER.0) << 1)
                | ((self.0 & Self::LESS.0) >> 1),
        )
    }
}

impl BitAnd for OutcomeSet {
    type Output = OutcomeSet;

    #[inline]
    fn bitand(self, other: OutcomeSet) -> OutcomeSet {
        self.intersection(other)
    }
}

impl fmt::Display for OutcomeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self.0 {
            0b000 => "",
            0b001 => "=",
            0b010 => ">",
            0b011 => ">=",
            0b100 => "<",
            0b101 => "<=",
            0b110 => "<>",
            _ => "<=>",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub outcome: OutcomeSet,
    pub left: Polynomial,
    pub right: Polynomial,
}

impl Relation {
    pub fn new(outcome: OutcomeSet, left: Polynomial, right: Polynomial) -> Relation {
        Relation {
            outcome,
            left,
            right,
        }
    }

    /// Bring the relation into the form `p OP 0`.
    ///
    /// The integer coefficients of `p` are divided by their greatest common
    /// divisor and the sign is chosen so that the leading coefficient is
    /// positive, reversing the relation when the sign flips. Real coefficients
    /// do not take part in the divisor but are scaled along.
    pub fn normalize(&mut self) {
        let left = mem::take(&mut self.left);
        let right = mem::replace(&mut self.right, Polynomial::zero());
        let diff = left - right;

        let g = diff
            .terms()
            .iter()
            .filter_map(|t| match t.coefficient {
                Coefficient::Integer(n) => Some(n),
                Coefficient::Real(_) => None,
            })
            .fold(0i64, |g, n| utils::gcd_signed(g, n) as i64);
        let negative = diff.lcoeff().is_negative();

        if negative {
            self.outcome = self.outcome.reverse();
        }

        self.left = if g > 1 {
            let d = Coefficient::Integer(if negative { g.wrapping_neg() } else { g });
            diff.map_coefficients(|c| c / d)
        } else if negative {
            -diff
        } else {
            diff
        };

        debug!("Normalized relation: {}", self);
    }

    /// Returns `true` if neither side has variables.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.left.is_constant() && self.right.is_constant()
    }

    /// Check a relation between two constants.
    pub fn verify_constant(&self) -> bool {
        let o = self.left.lcoeff().compare(&self.right.lcoeff());
        self.outcome.contains(o)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&RelationPrinter::new(self), f)
    }
}

/// A conjunction of normalized relations, or the proof that it has no solution.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationSystem {
    Consistent(Vec<Relation>),
    Inconsistent,
}

impl Default for RelationSystem {
    fn default() -> Self {
        RelationSystem::new()
    }
}

impl RelationSystem {
    /// The empty, trivially consistent, system.
    pub fn new() -> RelationSystem {
        RelationSystem::Consistent(vec![])
    }

    #[inline]
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, RelationSystem::Inconsistent)
    }

    /// The relations of a consistent system, empty for an inconsistent one.
    pub fn relations(&self) -> &[Relation] {
        match self {
            RelationSystem::Consistent(r) => r,
            RelationSystem::Inconsistent => &[],
        }
    }

    /// Add a normalized relation. A relation on a polynomial that is already
    /// constrained is merged into the existing entry; if no outcome survives the
    /// merge, the whole system becomes inconsistent.
    pub fn insert(&mut self, relation: Relation) {
        let RelationSystem::Consistent(relations) = self else {
            return;
        };

        let pos = relations
            .iter()
            .position(|r| relation.left.compare(&r.left) != Ordering::Less);

        match pos {
            Some(i) if relation.left.compare(&relations[i].left) == Ordering::Equal => {
                let merged = relations[i].outcome & relation.outcome;
                if merged.is_empty() {
                    debug!(
                        "Contradiction: {} and {}",
                        relation, relations[i]
                    );
                    *self = RelationSystem::Inconsistent;
                } else {
                    relations[i].outcome = merged;
                }
            }
            Some(i) => relations.insert(i, relation),
            None => relations.push(relation),
        }
    }

    /// Build a system from a chain of relations that are produced on demand.
    ///
    /// Relations are normalized in order. A constant relation that does not
    /// hold makes the system inconsistent at once, without producing the rest
    /// of the chain. Otherwise the relations are inserted from the last to the
    /// first. The first error of the chain is returned as is.
    #[instrument(level = "debug", skip_all)]
    pub fn try_from_relations<E, I>(relations: I) -> Result<RelationSystem, E>
    where
        I: IntoIterator<Item = Result<Relation, E>>,
    {
        let mut normalized = vec![];
        for r in relations {
            let mut r = r?;
            r.normalize();
            if r.is_constant() && !r.verify_constant() {
                debug!("Constant relation does not hold: {}", r);
                return Ok(RelationSystem::Inconsistent);
            }
            normalized.push(r);
        }

        let mut system = RelationSystem::new();
        for r in normalized.into_iter().rev() {
            system.insert(r);
            if system.is_inconsistent() {
                break;
            }
        }

        Ok(system)
    }

    pub fn from_relations<I: IntoIterator<Item = Relation>>(relations: I) -> RelationSystem {
        match Self::try_from_relations(relations.into_iter().map(Ok::<_, Infallible>)) {
            Ok(s) => s,
            Err(e) => match e {},
        }
    }
}

impl fmt::Display for RelationSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&RelationSystemPrinter::new(self), f)
    }
}
