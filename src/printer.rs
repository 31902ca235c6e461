use std::fmt::{self, Write};

use crate::{
    coefficient::{Coefficient, DEFAULT_REAL_PRECISION},
    poly::polynomial::{Polynomial, Term},
    relation::{Relation, RelationSystem},
};

/// The text printed for a system of relations that has no solution.
pub const INCONSISTENT_SYSTEM: &str = "INCONSISTENT SYSTEM";

/// Separator between the relations of a consistent system.
const RELATION_SEPARATOR: &str = "\n   & ";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Number of digits after the decimal point of a real coefficient.
    pub precision: usize,
    /// Separator between a coefficient and the variables of a term.
    pub multiplication_operator: char,
    pub double_star_for_exponentiation: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintOptions {
    /// Terms as `2 x y^2` and reals in fixed-point notation with six decimals.
    pub const fn new() -> Self {
        Self {
            precision: DEFAULT_REAL_PRECISION,
            multiplication_operator: ' ',
            double_star_for_exponentiation: false,
        }
    }

    /// Print the output suitable for a file, with explicit multiplication
    /// signs and enough digits to read reals back without loss.
    pub const fn file() -> Self {
        Self {
            precision: 17,
            multiplication_operator: '*',
            double_star_for_exponentiation: false,
        }
    }

    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

pub struct PolynomialPrinter<'a> {
    pub poly: &'a Polynomial,
    pub opts: PrintOptions,
}

impl<'a> PolynomialPrinter<'a> {
    pub fn new(poly: &'a Polynomial) -> PolynomialPrinter<'a> {
        PolynomialPrinter {
            poly,
            opts: PrintOptions::new(),
        }
    }

    pub fn new_with_options(poly: &'a Polynomial, opts: PrintOptions) -> PolynomialPrinter<'a> {
        PolynomialPrinter { poly, opts }
    }

    fn fmt_term(&self, term: &Term, f: &mut fmt::Formatter) -> fmt::Result {
        // an exact integer one in front of variables is implied
        let mut first = match term.coefficient {
            Coefficient::Integer(_) if term.coefficient.is_one() && !term.monomial.is_one() => true,
            Coefficient::Integer(n) => {
                write!(f, "{}", n)?;
                false
            }
            Coefficient::Real(r) => {
                write!(f, "{:.*}", self.opts.precision, r)?;
                false
            }
        };

        for v in term.monomial.factors() {
            if !first {
                f.write_char(self.opts.multiplication_operator)?;
            }
            first = false;

            f.write_str(&v.name)?;
            if v.exponent != 1 {
                if self.opts.double_star_for_exponentiation {
                    f.write_str("**")?;
                } else {
                    f.write_char('^')?;
                }
                write!(f, "{}", v.exponent)?;
            }
        }

        Ok(())
    }
}

impl<'a> fmt::Display for PolynomialPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for t in self.poly.terms() {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;

            self.fmt_term(t, f)?;
        }
        Ok(())
    }
}

/// Prints a single relation as `left OP right`.
pub struct RelationPrinter<'a> {
    pub relation: &'a Relation,
    pub opts: PrintOptions,
}

impl<'a> RelationPrinter<'a> {
    pub fn new(relation: &'a Relation) -> RelationPrinter<'a> {
        RelationPrinter {
            relation,
            opts: PrintOptions::new(),
        }
    }

    pub fn new_with_options(relation: &'a Relation, opts: PrintOptions) -> RelationPrinter<'a> {
        RelationPrinter { relation, opts }
    }
}

impl<'a> fmt::Display for RelationPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            PolynomialPrinter::new_with_options(&self.relation.left, self.opts),
            self.relation.outcome,
            PolynomialPrinter::new_with_options(&self.relation.right, self.opts),
        )
    }
}

pub struct RelationSystemPrinter<'a> {
    pub system: &'a RelationSystem,
    pub opts: PrintOptions,
}

impl<'a> RelationSystemPrinter<'a> {
    pub fn new(system: &'a RelationSystem) -> RelationSystemPrinter<'a> {
        RelationSystemPrinter {
            system,
            opts: PrintOptions::new(),
        }
    }

    pub fn new_with_options(
        system: &'a RelationSystem,
        opts: PrintOptions,
    ) -> RelationSystemPrinter<'a> {
        RelationSystemPrinter { system, opts }
    }

}

impl<'a> fmt::Display for RelationSystemPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.system {
            RelationSystem::Inconsistent => f.write_str(INCONSISTENT_SYSTEM),
            RelationSystem::Consistent(relations) => {
                let mut first = true;
                for r in relations {
                    if !first {
                        f.write_str(RELATION_SEPARATOR)?;
                    }
                    first = false;

                    write!(f, "{}", RelationPrinter::new_with_options(r, self.opts))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::poly::monomial::{Monomial, VarFactor};
    use crate::poly::polynomial::Polynomial;
    use crate::relation::{OutcomeSet, Relation, RelationSystem};

    use super::{PolynomialPrinter, PrintOptions, RelationPrinter, RelationSystemPrinter};

    fn sample() -> Polynomial {
        // 2 x y^2 + 5 y + 9
        let xy2: Monomial = [VarFactor::new("x", 1), VarFactor::new("y", 2)]
            .into_iter()
            .collect();
        Polynomial::monomial(2i64, xy2)
            + Polynomial::monomial(5i64, Monomial::variable("y"))
            + Polynomial::constant(9i64)
    }

    #[test]
    fn default_format() {
        assert_eq!(sample().to_string(), "2 x y^2 + 5 y + 9");
        assert_eq!(Polynomial::zero().to_string(), "0");
        assert_eq!(Polynomial::one().to_string(), "1");
        assert_eq!(Polynomial::variable("x").to_string(), "x");
        assert_eq!(
            (Polynomial::variable("x") - Polynomial::constant(1.5)).to_string(),
            "x + -1.500000"
        );
        assert_eq!(
            Polynomial::monomial(1., Monomial::variable("z")).to_string(),
            "1.000000 z"
        );
    }

    #[test]
    fn file_format() {
        let opts = PrintOptions::file();
        assert_eq!(
            PolynomialPrinter::new_with_options(&sample(), opts).to_string(),
            "2*x*y^2 + 5*y + 9"
        );

        let opts = PrintOptions {
            double_star_for_exponentiation: true,
            ..PrintOptions::new().with_precision(2)
        };
        let p = sample() + Polynomial::constant(0.25);
        assert_eq!(
            PolynomialPrinter::new_with_options(&p, opts).to_string(),
            "2 x y**2 + 5 y + 9.25"
        );
    }

    #[test]
    fn relations_share_one_format() {
        let opts = PrintOptions::file().with_precision(1);
        let r = Relation::new(
            OutcomeSet::LESS_EQUAL,
            sample(),
            Polynomial::constant(0.5),
        );
        assert_eq!(r.to_string(), "2 x y^2 + 5 y + 9 <= 0.500000");
        assert_eq!(
            RelationPrinter::new_with_options(&r, opts).to_string(),
            "2*x*y^2 + 5*y + 9 <= 0.5"
        );

        let s = RelationSystem::Consistent(vec![r]);
        assert_eq!(
            RelationSystemPrinter::new_with_options(&s, opts).to_string(),
            "2*x*y^2 + 5*y + 9 <= 0.5"
        );
        assert_eq!(
            RelationSystemPrinter::new(&RelationSystem::Inconsistent).to_string(),
            "INCONSISTENT SYSTEM"
        );
    }
}
