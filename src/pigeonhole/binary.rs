//! Logarithmic pigeonhole encoding
//!
//! Each pigeon writes its hole number in `⌈log2 holes⌉` bits. Codes past the
//! last hole are forbidden, and every pair of pigeons must differ in at least
//! one bit. The per-pair "bit differs" facts are auxiliary variables.

use crate::error::{EncodingError, EncodingResult};
use crate::sat::{Clause, Cnf, Expr, VariableManager};
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryVar {
    /// Bit `bit` of the hole number chosen by `pigeon`
    Bit { pigeon: usize, bit: usize },
    /// Pigeons `first < second` disagree on bit `bit`
    Differs {
        first: usize,
        second: usize,
        bit: usize,
    },
}

impl fmt::Display for BinaryVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryVar::Bit { pigeon, bit } => write!(f, "p{}_b{}", pigeon, bit),
            BinaryVar::Differs { first, second, bit } => {
                write!(f, "d{}_{}_b{}", first, second, bit)
            }
        }
    }
}

/// Number of bits needed to number `holes` holes
pub fn bits_for(holes: usize) -> usize {
    if holes <= 1 {
        0
    } else {
        (usize::BITS - (holes - 1).leading_zeros()) as usize
    }
}

#[derive(Debug, Clone)]
pub struct BinaryEncoder {
    pigeons: usize,
    holes: usize,
    bits: usize,
    variables: VariableManager<BinaryVar>,
}

impl BinaryEncoder {
    pub fn new(pigeons: usize) -> EncodingResult<Self> {
        if pigeons == 0 {
            return Err(EncodingError::InvalidParameter(
                "at least one pigeon is required".to_string(),
            ));
        }
        let holes = pigeons - 1;
        let bits = bits_for(holes);

        let mut variables = VariableManager::new();
        for pigeon in 0..pigeons {
            for bit in 0..bits {
                variables.declare(BinaryVar::Bit { pigeon, bit })?;
            }
        }
        for (first, second) in (0..pigeons).tuple_combinations() {
            for bit in 0..bits {
                variables.declare(BinaryVar::Differs { first, second, bit })?;
            }
        }

        Ok(Self {
            pigeons,
            holes,
            bits,
            variables,
        })
    }

    pub fn pigeons(&self) -> usize {
        self.pigeons
    }

    pub fn holes(&self) -> usize {
        self.holes
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn variables(&self) -> &VariableManager<BinaryVar> {
        &self.variables
    }

    fn bit(&self, pigeon: usize, bit: usize) -> EncodingResult<i32> {
        self.variables.lookup(&BinaryVar::Bit { pigeon, bit })
    }

    fn differs(&self, first: usize, second: usize, bit: usize) -> EncodingResult<i32> {
        self.variables
            .lookup(&BinaryVar::Differs { first, second, bit })
    }

    /// Literal asserting that bit `bit` of `pigeon` matches bit `bit` of `code`
    fn code_literal(&self, pigeon: usize, bit: usize, code: usize) -> EncodingResult<i32> {
        let var = self.bit(pigeon, bit)?;
        Ok(if (code >> bit) & 1 == 1 { var } else { -var })
    }

    /// Forbid codes that name no hole
    pub fn range_clauses(&self) -> EncodingResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        for pigeon in 0..self.pigeons {
            for code in self.holes..(1usize << self.bits) {
                let literals = (0..self.bits)
                    .map(|bit| self.code_literal(pigeon, bit, code).map(|lit| -lit))
                    .collect::<EncodingResult<Vec<_>>>()?;
                clauses.push(Clause::new(literals));
            }
        }
        Ok(clauses)
    }

    /// Every pair of pigeons differs in some bit
    pub fn difference_clauses(&self) -> EncodingResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        for (first, second) in (0..self.pigeons).tuple_combinations() {
            let mut some_bit = Vec::with_capacity(self.bits);
            for bit in 0..self.bits {
                let d = self.differs(first, second, bit)?;
                let x = self.bit(first, bit)?;
                let y = self.bit(second, bit)?;
                // d → x ⊕ y
                clauses.push(Clause::new(vec![-d, x, y]));
                clauses.push(Clause::new(vec![-d, -x, -y]));
                some_bit.push(d);
            }
            clauses.push(Clause::new(some_bit));
        }
        Ok(clauses)
    }

    pub fn encode(&self) -> EncodingResult<Cnf> {
        let mut cnf = Cnf::with_variables(self.variables.variable_count());
        cnf.extend(self.range_clauses()?);
        cnf.extend(self.difference_clauses()?);
        cnf.check_variables(self.variables.variable_count())?;
        Ok(cnf)
    }

    /// Formulas over the bit variables only, for the BDD backend
    pub fn constraints(&self) -> EncodingResult<Vec<Expr>> {
        let mut constraints = Vec::new();

        for pigeon in 0..self.pigeons {
            let mut valid = Vec::with_capacity(self.holes);
            for hole in 0..self.holes {
                let spelled = (0..self.bits)
                    .map(|bit| self.code_literal(pigeon, bit, hole).map(Expr::literal))
                    .collect::<EncodingResult<Vec<_>>>()?;
                valid.push(Expr::and(spelled));
            }
            constraints.push(Expr::or(valid));
        }

        for (first, second) in (0..self.pigeons).tuple_combinations() {
            let mut equal = Vec::with_capacity(self.bits);
            for bit in 0..self.bits {
                let x = Expr::var(self.bit(first, bit)?);
                let y = Expr::var(self.bit(second, bit)?);
                equal.push(x.iff(y));
            }
            constraints.push(!Expr::and(equal));
        }

        Ok(constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::{BddEncoder, SatSolver};

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(0), 0);
        assert_eq!(bits_for(1), 0);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(8), 3);
        assert_eq!(bits_for(9), 4);
    }

    #[test]
    fn test_variable_layout() {
        let encoder = BinaryEncoder::new(4).unwrap();
        // 3 holes → 2 bits; 4 pigeons × 2 bits + 6 pairs × 2 bits
        assert_eq!(encoder.bits(), 2);
        assert_eq!(encoder.variables().variable_count(), 8 + 12);
        assert_eq!(
            *encoder.variables().decode(1).unwrap(),
            BinaryVar::Bit { pigeon: 0, bit: 0 }
        );
        assert_eq!(
            *encoder.variables().decode(9).unwrap(),
            BinaryVar::Differs {
                first: 0,
                second: 1,
                bit: 0
            }
        );
    }

    #[test]
    fn test_range_clauses() {
        let encoder = BinaryEncoder::new(4).unwrap();
        // Only code 3 (binary 11) is unused
        let clauses = encoder.range_clauses().unwrap();
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[0].literals, vec![-1, -2]);
    }

    #[test]
    fn test_degenerate_sizes() {
        // One pigeon, no holes: an empty range clause
        let cnf = BinaryEncoder::new(1).unwrap().encode().unwrap();
        assert_eq!(cnf.clauses, vec![Clause::new(vec![])]);

        // Two pigeons, one hole: zero bits, the pair cannot differ
        let cnf = BinaryEncoder::new(2).unwrap().encode().unwrap();
        assert_eq!(cnf.clauses, vec![Clause::new(vec![])]);
    }

    #[test]
    fn test_unsat_like_one_hot() {
        for n in 1..=9 {
            let cnf = BinaryEncoder::new(n).unwrap().encode().unwrap();
            let mut solver = SatSolver::from_cnf(&cnf);
            assert!(solver.solve().unwrap().is_none(), "n = {} should be UNSAT", n);
        }
    }

    #[test]
    fn test_as_many_pigeons_as_holes_is_satisfiable() {
        // Drop one pigeon's clauses: n - 1 pigeons fit into n - 1 holes
        let encoder = BinaryEncoder::new(5).unwrap();
        let cnf = encoder.encode().unwrap();
        let last = encoder.pigeons() - 1;

        let mut reduced = Cnf::with_variables(cnf.num_vars);
        for clause in &cnf {
            let mentions_last = clause.literals.iter().any(|&lit| {
                match encoder.variables().decode(lit).unwrap() {
                    BinaryVar::Bit { pigeon, .. } => *pigeon == last,
                    BinaryVar::Differs { second, .. } => *second == last,
                }
            });
            if !mentions_last {
                reduced.push(clause.clone());
            }
        }

        let mut solver = SatSolver::from_cnf(&reduced);
        assert!(solver.solve().unwrap().is_some());
    }

    #[test]
    fn test_bdd_reduces_to_false() {
        for n in 1..=7 {
            let encoder = BinaryEncoder::new(n).unwrap();
            let bdd = BddEncoder::new(encoder.variables()).unwrap();
            let formula = bdd.conjoin(&encoder.constraints().unwrap()).unwrap();
            assert!(formula.is_false(), "n = {} should reduce to false", n);
        }
    }
}
