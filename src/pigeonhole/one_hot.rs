//! One-hot pigeonhole encoding: one variable per (pigeon, hole)

use crate::error::{EncodingError, EncodingResult};
use crate::sat::{Clause, Cnf, Expr, VariableManager};
use itertools::Itertools;
use std::fmt;

/// "pigeon `pigeon` sits in hole `hole`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupies {
    pub pigeon: usize,
    pub hole: usize,
}

impl fmt::Display for Occupies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x_{}_{}", self.pigeon, self.hole)
    }
}

/// Encodes `n` pigeons into `n - 1` holes
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    pigeons: usize,
    holes: usize,
    variables: VariableManager<Occupies>,
}

impl OneHotEncoder {
    pub fn new(pigeons: usize) -> EncodingResult<Self> {
        if pigeons == 0 {
            return Err(EncodingError::InvalidParameter(
                "at least one pigeon is required".to_string(),
            ));
        }
        let holes = pigeons - 1;

        let mut variables = VariableManager::new();
        for pigeon in 0..pigeons {
            for hole in 0..holes {
                variables.declare(Occupies { pigeon, hole })?;
            }
        }

        Ok(Self {
            pigeons,
            holes,
            variables,
        })
    }

    pub fn pigeons(&self) -> usize {
        self.pigeons
    }

    pub fn holes(&self) -> usize {
        self.holes
    }

    pub fn variables(&self) -> &VariableManager<Occupies> {
        &self.variables
    }

    /// Arithmetic form of the declaration order
    pub fn index(&self, pigeon: usize, hole: usize) -> i32 {
        (pigeon * self.holes + hole + 1) as i32
    }

    pub fn var(&self, pigeon: usize, hole: usize) -> EncodingResult<i32> {
        self.variables.lookup(&Occupies { pigeon, hole })
    }

    /// Every pigeon sits in at least one hole
    pub fn coverage_clauses(&self) -> EncodingResult<Vec<Clause>> {
        (0..self.pigeons)
            .map(|pigeon| {
                let literals = (0..self.holes)
                    .map(|hole| self.var(pigeon, hole))
                    .collect::<EncodingResult<Vec<_>>>()?;
                Ok(Clause::new(literals))
            })
            .collect()
    }

    /// No hole holds two pigeons
    pub fn exclusion_clauses(&self) -> EncodingResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        for hole in 0..self.holes {
            for (first, second) in (0..self.pigeons).tuple_combinations() {
                clauses.push(Clause::binary(
                    -self.var(first, hole)?,
                    -self.var(second, hole)?,
                ));
            }
        }
        Ok(clauses)
    }

    pub fn encode(&self) -> EncodingResult<Cnf> {
        let mut cnf = Cnf::with_variables(self.variables.variable_count());
        cnf.extend(self.coverage_clauses()?);
        cnf.extend(self.exclusion_clauses()?);
        cnf.check_variables(self.variables.variable_count())?;
        Ok(cnf)
    }

    /// The same constraints as formulas, for the BDD backend
    pub fn constraints(&self) -> EncodingResult<Vec<Expr>> {
        let mut constraints = Vec::new();
        for pigeon in 0..self.pigeons {
            let holes = (0..self.holes)
                .map(|hole| self.var(pigeon, hole).map(Expr::var))
                .collect::<EncodingResult<Vec<_>>>()?;
            constraints.push(Expr::or(holes));
        }
        for hole in 0..self.holes {
            for (first, second) in (0..self.pigeons).tuple_combinations() {
                let both = Expr::var(self.var(first, hole)?) & Expr::var(self.var(second, hole)?);
                constraints.push(!both);
            }
        }
        Ok(constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::{BddEncoder, SatSolver};

    fn choose_two(n: usize) -> usize {
        n * n.saturating_sub(1) / 2
    }

    #[test]
    fn test_rejects_zero_pigeons() {
        assert!(matches!(
            OneHotEncoder::new(0),
            Err(EncodingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_clause_counts() {
        for n in 1..=7 {
            let encoder = OneHotEncoder::new(n).unwrap();
            let holes = n - 1;
            assert_eq!(encoder.coverage_clauses().unwrap().len(), n);
            assert_eq!(
                encoder.exclusion_clauses().unwrap().len(),
                holes * choose_two(n)
            );
            assert_eq!(encoder.encode().unwrap().num_vars, n * holes);
        }
    }

    #[test]
    fn test_layout_matches_arithmetic() {
        let encoder = OneHotEncoder::new(5).unwrap();
        for pigeon in 0..5 {
            for hole in 0..4 {
                let id = encoder.var(pigeon, hole).unwrap();
                assert_eq!(id, encoder.index(pigeon, hole));
                assert_eq!(
                    *encoder.variables().decode(id).unwrap(),
                    Occupies { pigeon, hole }
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_lookup_fails() {
        let encoder = OneHotEncoder::new(3).unwrap();
        assert!(encoder.var(3, 0).is_err());
        assert!(encoder.var(0, 2).is_err());
    }

    #[test]
    fn test_four_pigeons_clauses() {
        let encoder = OneHotEncoder::new(4).unwrap();
        let cnf = encoder.encode().unwrap();
        assert_eq!(cnf.clauses[0].literals, vec![1, 2, 3]);
        assert_eq!(cnf.clauses[4].literals, vec![-1, -4]);
        assert_eq!(cnf.len(), 4 + 3 * 6);
    }

    #[test]
    fn test_unsat_for_small_n() {
        for n in 1..=7 {
            let cnf = OneHotEncoder::new(n).unwrap().encode().unwrap();
            let mut solver = SatSolver::from_cnf(&cnf);
            assert!(solver.solve().unwrap().is_none(), "n = {} should be UNSAT", n);
        }
    }

    #[test]
    fn test_dropping_exclusion_makes_it_satisfiable() {
        let encoder = OneHotEncoder::new(4).unwrap();
        let mut cnf = Cnf::with_variables(encoder.variables().variable_count());
        cnf.extend(encoder.coverage_clauses().unwrap());

        let mut solver = SatSolver::from_cnf(&cnf);
        let solution = solver.solve().unwrap().expect("coverage alone is satisfiable");
        assert!(cnf.is_satisfied_by(&solution.model));
    }

    #[test]
    fn test_bdd_reduces_to_false() {
        for n in 1..=6 {
            let encoder = OneHotEncoder::new(n).unwrap();
            let bdd = BddEncoder::new(encoder.variables()).unwrap();
            let formula = bdd.conjoin(&encoder.constraints().unwrap()).unwrap();
            assert!(formula.is_false(), "n = {} should reduce to false", n);
        }
    }
}
