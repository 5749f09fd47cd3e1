//! Clauses and CNF formulas

use crate::error::{EncodingError, EncodingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// A clause holding both `x` and `-x` is always true
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|&lit| self.literals.contains(&-lit))
    }

    /// Evaluate under a model of signed literals indexed by variable
    pub fn is_satisfied_by(&self, model: &[i32]) -> bool {
        self.literals.iter().any(|&lit| {
            (lit.unsigned_abs() as usize)
                .checked_sub(1)
                .and_then(|index| model.get(index))
                .is_some_and(|&value| value == lit)
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{} ", lit)?;
        }
        write!(f, "0")
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(literals)
    }
}

/// A conjunction of clauses over variables `1..=num_vars`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    pub num_vars: usize,
}

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(num_vars: usize) -> Self {
        Self {
            clauses: Vec::new(),
            num_vars,
        }
    }

    pub fn push(&mut self, clause: impl Into<Clause>) {
        let clause = clause.into();
        for &lit in &clause.literals {
            self.num_vars = self.num_vars.max(lit.unsigned_abs() as usize);
        }
        self.clauses.push(clause);
    }

    pub fn extend<I, C>(&mut self, clauses: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            self.push(clause);
        }
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    /// Fail on the first literal outside `1..=declared`
    pub fn check_variables(&self, declared: usize) -> EncodingResult<()> {
        for clause in &self.clauses {
            for &literal in &clause.literals {
                let var = literal.unsigned_abs() as usize;
                if var == 0 || var > declared {
                    return Err(EncodingError::UnallocatedLiteral { literal });
                }
            }
        }
        Ok(())
    }

    /// Check a complete model against every clause
    pub fn is_satisfied_by(&self, model: &[i32]) -> bool {
        self.clauses.iter().all(|c| c.is_satisfied_by(model))
    }

    /// Render in DIMACS CNF format
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.num_vars, self.clauses.len());
        for clause in &self.clauses {
            out.push_str(&clause.to_string());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a Cnf {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_creation() {
        let clause = Clause::new(vec![1, -2, 3]);
        assert_eq!(clause.literals, vec![1, -2, 3]);
        assert!(!clause.is_empty());
        assert!(!clause.is_unit());

        let unit_clause = Clause::unit(5);
        assert!(unit_clause.is_unit());
        assert_eq!(unit_clause.literals, vec![5]);
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::new(vec![1, 2, -1]).is_tautology());
        assert!(!Clause::new(vec![1, 2, -3]).is_tautology());
    }

    #[test]
    fn test_num_vars_tracking() {
        let mut cnf = Cnf::new();
        cnf.push(vec![1, -5, 3]);
        assert_eq!(cnf.num_vars, 5);
        cnf.push(vec![2, -7]);
        assert_eq!(cnf.num_vars, 7);
        assert_eq!(cnf.len(), 2);
    }

    #[test]
    fn test_check_variables() {
        let mut cnf = Cnf::new();
        cnf.push(vec![1, -2]);
        assert!(cnf.check_variables(2).is_ok());
        assert_eq!(
            cnf.check_variables(1),
            Err(EncodingError::UnallocatedLiteral { literal: -2 })
        );
    }

    #[test]
    fn test_model_evaluation() {
        let mut cnf = Cnf::new();
        cnf.push(vec![-1, 2]);
        cnf.push(vec![-2, 3]);

        assert!(cnf.is_satisfied_by(&[1, 2, 3]));
        assert!(cnf.is_satisfied_by(&[-1, -2, 3]));
        assert!(!cnf.is_satisfied_by(&[1, -2, 3]));
    }

    #[test]
    fn test_dimacs() {
        let mut cnf = Cnf::new();
        cnf.push(vec![-1, 2]);
        cnf.push(Clause::new(vec![]));
        assert_eq!(cnf.to_dimacs(), "p cnf 2 2\n-1 2 0\n0\n");
    }
}
