//! Implication chain warm-up: solve, extend with a conflict, solve under
//! assumptions

use crate::sat::{Clause, Cnf, SatSolver, SolveOutcome};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of solving under assumptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionResult {
    Model(Vec<i32>),
    /// Assumption literals that cannot hold together
    Core(Vec<i32>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupReport {
    pub chain: Cnf,
    pub chain_model: Option<Vec<i32>>,
    pub extended: Cnf,
    pub extended_satisfiable: bool,
    pub assumptions: Vec<i32>,
    pub assumption_result: AssumptionResult,
}

/// x1 → x2 → x3 → x4
pub fn implication_chain() -> Cnf {
    let mut cnf = Cnf::new();
    cnf.push(vec![-1, 2]);
    cnf.push(vec![-2, 3]);
    cnf.push(vec![-3, 4]);
    cnf
}

/// The clause ¬x4 ∨ ¬x1 closing the chain into a conflict when x1 holds
pub fn conflict_clause() -> Clause {
    Clause::binary(-4, -1)
}

pub fn solve_formula(cnf: &Cnf) -> Result<Option<Vec<i32>>> {
    let mut solver = SatSolver::from_cnf(cnf);
    Ok(solver.solve()?.map(|solution| solution.model))
}

pub fn solve_under_assumptions(cnf: &Cnf, assumptions: &[i32]) -> Result<AssumptionResult> {
    let mut solver = SatSolver::from_cnf(cnf);
    Ok(match solver.solve_with_assumptions(assumptions)? {
        SolveOutcome::Satisfiable(solution) => AssumptionResult::Model(solution.model),
        SolveOutcome::Unsatisfiable(core) => AssumptionResult::Core(core.failed_assumptions),
    })
}

pub fn run() -> Result<WarmupReport> {
    let chain = implication_chain();
    let chain_model = solve_formula(&chain).context("Failed to solve the implication chain")?;
    info!("Implication chain: {:?}", chain_model);

    let mut extended = chain.clone();
    extended.push(conflict_clause());
    let extended_satisfiable = solve_formula(&extended)
        .context("Failed to solve the extended formula")?
        .is_some();
    info!("With conflict clause: satisfiable = {}", extended_satisfiable);

    let assumptions = vec![1, 2, 3, 4];
    let assumption_result = solve_under_assumptions(&extended, &assumptions)
        .context("Failed to solve under assumptions")?;

    Ok(WarmupReport {
        chain,
        chain_model,
        extended,
        extended_satisfiable,
        assumptions,
        assumption_result,
    })
}

impl fmt::Display for WarmupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = |cnf: &Cnf| {
            cnf.iter()
                .map(|c| format!("{:?}", c.literals))
                .collect::<Vec<_>>()
                .join(" ")
        };

        writeln!(f, "Part 1: chain {}", clauses(&self.chain))?;
        match &self.chain_model {
            Some(model) => writeln!(f, "  Model: {:?}", model)?,
            None => writeln!(f, "  UNSAT")?,
        }
        writeln!(f, "Part 2: extended {}", clauses(&self.extended))?;
        writeln!(f, "  Satisfiable: {}", self.extended_satisfiable)?;
        writeln!(f, "Part 3: assuming {:?}", self.assumptions)?;
        match &self.assumption_result {
            AssumptionResult::Model(model) => writeln!(f, "  Satisfiable with model {:?}", model),
            AssumptionResult::Core(core) => writeln!(f, "  Unsatisfiable with core {:?}", core),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_satisfiable() {
        let chain = implication_chain();
        let model = solve_formula(&chain).unwrap().unwrap();
        assert_eq!(model.len(), 4);
        assert!(chain.is_satisfied_by(&model));
    }

    #[test]
    fn test_conflict_clause_keeps_formula_satisfiable() {
        let mut cnf = implication_chain();
        cnf.push(conflict_clause());
        let model = solve_formula(&cnf).unwrap().unwrap();
        // x1 must be false now
        assert_eq!(model[0], -1);
    }

    #[test]
    fn test_assumptions_yield_core() {
        let report = run().unwrap();
        assert!(report.chain_model.is_some());
        assert!(report.extended_satisfiable);
        assert_eq!(report.extended.len(), 4);

        let AssumptionResult::Core(core) = &report.assumption_result else {
            panic!("assuming every variable must be UNSAT");
        };
        assert!(!core.is_empty());
        assert!(core.iter().all(|lit| report.assumptions.contains(lit)));

        // The core alone is already contradictory
        let again = solve_under_assumptions(&report.extended, core).unwrap();
        assert!(matches!(again, AssumptionResult::Core(_)));
    }

    #[test]
    fn test_consistent_assumptions_give_model() {
        let mut cnf = implication_chain();
        cnf.push(conflict_clause());
        let result = solve_under_assumptions(&cnf, &[2]).unwrap();
        let AssumptionResult::Model(model) = result else {
            panic!("x2 alone is consistent");
        };
        assert_eq!(&model[1..], &[2, 3, 4]);
    }

    #[test]
    fn test_report_display() {
        let text = run().unwrap().to_string();
        assert!(text.contains("Part 3: assuming [1, 2, 3, 4]"));
        assert!(text.contains("Unsatisfiable with core"));
    }
}
