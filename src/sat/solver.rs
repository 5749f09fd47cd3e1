//! SAT solver integration using CaDiCaL

use super::clause::{Clause, Cnf};
use anyhow::Result;
use cadical::Solver;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    last_result: SolverResultType,
    last_solve_time: Duration,
}

/// A satisfying assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSolution {
    /// One signed literal per variable, `model[v - 1]` is `v` or `-v`
    pub model: Vec<i32>,
    #[serde(skip)]
    pub solve_time: Duration,
}

/// Evidence of unsatisfiability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsatCore {
    /// Assumption literals the refutation depends on
    pub failed_assumptions: Vec<i32>,
    /// Indices into the solved clause list, set by [`SatSolver::solve_with_core`]
    pub clause_indices: Vec<usize>,
    #[serde(skip)]
    pub solve_time: Duration,
}

/// Result of a solve call; UNSAT is an answer, not an error
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Satisfiable(SolverSolution),
    Unsatisfiable(UnsatCore),
}

/// Statistics about the solving process
#[derive(Debug, Clone)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
    pub solve_time: Duration,
    pub result: SolverResultType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverResultType {
    NotSolved,
    Satisfiable,
    Unsatisfiable,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            last_result: SolverResultType::NotSolved,
            last_solve_time: Duration::ZERO,
        }
    }

    /// Create a solver loaded with a whole formula
    pub fn from_cnf(cnf: &Cnf) -> Self {
        let mut solver = Self::new();
        solver.add_cnf(cnf);
        solver
    }

    pub fn add_cnf(&mut self, cnf: &Cnf) {
        self.variable_count = self.variable_count.max(cnf.num_vars);
        self.add_clauses(&cnf.clauses);
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Add a single clause; an empty clause makes the formula unsatisfiable
    pub fn add_clause(&mut self, clause: &Clause) {
        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
    }

    /// Solve the SAT problem and return the first solution
    pub fn solve(&mut self) -> Result<Option<SolverSolution>> {
        match self.solve_with_assumptions(&[])? {
            SolveOutcome::Satisfiable(solution) => Ok(Some(solution)),
            SolveOutcome::Unsatisfiable(_) => Ok(None),
        }
    }

    /// Solve assuming every literal in `assumptions` holds
    ///
    /// On UNSAT the core lists the assumptions that took part in the
    /// refutation.
    pub fn solve_with_assumptions(&mut self, assumptions: &[i32]) -> Result<SolveOutcome> {
        for &lit in assumptions {
            self.variable_count = self.variable_count.max(lit.unsigned_abs() as usize);
        }

        debug!(
            "Solving {} clauses over {} variables with {} assumptions",
            self.clause_count,
            self.variable_count,
            assumptions.len()
        );

        let start_time = Instant::now();
        let result = self.solver.solve_with(assumptions.iter().copied());
        let solve_time = start_time.elapsed();
        self.last_solve_time = solve_time;

        match result {
            Some(true) => {
                self.last_result = SolverResultType::Satisfiable;
                Ok(SolveOutcome::Satisfiable(SolverSolution {
                    model: self.extract_model(),
                    solve_time,
                }))
            }
            Some(false) => {
                self.last_result = SolverResultType::Unsatisfiable;
                let failed_assumptions = assumptions
                    .iter()
                    .copied()
                    .filter(|&lit| self.solver.failed(lit))
                    .collect();
                Ok(SolveOutcome::Unsatisfiable(UnsatCore {
                    failed_assumptions,
                    clause_indices: Vec::new(),
                    solve_time,
                }))
            }
            None => anyhow::bail!("CaDiCaL stopped without a result"),
        }
    }

    /// Solve `cnf` on a fresh solver and, on UNSAT, report which clauses
    /// form a core
    ///
    /// Each clause `C_i` is added as `C_i ∨ ¬s_i` for a fresh selector `s_i`
    /// and the selectors are assumed; failed selectors name the core clauses.
    /// The returned model only covers the formula's own variables.
    pub fn solve_with_core(cnf: &Cnf) -> Result<SolveOutcome> {
        let mut solver = Self::new();
        let first_selector = cnf.num_vars as i32 + 1;
        let selectors: Vec<i32> = (0..cnf.len() as i32).map(|i| first_selector + i).collect();

        for (clause, &selector) in cnf.iter().zip(&selectors) {
            let mut literals = clause.literals.clone();
            literals.push(-selector);
            solver.add_clause(&Clause::new(literals));
        }

        match solver.solve_with_assumptions(&selectors)? {
            SolveOutcome::Satisfiable(mut solution) => {
                solution.model.truncate(cnf.num_vars);
                Ok(SolveOutcome::Satisfiable(solution))
            }
            SolveOutcome::Unsatisfiable(core) => {
                let clause_indices: Vec<usize> = core
                    .failed_assumptions
                    .iter()
                    .map(|&s| (s - first_selector) as usize)
                    .collect();
                info!("Unsat core: {} of {} clauses", clause_indices.len(), cnf.len());
                Ok(SolveOutcome::Unsatisfiable(UnsatCore {
                    failed_assumptions: Vec::new(),
                    clause_indices,
                    solve_time: core.solve_time,
                }))
            }
        }
    }

    /// Solve and find multiple solutions up to a limit
    ///
    /// Blocking clauses only mention the first `projection` variables, so
    /// solutions differing only in auxiliary variables are not repeated.
    pub fn solve_multiple(
        &mut self,
        max_solutions: usize,
        projection: usize,
    ) -> Result<Vec<SolverSolution>> {
        let mut solutions = Vec::new();

        while solutions.len() < max_solutions {
            let Some(solution) = self.solve()? else {
                break;
            };

            let blocking: Vec<i32> = solution
                .model
                .iter()
                .take(projection)
                .map(|&lit| -lit)
                .collect();
            solutions.push(solution);

            if blocking.is_empty() {
                break;
            }
            self.add_clause(&Clause::new(blocking));
        }

        Ok(solutions)
    }

    /// Extract a complete model for variables `1..=variable_count`
    ///
    /// Variables the solver never saw, or left unassigned, are reported false.
    fn extract_model(&self) -> Vec<i32> {
        let known = self.solver.max_variable();

        (1..=self.variable_count as i32)
            .map(|var| {
                let value = if var <= known {
                    self.solver.value(var).unwrap_or(false)
                } else {
                    false
                };
                if value {
                    var
                } else {
                    -var
                }
            })
            .collect()
    }

    /// Get solver statistics
    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.variable_count,
            clause_count: self.clause_count,
            solve_time: self.last_solve_time,
            result: self.last_result,
        }
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverSolution {
    /// Truth value of variable `var`
    pub fn value(&self, var: i32) -> bool {
        (var.unsigned_abs() as usize)
            .checked_sub(1)
            .and_then(|index| self.model.get(index))
            .is_some_and(|&lit| lit > 0)
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Result: {:?}", self.result)?;
        Ok(())
    }
}

impl std::fmt::Display for SolverSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solution:")?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Variables assigned: {}", self.model.len())?;

        write!(f, "  Sample assignments: ")?;
        for (i, lit) in self.model.iter().take(10).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", lit.abs(), if *lit > 0 { "T" } else { "F" })?;
        }
        if self.model.len() > 10 {
            write!(f, ", ...")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert_eq!(solver.statistics().result, SolverResultType::NotSolved);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // x1 ∨ x2, ¬x1 ∨ x2
        solver.add_clause(&Clause::new(vec![1, 2]));
        solver.add_clause(&Clause::new(vec![-1, 2]));

        let solution = solver.solve().unwrap().expect("satisfiable");
        assert!(solution.value(2));
        assert_eq!(solution.model.len(), 2);
        assert_eq!(solver.statistics().result, SolverResultType::Satisfiable);
    }

    #[test]
    fn test_value_outside_model_is_false() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1));

        let solution = solver.solve().unwrap().unwrap();
        assert!(solution.value(1));
        assert!(solution.value(-1));
        assert!(!solution.value(0));
        assert!(!solution.value(5));
    }

    #[test]
    fn test_statistics_display() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2]));
        solver.add_clause(&Clause::unit(-1));
        solver.solve().unwrap();

        let text = solver.statistics().to_string();
        assert!(text.contains("Variables: 2"));
        assert!(text.contains("Clauses: 2"));
        assert!(text.contains("Result: Satisfiable"));
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1));
        solver.add_clause(&Clause::unit(-1));

        assert!(solver.solve().unwrap().is_none());
        assert_eq!(solver.statistics().result, SolverResultType::Unsatisfiable);
    }

    #[test]
    fn test_empty_clause_is_unsatisfiable() {
        let mut cnf = Cnf::with_variables(1);
        cnf.push(Clause::unit(1));
        cnf.push(Clause::new(vec![]));

        let mut solver = SatSolver::from_cnf(&cnf);
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_model_covers_declared_variables() {
        // Variable 3 never occurs in a clause
        let mut cnf = Cnf::with_variables(3);
        cnf.push(Clause::unit(1));

        let mut solver = SatSolver::from_cnf(&cnf);
        let solution = solver.solve().unwrap().unwrap();
        assert_eq!(solution.model.len(), 3);
        assert_eq!(solution.model[0], 1);
        assert_eq!(solution.model[2].abs(), 3);
        assert!(cnf.is_satisfied_by(&solution.model));
    }

    #[test]
    fn test_failed_assumptions() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![-1, 2]));
        solver.add_clause(&Clause::new(vec![-2, -3]));

        match solver.solve_with_assumptions(&[1, 3, 4]).unwrap() {
            SolveOutcome::Unsatisfiable(core) => {
                assert!(!core.failed_assumptions.is_empty());
                assert!(!core.failed_assumptions.contains(&4));
            }
            SolveOutcome::Satisfiable(_) => panic!("expected UNSAT"),
        }
    }

    #[test]
    fn test_clause_core() {
        let mut cnf = Cnf::new();
        cnf.push(vec![1, 2]); // 0: irrelevant
        cnf.push(vec![3]); // 1
        cnf.push(vec![-3, 4]); // 2
        cnf.push(vec![-4]); // 3

        match SatSolver::solve_with_core(&cnf).unwrap() {
            SolveOutcome::Unsatisfiable(core) => {
                let mut indices = core.clause_indices.clone();
                indices.sort();
                assert_eq!(indices, vec![1, 2, 3]);
            }
            SolveOutcome::Satisfiable(_) => panic!("expected UNSAT"),
        }
    }

    #[test]
    fn test_clause_core_satisfiable_model_is_projected() {
        let mut cnf = Cnf::new();
        cnf.push(vec![1, 2]);
        cnf.push(vec![-1]);

        match SatSolver::solve_with_core(&cnf).unwrap() {
            SolveOutcome::Satisfiable(solution) => {
                assert_eq!(solution.model, vec![-1, 2]);
            }
            SolveOutcome::Unsatisfiable(_) => panic!("expected SAT"),
        }
    }

    #[test]
    fn test_multiple_solutions() {
        let mut solver = SatSolver::new();
        // x1 ∨ x2 has three models
        solver.add_clause(&Clause::new(vec![1, 2]));

        let solutions = solver.solve_multiple(5, 2).unwrap();
        assert_eq!(solutions.len(), 3);

        for solution in &solutions {
            assert!(solution.value(1) || solution.value(2));
        }
    }
}
