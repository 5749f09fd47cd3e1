//! The goat, wolf and cabbage river crossing as bounded planning

pub mod encoder;
pub mod interpret;
pub mod puzzle;
pub mod validator;

pub use encoder::{OnWestBank, RiverCrossingEncoder};
pub use interpret::{interpret, Interpretation, StepState};
pub use puzzle::{Bank, Entity, Puzzle};
pub use validator::{validate, Rule, SolutionValidator, ValidationReport, Violation};

use crate::config::RiverConfig;
use crate::sat::SatSolver;
use crate::utils::duration_secs;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A plan decoded from one model, with its independent check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverSolution {
    pub model: Vec<i32>,
    pub plan: Interpretation,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverReport {
    pub num_steps: usize,
    pub variables: usize,
    pub clauses: usize,
    pub solutions: Vec<RiverSolution>,
    #[serde(with = "duration_secs")]
    pub solve_time: Duration,
}

impl RiverReport {
    pub fn satisfiable(&self) -> bool {
        !self.solutions.is_empty()
    }
}

/// Encode, solve, decode and validate one crossing horizon
pub fn solve(puzzle: &Puzzle, config: &RiverConfig) -> Result<RiverReport> {
    let start_time = Instant::now();

    let encoder = RiverCrossingEncoder::new(puzzle.clone(), config.num_steps)?
        .with_print_cnf(config.print_cnf);
    let cnf = encoder
        .encode()
        .context("Failed to encode river crossing")?;
    debug!("{}", encoder.variables().statistics());

    let mut solver = SatSolver::from_cnf(&cnf);
    let models = solver
        .solve_multiple(config.max_solutions, cnf.num_vars)
        .context("SAT solving failed")?;
    debug!("{}", solver.statistics());
    info!(
        "Found {} plan(s) over {} steps",
        models.len(),
        config.num_steps
    );

    let mut solutions = Vec::with_capacity(models.len());
    for solution in models {
        let plan = interpret(
            &solution.model,
            encoder.variables(),
            puzzle.entities(),
            config.num_steps,
        )
        .context("Failed to decode model")?;
        let report = validate(&plan, puzzle);
        solutions.push(RiverSolution {
            model: solution.model,
            plan,
            report,
        });
    }

    Ok(RiverReport {
        num_steps: config.num_steps,
        variables: encoder.variables().variable_count(),
        clauses: cnf.len(),
        solutions,
        solve_time: start_time.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_steps: usize, max_solutions: usize) -> RiverConfig {
        RiverConfig {
            num_steps,
            max_solutions,
            print_cnf: false,
        }
    }

    #[test]
    fn test_eight_steps_is_solvable() {
        let puzzle = Puzzle::classic();
        let report = solve(&puzzle, &config(8, 1)).unwrap();
        assert!(report.satisfiable());
        assert_eq!(report.variables, 32);

        let solution = &report.solutions[0];
        assert!(solution.report.is_solution(), "{}", solution.report);
        assert_eq!(solution.plan.steps[0].west.len(), 4);
        assert_eq!(solution.plan.steps[7].east.len(), 4);
        assert!(solution.report.violations.is_empty());
    }

    #[test]
    fn test_too_short_horizon_is_unsat() {
        // Seven crossings are needed, so seven states are not enough
        let report = solve(&Puzzle::classic(), &config(7, 1)).unwrap();
        assert!(!report.satisfiable());
    }

    #[test]
    fn test_both_classic_plans_found() {
        let report = solve(&Puzzle::classic(), &config(8, 5)).unwrap();
        // Wolf first or cabbage first
        assert_eq!(report.solutions.len(), 2);
        assert!(report.solutions.iter().all(|s| s.report.is_solution()));
    }

    #[test]
    fn test_perturbed_model_is_rejected() {
        let puzzle = Puzzle::classic();
        let report = solve(&puzzle, &config(8, 1)).unwrap();
        let mut model = report.solutions[0].model.clone();

        // The only legal first crossing takes the goat; leave it west instead
        let encoder = RiverCrossingEncoder::new(puzzle.clone(), 8).unwrap();
        let goat = encoder
            .variables()
            .lookup(&OnWestBank {
                entity: Entity::Goat,
                step: 1,
            })
            .unwrap();
        let slot = (goat - 1) as usize;
        assert_eq!(model[slot], -goat);
        model[slot] = goat;

        let plan = interpret(&model, encoder.variables(), puzzle.entities(), 8).unwrap();
        let verdict = validate(&plan, &puzzle);
        assert!(!verdict.is_valid());

        let first = verdict.first_violation().unwrap();
        assert_eq!(first.step, 1);
        assert_eq!(
            first.rule,
            Rule::UnsafePair {
                first: Entity::Goat,
                second: Entity::Wolf,
                bank: Bank::West
            }
        );
    }
}
