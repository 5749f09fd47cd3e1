//! Bounded-horizon encoding of the river crossing
//!
//! One variable per entity and time step, true when the entity is on the
//! west bank. Variables are declared step-major, so the entity at position
//! `e` in step `t` is `t * |entities| + e + 1`.

use super::puzzle::{Entity, Puzzle};
use crate::error::{EncodingError, EncodingResult};
use crate::sat::{Cnf, Expr, VariableManager};
use itertools::Itertools;
use log::{debug, info};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OnWestBank {
    pub entity: Entity,
    pub step: usize,
}

impl fmt::Display for OnWestBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.entity, self.step)
    }
}

#[derive(Debug, Clone)]
pub struct RiverCrossingEncoder {
    puzzle: Puzzle,
    num_steps: usize,
    variables: VariableManager<OnWestBank>,
    print_cnf: bool,
}

impl RiverCrossingEncoder {
    pub fn new(puzzle: Puzzle, num_steps: usize) -> EncodingResult<Self> {
        if num_steps == 0 {
            return Err(EncodingError::InvalidParameter(
                "the crossing needs at least one step".to_string(),
            ));
        }

        let mut variables = VariableManager::new();
        for step in 0..num_steps {
            for &entity in puzzle.entities() {
                variables.declare(OnWestBank { entity, step })?;
            }
        }

        Ok(Self {
            puzzle,
            num_steps,
            variables,
            print_cnf: false,
        })
    }

    /// Log the clauses of every constraint at debug level
    pub fn with_print_cnf(mut self, print_cnf: bool) -> Self {
        self.print_cnf = print_cnf;
        self
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn variables(&self) -> &VariableManager<OnWestBank> {
        &self.variables
    }

    fn west(&self, entity: Entity, step: usize) -> EncodingResult<Expr> {
        self.variables
            .lookup(&OnWestBank { entity, step })
            .map(Expr::var)
    }

    /// True when `entity` is on a different bank at `step + 1` than at `step`
    fn changes_bank(&self, entity: Entity, step: usize) -> EncodingResult<Expr> {
        Ok(self.west(entity, step)?.xor(self.west(entity, step + 1)?))
    }

    /// Everything starts on the west bank
    pub fn initial_state(&self) -> EncodingResult<Expr> {
        let facts = self
            .puzzle
            .entities()
            .iter()
            .map(|&entity| self.west(entity, 0))
            .collect::<EncodingResult<Vec<_>>>()?;
        Ok(Expr::and(facts))
    }

    /// Everything ends on the east bank
    pub fn goal_state(&self) -> EncodingResult<Expr> {
        let last = self.num_steps - 1;
        let facts = self
            .puzzle
            .entities()
            .iter()
            .map(|&entity| self.west(entity, last).map(|west| !west))
            .collect::<EncodingResult<Vec<_>>>()?;
        Ok(Expr::and(facts))
    }

    /// At most one passenger crosses between `step` and `step + 1`
    pub fn motion_constraint(&self, step: usize) -> EncodingResult<Expr> {
        let cargo: Vec<Entity> = self.puzzle.cargo().collect();
        let mut rules = Vec::new();
        for (&a, &b) in cargo.iter().tuple_combinations() {
            rules.push(!(self.changes_bank(a, step)? & self.changes_bank(b, step)?));
        }
        Ok(Expr::and(rules))
    }

    /// A passenger only crosses in the boat, next to the carrier
    pub fn carrier_constraint(&self, step: usize) -> EncodingResult<Expr> {
        let carrier = self.puzzle.carrier();
        let mut rules = Vec::new();
        for entity in self.puzzle.cargo() {
            let together = self
                .west(entity, step)?
                .iff(self.west(carrier, step)?)
                & self
                    .west(entity, step + 1)?
                    .iff(self.west(carrier, step + 1)?);
            rules.push(self.changes_bank(entity, step)?.implies(together));
        }
        Ok(Expr::and(rules))
    }

    /// No forbidden pair is left together without the carrier at `step`
    pub fn safety_constraint(&self, step: usize) -> EncodingResult<Expr> {
        let carrier = self.puzzle.carrier();
        let mut rules = Vec::new();
        for &(a, b) in self.puzzle.forbidden_pairs() {
            let same_bank = self.west(a, step)?.iff(self.west(b, step)?);
            let carrier_away = self.west(a, step)?.xor(self.west(carrier, step)?);
            rules.push(!(same_bank & carrier_away));
        }
        Ok(Expr::and(rules))
    }

    /// Every constraint of the bounded plan, labelled for logging
    pub fn constraints(&self) -> EncodingResult<Vec<(String, Expr)>> {
        let mut constraints = vec![
            ("initial".to_string(), self.initial_state()?),
            ("goal".to_string(), self.goal_state()?),
        ];
        for step in 0..self.num_steps {
            constraints.push((format!("safety@{}", step), self.safety_constraint(step)?));
        }
        for step in 0..self.num_steps - 1 {
            constraints.push((format!("motion@{}", step), self.motion_constraint(step)?));
            constraints.push((format!("carrier@{}", step), self.carrier_constraint(step)?));
        }
        Ok(constraints)
    }

    pub fn encode(&self) -> EncodingResult<Cnf> {
        let mut cnf = Cnf::with_variables(self.variables.variable_count());

        for (label, constraint) in self.constraints()? {
            let clauses = constraint.to_cnf();
            if self.print_cnf {
                for clause in &clauses {
                    debug!("{}: {}", label, clause);
                }
            }
            cnf.extend(clauses);
        }

        cnf.check_variables(self.variables.variable_count())?;
        info!(
            "River crossing over {} steps: {} clauses over {} variables",
            self.num_steps,
            cnf.len(),
            cnf.num_vars
        );
        Ok(cnf)
    }
}
