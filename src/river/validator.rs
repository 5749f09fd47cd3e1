//! Independent check of a decoded crossing plan

use super::interpret::Interpretation;
use super::puzzle::{Bank, Entity, Puzzle};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rule a step breaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// A forbidden pair shares a bank the carrier is not on
    UnsafePair {
        first: Entity,
        second: Entity,
        bank: Bank,
    },
    /// More than one passenger changed bank in one crossing
    MultipleCargo { moved: Vec<Entity> },
    /// A passenger crossed without the carrier crossing the same way
    CarrierMissing { entity: Entity, to: Bank },
    /// An entity is on neither bank
    Unplaced { entity: Entity },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Time step at which the broken state is reached
    pub step: usize,
    pub rule: Rule,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            Rule::UnsafePair {
                first,
                second,
                bank,
            } => write!(
                f,
                "Invalid state at step {}: {} and {} left alone on the {} bank",
                self.step, first, second, bank
            ),
            Rule::MultipleCargo { moved } => write!(
                f,
                "Invalid move at step {}: {} crossed together",
                self.step,
                moved
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Rule::CarrierMissing { entity, to } => write!(
                f,
                "Invalid move at step {}: {} crossed to the {} bank without the carrier",
                self.step, entity, to
            ),
            Rule::Unplaced { entity } => {
                write!(f, "Invalid state at step {}: {} is on no bank", self.step, entity)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub steps_checked: usize,
    pub started_west: bool,
    pub ended_east: bool,
}

impl ValidationReport {
    /// No rule is broken at any step
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Every entity is on the east bank at the last step
    pub fn reached_goal(&self) -> bool {
        self.ended_east
    }

    /// A legal plan from the starting bank to the goal
    pub fn is_solution(&self) -> bool {
        self.is_valid() && self.started_west && self.ended_east
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_violation() {
            None => write!(
                f,
                "Valid plan over {} steps (goal {})",
                self.steps_checked,
                if self.ended_east { "reached" } else { "not reached" }
            ),
            Some(first) => write!(
                f,
                "{} violation(s); first: {}",
                self.violations.len(),
                first
            ),
        }
    }
}

pub struct SolutionValidator<'a> {
    puzzle: &'a Puzzle,
}

impl<'a> SolutionValidator<'a> {
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self { puzzle }
    }

    /// Check every state and every crossing, in step order
    pub fn validate(&self, plan: &Interpretation) -> ValidationReport {
        let mut violations = Vec::new();

        for step in 0..plan.num_steps() {
            violations.extend(self.check_state(plan, step));
            if step > 0 {
                violations.extend(self.check_crossing(plan, step));
            }
        }

        let report = ValidationReport {
            steps_checked: plan.num_steps(),
            started_west: self.all_on(plan, 0, Bank::West),
            ended_east: plan
                .num_steps()
                .checked_sub(1)
                .is_some_and(|last| self.all_on(plan, last, Bank::East)),
            violations,
        };

        if let Some(first) = report.first_violation() {
            warn!("{}", first);
        }
        report
    }

    fn all_on(&self, plan: &Interpretation, step: usize, bank: Bank) -> bool {
        self.puzzle
            .entities()
            .iter()
            .all(|&entity| plan.bank_of(entity, step) == Some(bank))
    }

    fn check_state(&self, plan: &Interpretation, step: usize) -> Vec<Violation> {
        let mut violations = Vec::new();

        for &entity in self.puzzle.entities() {
            if plan.bank_of(entity, step).is_none() {
                violations.push(Violation {
                    step,
                    rule: Rule::Unplaced { entity },
                });
            }
        }

        let carrier = plan.bank_of(self.puzzle.carrier(), step);
        for &(first, second) in self.puzzle.forbidden_pairs() {
            let (Some(a), Some(b)) = (plan.bank_of(first, step), plan.bank_of(second, step)) else {
                continue;
            };
            if a == b && carrier != Some(a) {
                violations.push(Violation {
                    step,
                    rule: Rule::UnsafePair {
                        first,
                        second,
                        bank: a,
                    },
                });
            }
        }

        violations
    }

    /// The crossing from `step - 1` to `step`
    fn check_crossing(&self, plan: &Interpretation, step: usize) -> Vec<Violation> {
        let mut violations = Vec::new();

        let moved: Vec<(Entity, Bank)> = self
            .puzzle
            .cargo()
            .filter_map(|entity| {
                match (plan.bank_of(entity, step - 1), plan.bank_of(entity, step)) {
                    (Some(before), Some(after)) if before != after => Some((entity, after)),
                    _ => None,
                }
            })
            .collect();

        if moved.len() > 1 {
            violations.push(Violation {
                step,
                rule: Rule::MultipleCargo {
                    moved: moved.iter().map(|&(entity, _)| entity).collect(),
                },
            });
        }

        let carrier = self.puzzle.carrier();
        let carrier_to = match (plan.bank_of(carrier, step - 1), plan.bank_of(carrier, step)) {
            (Some(before), Some(after)) if before != after => Some(after),
            _ => None,
        };
        for (entity, to) in moved {
            if carrier_to != Some(to) {
                violations.push(Violation {
                    step,
                    rule: Rule::CarrierMissing { entity, to },
                });
            }
        }

        violations
    }
}

/// Validate `plan` against `puzzle`
pub fn validate(plan: &Interpretation, puzzle: &Puzzle) -> ValidationReport {
    SolutionValidator::new(puzzle).validate(plan)
}
