//! Decoding models into bank assignments per step

use super::encoder::OnWestBank;
use super::puzzle::{Bank, Entity};
use crate::error::{EncodingError, EncodingResult};
use crate::sat::VariableManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is where at one time step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub west: Vec<Entity>,
    pub east: Vec<Entity>,
}

impl StepState {
    pub fn bank_of(&self, entity: Entity) -> Option<Bank> {
        if self.west.contains(&entity) {
            Some(Bank::West)
        } else if self.east.contains(&entity) {
            Some(Bank::East)
        } else {
            None
        }
    }

}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |entities: &[Entity]| {
            entities
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "West: [{}] | East: [{}]",
            names(&self.west),
            names(&self.east)
        )
    }
}

/// A decoded plan, one state per time step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub steps: Vec<StepState>,
}

impl Interpretation {
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn bank_of(&self, entity: Entity, step: usize) -> Option<Bank> {
        self.steps.get(step).and_then(|state| state.bank_of(entity))
    }
}

/// Decode a model: positive literals put the entity on the west bank
///
/// Within a step, entities are listed in the order of `entities`. Every
/// declared variable must occur exactly once in the model, and every
/// entity must have a variable at every requested step.
pub fn interpret(
    model: &[i32],
    variables: &VariableManager<OnWestBank>,
    entities: &[Entity],
    num_steps: usize,
) -> EncodingResult<Interpretation> {
    for step in 0..num_steps {
        for &entity in entities {
            variables.lookup(&OnWestBank { entity, step })?;
        }
    }

    let mut seen = vec![false; variables.variable_count()];
    let mut placed: Vec<Vec<(usize, Entity, Bank)>> = vec![Vec::new(); num_steps];

    for &literal in model {
        let key = variables.decode(literal)?;
        let index = literal.unsigned_abs() as usize - 1;
        if seen[index] {
            return Err(EncodingError::DuplicateAssignment {
                variable: literal.abs(),
                key: key.to_string(),
            });
        }
        seen[index] = true;

        let position = entities.iter().position(|&e| e == key.entity);
        let (Some(position), Some(step)) = (position, placed.get_mut(key.step)) else {
            return Err(EncodingError::UnknownVariable {
                key: key.to_string(),
            });
        };
        step.push((position, key.entity, Bank::from_west(literal > 0)));
    }

    if let Some((variable, key)) = variables.iter().find(|(id, _)| !seen[*id as usize - 1]) {
        return Err(EncodingError::MissingAssignment {
            variable,
            key: key.to_string(),
        });
    }

    let steps = placed
        .into_iter()
        .map(|mut step| {
            step.sort_by_key(|&(position, _, _)| position);
            let mut state = StepState::default();
            for (_, entity, bank) in step {
                match bank {
                    Bank::West => state.west.push(entity),
                    Bank::East => state.east.push(entity),
                }
            }
            state
        })
        .collect();

    Ok(Interpretation { steps })
}
