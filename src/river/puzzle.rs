//! Entities, banks and the puzzle definition

use crate::error::{EncodingError, EncodingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entity {
    Goat,
    Wolf,
    Cabbage,
    Carrier,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Goat => "Goat",
            Entity::Wolf => "Wolf",
            Entity::Cabbage => "Cabbage",
            Entity::Carrier => "Carrier",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bank {
    West,
    East,
}

impl Bank {
    /// Bank encoded by the truth value of an `OnWestBank` variable
    pub fn from_west(is_west: bool) -> Self {
        if is_west {
            Bank::West
        } else {
            Bank::East
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::West => write!(f, "west"),
            Bank::East => write!(f, "east"),
        }
    }
}

/// A river crossing puzzle: who travels, who rows, who can't be left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    entities: Vec<Entity>,
    carrier: Entity,
    forbidden_pairs: Vec<(Entity, Entity)>,
}

impl Puzzle {
    pub fn new(
        entities: Vec<Entity>,
        carrier: Entity,
        forbidden_pairs: Vec<(Entity, Entity)>,
    ) -> EncodingResult<Self> {
        for (i, entity) in entities.iter().enumerate() {
            if entities[..i].contains(entity) {
                return Err(EncodingError::InvalidParameter(format!(
                    "entity {} listed twice",
                    entity
                )));
            }
        }
        if !entities.contains(&carrier) {
            return Err(EncodingError::InvalidParameter(format!(
                "carrier {} is not one of the entities",
                carrier
            )));
        }
        for &(first, second) in &forbidden_pairs {
            if first == second || first == carrier || second == carrier {
                return Err(EncodingError::InvalidParameter(format!(
                    "forbidden pair ({}, {}) must name two distinct non-carrier entities",
                    first, second
                )));
            }
            if !entities.contains(&first) || !entities.contains(&second) {
                return Err(EncodingError::InvalidParameter(format!(
                    "forbidden pair ({}, {}) names an unknown entity",
                    first, second
                )));
            }
        }

        Ok(Self {
            entities,
            carrier,
            forbidden_pairs,
        })
    }

    /// Goat, wolf and cabbage, ferried by the carrier
    pub fn classic() -> Self {
        Self {
            entities: vec![Entity::Goat, Entity::Wolf, Entity::Cabbage, Entity::Carrier],
            carrier: Entity::Carrier,
            forbidden_pairs: vec![(Entity::Goat, Entity::Wolf), (Entity::Goat, Entity::Cabbage)],
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn carrier(&self) -> Entity {
        self.carrier
    }

    pub fn forbidden_pairs(&self) -> &[(Entity, Entity)] {
        &self.forbidden_pairs
    }

    /// Everything except the carrier
    pub fn cargo(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .copied()
            .filter(move |&entity| entity != self.carrier)
    }

    pub fn position(&self, entity: Entity) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::classic()
    }
}
