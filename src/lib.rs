//! SAT and BDD encodings of small combinatorial puzzles
//!
//! Each puzzle owns a typed variable allocator, turns its rules into clauses
//! (or BDDs), hands them to a solver and decodes the answer back into domain
//! terms.

pub mod config;
pub mod digits;
pub mod error;
pub mod pigeonhole;
pub mod river;
pub mod sat;
pub mod sweep;
pub mod utils;
pub mod warmup;

pub use config::Settings;
pub use error::{EncodingError, EncodingResult};
pub use pigeonhole::{PigeonholeInstance, PigeonholeReport};
pub use river::{Puzzle, RiverReport};

use anyhow::Result;

/// Run the configured pigeonhole instance
pub fn solve_pigeonhole(settings: &Settings) -> Result<PigeonholeReport> {
    let config = &settings.pigeonhole;
    PigeonholeInstance::new(config.pigeons, config.encoding)?
        .solve(config.backend, config.extract_core)
}

/// Run the classic river crossing over the configured horizon
pub fn solve_river(settings: &Settings) -> Result<RiverReport> {
    river::solve(&Puzzle::classic(), &settings.river)
}
