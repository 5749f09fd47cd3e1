//! Pigeonhole runtime as a function of `n`

use crate::config::{Backend, PigeonholeEncoding, SweepConfig};
use crate::pigeonhole::PigeonholeInstance;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub pigeons: usize,
    pub seconds: f64,
    pub variables: usize,
    pub clauses: Option<usize>,
    pub satisfiable: bool,
}

/// `(n, seconds)` series for one encoding and backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSeries {
    pub encoding: PigeonholeEncoding,
    pub backend: Backend,
    pub points: Vec<SweepPoint>,
}

impl SweepSeries {
    pub fn total_seconds(&self) -> f64 {
        self.points.iter().map(|p| p.seconds).sum()
    }

    /// Plain `n seconds` lines for external plotting
    pub fn to_columns(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{} {:.6}\n", p.pigeons, p.seconds))
            .collect()
    }
}

pub fn run_sweep(config: &SweepConfig) -> Result<SweepSeries> {
    let mut points = Vec::new();

    for pigeons in config.min_pigeons..=config.max_pigeons {
        let instance = PigeonholeInstance::new(pigeons, config.encoding)?;
        let report = instance
            .solve(config.backend, false)
            .with_context(|| format!("Sweep failed at n = {}", pigeons))?;
        info!(
            "n = {}: {:.3}s",
            pigeons,
            report.solve_time.as_secs_f64()
        );

        points.push(SweepPoint {
            pigeons,
            seconds: report.solve_time.as_secs_f64(),
            variables: report.variables,
            clauses: report.clauses,
            satisfiable: report.satisfiable,
        });
    }

    Ok(SweepSeries {
        encoding: config.encoding,
        backend: config.backend,
        points,
    })
}
