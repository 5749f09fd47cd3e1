//! Pigeonhole principle: `n` pigeons, `n - 1` holes, always unsatisfiable

pub mod binary;
pub mod one_hot;

pub use binary::{bits_for, BinaryEncoder, BinaryVar};
pub use one_hot::{OneHotEncoder, Occupies};

use crate::config::{Backend, PigeonholeEncoding};
use crate::sat::variables::VariableStatistics;
use crate::sat::{BddEncoder, BddVerdict, Cnf, Expr, SatSolver, SolveOutcome};
use crate::utils::duration_secs;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One pigeonhole instance under a chosen encoding
#[derive(Debug, Clone)]
pub enum PigeonholeInstance {
    OneHot(OneHotEncoder),
    Binary(BinaryEncoder),
}

impl PigeonholeInstance {
    pub fn new(pigeons: usize, encoding: PigeonholeEncoding) -> Result<Self> {
        Ok(match encoding {
            PigeonholeEncoding::OneHot => PigeonholeInstance::OneHot(OneHotEncoder::new(pigeons)?),
            PigeonholeEncoding::Binary => PigeonholeInstance::Binary(BinaryEncoder::new(pigeons)?),
        })
    }

    pub fn encoding(&self) -> PigeonholeEncoding {
        match self {
            PigeonholeInstance::OneHot(_) => PigeonholeEncoding::OneHot,
            PigeonholeInstance::Binary(_) => PigeonholeEncoding::Binary,
        }
    }

    pub fn pigeons(&self) -> usize {
        match self {
            PigeonholeInstance::OneHot(encoder) => encoder.pigeons(),
            PigeonholeInstance::Binary(encoder) => encoder.pigeons(),
        }
    }

    pub fn variable_count(&self) -> usize {
        match self {
            PigeonholeInstance::OneHot(encoder) => encoder.variables().variable_count(),
            PigeonholeInstance::Binary(encoder) => encoder.variables().variable_count(),
        }
    }

    pub fn variable_statistics(&self) -> VariableStatistics {
        match self {
            PigeonholeInstance::OneHot(encoder) => encoder.variables().statistics(),
            PigeonholeInstance::Binary(encoder) => encoder.variables().statistics(),
        }
    }

    pub fn encode(&self) -> Result<Cnf> {
        Ok(match self {
            PigeonholeInstance::OneHot(encoder) => encoder.encode()?,
            PigeonholeInstance::Binary(encoder) => encoder.encode()?,
        })
    }

    fn bdd_parts(&self) -> Result<(BddEncoder, Vec<Expr>)> {
        Ok(match self {
            PigeonholeInstance::OneHot(encoder) => {
                (BddEncoder::new(encoder.variables())?, encoder.constraints()?)
            }
            PigeonholeInstance::Binary(encoder) => {
                (BddEncoder::new(encoder.variables())?, encoder.constraints()?)
            }
        })
    }

    /// Decide satisfiability with the chosen backend
    pub fn solve(&self, backend: Backend, extract_core: bool) -> Result<PigeonholeReport> {
        let start_time = Instant::now();
        let pigeons = self.pigeons();
        debug!("{}", self.variable_statistics());

        let (satisfiable, clauses, core_size, bdd_nodes) = match backend {
            Backend::Sat => {
                let cnf = self.encode().context("Failed to encode pigeonhole formula")?;
                info!(
                    "Pigeonhole n={}: {} clauses over {} variables",
                    pigeons,
                    cnf.len(),
                    cnf.num_vars
                );
                if extract_core {
                    match SatSolver::solve_with_core(&cnf)? {
                        SolveOutcome::Satisfiable(_) => (true, Some(cnf.len()), None, None),
                        SolveOutcome::Unsatisfiable(core) => (
                            false,
                            Some(cnf.len()),
                            Some(core.clause_indices.len()),
                            None,
                        ),
                    }
                } else {
                    let mut solver = SatSolver::from_cnf(&cnf);
                    let solution = solver.solve().context("SAT solving failed")?;
                    debug!("{}", solver.statistics());
                    (solution.is_some(), Some(cnf.len()), None, None)
                }
            }
            Backend::Bdd => {
                let (encoder, constraints) = self.bdd_parts()?;
                let formula = encoder.conjoin(&constraints)?;
                let verdict = BddVerdict::of(&formula);
                info!("Pigeonhole n={} via BDD: {}", pigeons, verdict);
                (!verdict.unsatisfiable, None, None, Some(verdict.node_count))
            }
        };

        Ok(PigeonholeReport {
            pigeons,
            holes: pigeons - 1,
            encoding: self.encoding(),
            backend,
            variables: self.variable_count(),
            clauses,
            satisfiable,
            core_size,
            bdd_nodes,
            solve_time: start_time.elapsed(),
        })
    }
}

/// Outcome of one pigeonhole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PigeonholeReport {
    pub pigeons: usize,
    pub holes: usize,
    pub encoding: PigeonholeEncoding,
    pub backend: Backend,
    pub variables: usize,
    pub clauses: Option<usize>,
    pub satisfiable: bool,
    pub core_size: Option<usize>,
    pub bdd_nodes: Option<usize>,
    #[serde(with = "duration_secs")]
    pub solve_time: Duration,
}

impl std::fmt::Display for PigeonholeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Pigeonhole: {} pigeons, {} holes ({:?} encoding, {:?} backend)",
            self.pigeons, self.holes, self.encoding, self.backend
        )?;
        writeln!(f, "  Variables: {}", self.variables)?;
        if let Some(clauses) = self.clauses {
            writeln!(f, "  Clauses: {}", clauses)?;
        }
        if let Some(nodes) = self.bdd_nodes {
            writeln!(f, "  BDD nodes: {}", nodes)?;
        }
        writeln!(
            f,
            "  Result: {}",
            if self.satisfiable { "SAT" } else { "UNSAT" }
        )?;
        if let Some(core) = self.core_size {
            writeln!(f, "  Unsat core: {} clauses", core)?;
        }
        writeln!(f, "  Time: {:.3}s", self.solve_time.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_encoding_and_backend_is_unsat() {
        for encoding in [PigeonholeEncoding::OneHot, PigeonholeEncoding::Binary] {
            for backend in [Backend::Sat, Backend::Bdd] {
                for n in 2..=5 {
                    let instance = PigeonholeInstance::new(n, encoding).unwrap();
                    let report = instance.solve(backend, false).unwrap();
                    assert!(
                        !report.satisfiable,
                        "{:?}/{:?} n={} reported SAT",
                        encoding, backend, n
                    );
                    assert_eq!(report.holes, n - 1);
                }
            }
        }
    }

    #[test]
    fn test_core_extraction() {
        let instance = PigeonholeInstance::new(4, PigeonholeEncoding::OneHot).unwrap();
        let report = instance.solve(Backend::Sat, true).unwrap();
        assert!(!report.satisfiable);
        let core = report.core_size.unwrap();
        assert!(core > 0 && core <= report.clauses.unwrap());
    }

    #[test]
    fn test_variable_statistics() {
        let instance = PigeonholeInstance::new(4, PigeonholeEncoding::OneHot).unwrap();
        let stats = instance.variable_statistics();
        assert_eq!(stats.total_variables, instance.variable_count());
        assert!(stats.to_string().contains("Total variables: 12"));
    }

    #[test]
    fn test_bdd_report_fields() {
        let instance = PigeonholeInstance::new(3, PigeonholeEncoding::OneHot).unwrap();
        let report = instance.solve(Backend::Bdd, false).unwrap();
        assert!(report.clauses.is_none());
        assert!(report.bdd_nodes.is_some());
        assert!(report.to_string().contains("UNSAT"));
    }

    #[test]
    fn test_report_serializes() {
        let instance = PigeonholeInstance::new(3, PigeonholeEncoding::Binary).unwrap();
        let report = instance.solve(Backend::Sat, false).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"encoding\":\"binary\""));
        assert!(json.contains("\"satisfiable\":false"));
    }
}
