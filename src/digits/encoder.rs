//! Row-scanner classifier as a satisfiability problem
//!
//! Every row of every image is read left to right by a scanner holding a
//! small state vector. `State { col }` is the vector before pixel `col` is
//! read, so columns run `0..=width`. A single `Init` variable is the learned
//! value of every initial bit.

use super::dataset::{Dataset, Digit};
use crate::error::{EncodingError, EncodingResult};
use crate::sat::{Cnf, Expr, SatSolver, VariableManager};
use anyhow::{Context, Result};
use log::info;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitVar {
    Init,
    State {
        label: Digit,
        image: usize,
        row: usize,
        col: usize,
        bit: usize,
    },
}

impl fmt::Display for DigitVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigitVar::Init => write!(f, "init"),
            DigitVar::State {
                label,
                image,
                row,
                col,
                bit,
            } => write!(f, "v{}_{}_{}_{}^{}", label, image, row, col, bit),
        }
    }
}

/// Parameters a successful training run would report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedParameters {
    pub init_constant: bool,
}

pub struct DigitEncoder<'a> {
    dataset: &'a Dataset,
    height: usize,
    width: usize,
    state_bits: usize,
    variables: VariableManager<DigitVar>,
}

impl<'a> DigitEncoder<'a> {
    pub fn new(dataset: &'a Dataset, state_bits: usize) -> EncodingResult<Self> {
        let (height, width) = dataset.shape().ok_or_else(|| {
            EncodingError::InvalidParameter("dataset has no images".to_string())
        })?;
        if state_bits == 0 {
            return Err(EncodingError::InvalidParameter(
                "state vector needs at least one bit".to_string(),
            ));
        }

        let mut variables = VariableManager::new();
        variables.declare(DigitVar::Init)?;
        for (label, image, _) in dataset.labelled() {
            for row in 0..height {
                for col in 0..=width {
                    for bit in 0..state_bits {
                        variables.declare(DigitVar::State {
                            label,
                            image,
                            row,
                            col,
                            bit,
                        })?;
                    }
                }
            }
        }

        Ok(Self {
            dataset,
            height,
            width,
            state_bits,
            variables,
        })
    }

    pub fn variables(&self) -> &VariableManager<DigitVar> {
        &self.variables
    }

    /// `(height, width)` of the scanned images
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn state(
        &self,
        label: Digit,
        image: usize,
        row: usize,
        col: usize,
        bit: usize,
    ) -> EncodingResult<Expr> {
        self.variables
            .lookup(&DigitVar::State {
                label,
                image,
                row,
                col,
                bit,
            })
            .map(Expr::var)
    }

    /// Every initial state bit equals the learned constant
    pub fn initial_condition(&self) -> EncodingResult<Expr> {
        let init = Expr::var(self.variables.lookup(&DigitVar::Init)?);
        let mut rules = Vec::new();
        for (label, image, _) in self.dataset.labelled() {
            for row in 0..self.height {
                for bit in 0..self.state_bits {
                    rules.push(self.state(label, image, row, 0, bit)?.iff(init.clone()));
                }
            }
        }
        Ok(Expr::and(rules))
    }

    /// How the state vector changes when a pixel is read
    pub fn update_rules(&self) -> EncodingResult<Expr> {
        Err(EncodingError::NotImplemented("update rules"))
    }

    /// How the final row states select the predicted label
    pub fn final_selection(&self) -> EncodingResult<Expr> {
        Err(EncodingError::NotImplemented("final selection"))
    }

    /// Solve for parameters that classify every training image
    pub fn train(&self) -> Result<Option<LearnedParameters>> {
        let formula = Expr::and([
            self.initial_condition()?,
            self.update_rules()?,
            self.final_selection()?,
        ]);

        let mut cnf = Cnf::with_variables(self.variables.variable_count());
        cnf.extend(formula.to_cnf());
        cnf.check_variables(self.variables.variable_count())?;

        let mut solver = SatSolver::from_cnf(&cnf);
        let Some(solution) = solver.solve().context("SAT solving failed")? else {
            info!("No classifier fits all {} images", self.dataset.len());
            return Ok(None);
        };

        let init = self.variables.lookup(&DigitVar::Init)?;
        Ok(Some(LearnedParameters {
            init_constant: solution.value(init),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digits::parse_images;
    use crate::sat::BddEncoder;

    fn dataset() -> Dataset {
        let zeros = parse_images("111\n101\n111\n").unwrap();
        let ones = parse_images("010\n010\n010\n\n110\n010\n111\n").unwrap();
        Dataset::new(zeros, ones).unwrap()
    }

    #[test]
    fn test_variable_layout() {
        let data = dataset();
        let encoder = DigitEncoder::new(&data, 4).unwrap();
        // init + 3 images × 3 rows × 4 columns × 4 bits
        assert_eq!(encoder.variables().variable_count(), 1 + 3 * 3 * 4 * 4);
        assert_eq!(encoder.variables().lookup(&DigitVar::Init).unwrap(), 1);
        assert_eq!(
            encoder.variables().decode(2).unwrap().to_string(),
            "v0_0_0_0^0"
        );
    }

    #[test]
    fn test_layout_builds_a_bdd() {
        let data = dataset();
        let encoder = DigitEncoder::new(&data, 2).unwrap();
        let bdd = BddEncoder::new(encoder.variables()).unwrap();
        assert_eq!(bdd.num_vars(), encoder.variables().variable_count());

        let initial = bdd.eval(&encoder.initial_condition().unwrap()).unwrap();
        assert!(!initial.is_false());
    }

    #[test]
    fn test_initial_condition_ties_bits_to_init() {
        let data = dataset();
        let encoder = DigitEncoder::new(&data, 2).unwrap();
        let cnf = encoder.initial_condition().unwrap().to_cnf();
        // 3 images × 3 rows × 2 bits, two clauses per equivalence
        assert_eq!(cnf.len(), 2 * 3 * 3 * 2);

        let mut solver = SatSolver::new();
        solver.add_clauses(&cnf);
        let init = encoder.variables().lookup(&DigitVar::Init).unwrap();
        let first_bit = encoder
            .variables()
            .lookup(&DigitVar::State {
                label: Digit::One,
                image: 1,
                row: 2,
                col: 0,
                bit: 1,
            })
            .unwrap();

        match solver.solve_with_assumptions(&[init, -first_bit]).unwrap() {
            crate::sat::SolveOutcome::Unsatisfiable(core) => {
                assert!(!core.failed_assumptions.is_empty())
            }
            crate::sat::SolveOutcome::Satisfiable(_) => panic!("bit must follow init"),
        }
    }

    #[test]
    fn test_unresolved_stages_fail() {
        let data = dataset();
        let encoder = DigitEncoder::new(&data, 4).unwrap();
        assert_eq!(
            encoder.update_rules().unwrap_err(),
            EncodingError::NotImplemented("update rules")
        );
        assert_eq!(
            encoder.final_selection().unwrap_err(),
            EncodingError::NotImplemented("final selection")
        );

        let err = encoder.train().unwrap_err();
        assert_eq!(
            err.downcast_ref::<EncodingError>(),
            Some(&EncodingError::NotImplemented("update rules"))
        );
        assert_eq!(err.to_string(), "update rules is not implemented");
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let data = Dataset::new(vec![], vec![]).unwrap();
        assert!(DigitEncoder::new(&data, 4).is_err());
    }
}
