//! BDD backend built on `biodivine-lib-bdd`
//!
//! Formulas are the same [`Expr`] trees handed to the CNF path, evaluated
//! over a BDD variable set with one variable `x{id}` per allocated ID. A
//! formula is unsatisfiable exactly when its reduced BDD is the constant false.

use super::expr::Expr;
use super::variables::{VariableKey, VariableManager};
use crate::error::{EncodingError, EncodingResult};
use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet, BddVariableSetBuilder};
use std::fmt;

/// Builds BDDs over the variables of one [`VariableManager`]
pub struct BddEncoder {
    variables: BddVariableSet,
    /// `handles[id - 1]` is the BDD variable for SAT variable `id`
    handles: Vec<BddVariable>,
}

impl BddEncoder {
    /// Declare one BDD variable per allocated key, in ID order
    ///
    /// BDD variables are named `x{id}`; key names may contain any character.
    pub fn new<K: VariableKey>(manager: &VariableManager<K>) -> EncodingResult<Self> {
        // biodivine-lib-bdd reserves the top two u16 indices
        if manager.variable_count() >= u16::MAX as usize - 1 {
            return Err(EncodingError::InvalidParameter(format!(
                "{} variables exceed the BDD variable limit",
                manager.variable_count()
            )));
        }

        let mut builder = BddVariableSetBuilder::new();
        let handles = manager
            .iter()
            .map(|(id, _)| builder.make_variable(&format!("x{}", id)))
            .collect();

        Ok(Self {
            variables: builder.build(),
            handles,
        })
    }

    pub fn mk_true(&self) -> Bdd {
        self.variables.mk_true()
    }

    pub fn mk_false(&self) -> Bdd {
        self.variables.mk_false()
    }

    /// BDD of the SAT variable `id`
    pub fn var(&self, id: i32) -> EncodingResult<Bdd> {
        let handle = (id.unsigned_abs() as usize)
            .checked_sub(1)
            .and_then(|index| self.handles.get(index))
            .ok_or(EncodingError::UnallocatedLiteral { literal: id })?;
        Ok(self.variables.mk_var(*handle))
    }

    /// Evaluate an expression into a reduced BDD
    pub fn eval(&self, expr: &Expr) -> EncodingResult<Bdd> {
        Ok(match expr {
            Expr::Const(true) => self.mk_true(),
            Expr::Const(false) => self.mk_false(),
            Expr::Var(id) => self.var(*id)?,
            Expr::Not(inner) => self.eval(inner)?.not(),
            Expr::And(items) => {
                let mut result = self.mk_true();
                for item in items {
                    result = result.and(&self.eval(item)?);
                    if result.is_false() {
                        break;
                    }
                }
                result
            }
            Expr::Or(items) => {
                let mut result = self.mk_false();
                for item in items {
                    result = result.or(&self.eval(item)?);
                    if result.is_true() {
                        break;
                    }
                }
                result
            }
        })
    }

    /// Conjoin constraints one at a time, stopping once the result is false
    pub fn conjoin<'a, I>(&self, constraints: I) -> EncodingResult<Bdd>
    where
        I: IntoIterator<Item = &'a Expr>,
    {
        let mut formula = self.mk_true();
        for constraint in constraints {
            formula = formula.and(&self.eval(constraint)?);
            if formula.is_false() {
                break;
            }
        }
        Ok(formula)
    }

    pub fn num_vars(&self) -> usize {
        self.handles.len()
    }
}

/// Summary of a reduced BDD
#[derive(Debug, Clone, PartialEq)]
pub struct BddVerdict {
    pub unsatisfiable: bool,
    pub node_count: usize,
    pub satisfying_assignments: f64,
}

impl BddVerdict {
    pub fn of(bdd: &Bdd) -> Self {
        Self {
            unsatisfiable: bdd.is_false(),
            node_count: bdd.size(),
            satisfying_assignments: bdd.cardinality(),
        }
    }
}

impl fmt::Display for BddVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unsatisfiable {
            write!(f, "UNSAT (BDD reduced to false)")
        } else {
            write!(
                f,
                "SAT ({} nodes, {} satisfying assignments)",
                self.node_count, self.satisfying_assignments
            )
        }
    }
}
