//! Shared SAT/BDD plumbing: variables, clauses, expressions and solver adapters

pub mod bdd;
pub mod clause;
pub mod expr;
pub mod solver;
pub mod variables;

pub use bdd::{BddEncoder, BddVerdict};
pub use clause::{Clause, Cnf};
pub use expr::Expr;
pub use solver::{SatSolver, SolveOutcome, SolverSolution, UnsatCore};
pub use variables::{VariableKey, VariableManager};
