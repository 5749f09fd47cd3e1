//! Boolean expressions and their normalization into CNF
//!
//! Constraints are easier to state as formulas (`a ⊕ b`, `a → b ∧ c`) than
//! as clause lists. An [`Expr`] is built over allocated variable IDs and then
//! normalized: negations are pushed to the literals, disjunctions are
//! distributed over conjunctions, and the resulting clauses are simplified.
//! Simplification only removes tautologies, duplicate literals, duplicate
//! clauses and subsumed clauses, all of which preserve equivalence.

use super::clause::Clause;
use std::collections::HashSet;
use std::ops::{BitAnd, BitOr, Not};

/// Boolean expression over SAT variable IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(bool),
    /// Positive variable ID
    Var(i32),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn var(id: i32) -> Self {
        debug_assert!(id > 0, "variable IDs are positive");
        Expr::Var(id)
    }

    /// Expression for a signed literal
    pub fn literal(lit: i32) -> Self {
        if lit < 0 {
            !Expr::var(-lit)
        } else {
            Expr::var(lit)
        }
    }

    pub fn and<I: IntoIterator<Item = Expr>>(items: I) -> Self {
        Expr::And(items.into_iter().collect())
    }

    pub fn or<I: IntoIterator<Item = Expr>>(items: I) -> Self {
        Expr::Or(items.into_iter().collect())
    }

    pub fn implies(self, other: Expr) -> Self {
        Expr::Or(vec![!self, other])
    }

    pub fn iff(self, other: Expr) -> Self {
        Expr::And(vec![
            self.clone().implies(other.clone()),
            other.implies(self),
        ])
    }

    pub fn xor(self, other: Expr) -> Self {
        !self.iff(other)
    }

    /// Evaluate with a lookup from variable ID to value
    pub fn eval<F: Fn(i32) -> bool + Copy>(&self, value: F) -> bool {
        match self {
            Expr::Const(b) => *b,
            Expr::Var(id) => value(*id),
            Expr::Not(inner) => !inner.eval(value),
            Expr::And(items) => items.iter().all(|e| e.eval(value)),
            Expr::Or(items) => items.iter().any(|e| e.eval(value)),
        }
    }

    /// Collect every variable ID occurring in the expression
    pub fn variables(&self) -> HashSet<i32> {
        let mut vars = HashSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut HashSet<i32>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(id) => {
                vars.insert(*id);
            }
            Expr::Not(inner) => inner.collect_variables(vars),
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.collect_variables(vars);
                }
            }
        }
    }

    /// Normalize into an equivalent list of clauses
    ///
    /// An empty result means the expression is valid; a result containing
    /// an empty clause means it is unsatisfiable.
    pub fn to_cnf(&self) -> Vec<Clause> {
        let clauses = ClauseSet::from_nnf(&self.to_nnf(false));
        clauses
            .remove_subsumed()
            .into_iter()
            .map(Clause::new)
            .collect()
    }

    /// Push negations down to the variables
    fn to_nnf(&self, negated: bool) -> Nnf {
        match self {
            Expr::Const(b) => Nnf::Const(*b != negated),
            Expr::Var(id) => Nnf::Lit(if negated { -id } else { *id }),
            Expr::Not(inner) => inner.to_nnf(!negated),
            Expr::And(items) => {
                let items = items.iter().map(|e| e.to_nnf(negated)).collect();
                if negated {
                    Nnf::Or(items)
                } else {
                    Nnf::And(items)
                }
            }
            Expr::Or(items) => {
                let items = items.iter().map(|e| e.to_nnf(negated)).collect();
                if negated {
                    Nnf::And(items)
                } else {
                    Nnf::Or(items)
                }
            }
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        match self {
            Expr::Const(b) => Expr::Const(!b),
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut items) => {
                items.push(other);
                Expr::And(items)
            }
            first => Expr::And(vec![first, other]),
        }
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut items) => {
                items.push(other);
                Expr::Or(items)
            }
            first => Expr::Or(vec![first, other]),
        }
    }
}

/// Negation normal form
enum Nnf {
    Const(bool),
    Lit(i32),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

/// Clauses kept sorted, deduplicated and free of tautologies
struct ClauseSet {
    clauses: Vec<Vec<i32>>,
    seen: HashSet<Vec<i32>>,
}

impl ClauseSet {
    fn valid() -> Self {
        ClauseSet {
            clauses: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn unsatisfiable() -> Self {
        let mut set = Self::valid();
        set.insert(Vec::new());
        set
    }

    fn insert(&mut self, clause: Vec<i32>) {
        if self.seen.insert(clause.clone()) {
            self.clauses.push(clause);
        }
    }

    fn from_nnf(nnf: &Nnf) -> Self {
        match nnf {
            Nnf::Const(true) => Self::valid(),
            Nnf::Const(false) => Self::unsatisfiable(),
            Nnf::Lit(lit) => {
                let mut set = Self::valid();
                set.insert(vec![*lit]);
                set
            }
            Nnf::And(items) => {
                let mut result = Self::valid();
                for item in items {
                    for clause in Self::from_nnf(item).clauses {
                        result.insert(clause);
                    }
                }
                result
            }
            Nnf::Or(items) => {
                let mut result = Self::unsatisfiable();
                for item in items {
                    result = result.distribute(&Self::from_nnf(item));
                }
                result
            }
        }
    }

    /// (A1 ∧ A2 ...) ∨ (B1 ∧ B2 ...) = ∧ (Ai ∨ Bj)
    fn distribute(&self, other: &ClauseSet) -> ClauseSet {
        let mut result = Self::valid();
        for left in &self.clauses {
            for right in &other.clauses {
                if let Some(clause) = merge(left, right) {
                    result.insert(clause);
                }
            }
        }
        result
    }

    /// Drop clauses that contain a strictly shorter clause
    ///
    /// Clauses are duplicate-free, so only a shorter clause can subsume.
    fn remove_subsumed(self) -> Vec<Vec<i32>> {
        let clauses = self.clauses;
        let mut by_length: Vec<&Vec<i32>> = clauses.iter().collect();
        by_length.sort_by_key(|clause| clause.len());

        clauses
            .iter()
            .filter(|clause| {
                !by_length
                    .iter()
                    .take_while(|other| other.len() < clause.len())
                    .any(|other| other.iter().all(|lit| clause.contains(lit)))
            })
            .cloned()
            .collect()
    }
}

/// Union of two sorted clauses, `None` when the union is a tautology
fn merge(left: &[i32], right: &[i32]) -> Option<Vec<i32>> {
    let mut clause: Vec<i32> = left.iter().chain(right).copied().collect();
    clause.sort_by_key(|lit| (lit.abs(), *lit));
    clause.dedup();
    if clause.windows(2).any(|pair| pair[0] == -pair[1]) {
        None
    } else {
        Some(clause)
    }
}
