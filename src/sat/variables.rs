//! Variable management for SAT encoding

use crate::error::{EncodingError, EncodingResult};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A semantic fact that can be named by a SAT variable.
pub trait VariableKey: Clone + Eq + Hash + Debug + Display {}

impl<T: Clone + Eq + Hash + Debug + Display> VariableKey for T {}

/// Bijective mapping between typed keys and SAT variable IDs
///
/// IDs are handed out 1, 2, 3, ... in declaration order, so an encoder that
/// declares its keys in a fixed enumeration order can also invert the mapping
/// arithmetically.
#[derive(Debug, Clone)]
pub struct VariableManager<K: VariableKey> {
    /// Map from key to SAT variable ID (positive integer)
    variable_map: HashMap<K, i32>,
    /// Reverse table, `keys[id - 1]` is the key of `id`
    keys: Vec<K>,
}

impl<K: VariableKey> VariableManager<K> {
    pub fn new() -> Self {
        Self {
            variable_map: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Assign a fresh ID to `key`; declaring the same key twice is an error
    pub fn declare(&mut self, key: K) -> EncodingResult<i32> {
        if let Some(&index) = self.variable_map.get(&key) {
            return Err(EncodingError::DuplicateVariable {
                key: key.to_string(),
                index,
            });
        }
        Ok(self.insert(key))
    }

    /// Get or create the ID for `key`
    pub fn allocate(&mut self, key: K) -> i32 {
        match self.variable_map.get(&key) {
            Some(&id) => id,
            None => self.insert(key),
        }
    }

    /// Look up an existing ID without ever allocating
    pub fn lookup(&self, key: &K) -> EncodingResult<i32> {
        self.variable_map
            .get(key)
            .copied()
            .ok_or_else(|| EncodingError::UnknownVariable {
                key: key.to_string(),
            })
    }

    /// Recover the key behind a literal of either sign
    pub fn decode(&self, literal: i32) -> EncodingResult<&K> {
        let index = literal.unsigned_abs() as usize;
        if index == 0 {
            return Err(EncodingError::UnallocatedLiteral { literal });
        }
        self.keys
            .get(index - 1)
            .ok_or(EncodingError::UnallocatedLiteral { literal })
    }

    fn insert(&mut self, key: K) -> i32 {
        self.keys.push(key.clone());
        let id = self.keys.len() as i32;
        self.variable_map.insert(key, id);
        id
    }

    pub fn contains(&self, key: &K) -> bool {
        self.variable_map.contains_key(key)
    }

    /// Get the total number of variables created
    pub fn variable_count(&self) -> usize {
        self.keys.len()
    }

    /// Iterate `(id, key)` pairs in ID order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &K)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, key)| (i as i32 + 1, key))
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        VariableStatistics {
            total_variables: self.variable_count(),
            first_key: self.keys.first().map(|k| k.to_string()),
            last_key: self.keys.last().map(|k| k.to_string()),
        }
    }
}

impl<K: VariableKey> Default for VariableManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub first_key: Option<String>,
    pub last_key: Option<String>,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        if let (Some(first), Some(last)) = (&self.first_key, &self.last_key) {
            writeln!(f, "  Range: 1 = {}, {} = {}", first, self.total_variables, last)?;
        }
        Ok(())
    }
}
