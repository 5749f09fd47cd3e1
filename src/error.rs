//! Errors raised while encoding problems and decoding models

use thiserror::Error;

/// Fatal encoding/decoding failures.
///
/// These indicate a mismatch between the allocator and the code using it,
/// or a stage that has no implementation yet. Unsatisfiable formulas and
/// illegal decoded plans are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("variable {key} was already declared as {index}")]
    DuplicateVariable { key: String, index: i32 },

    #[error("no variable allocated for {key}")]
    UnknownVariable { key: String },

    #[error("literal {literal} does not reference an allocated variable")]
    UnallocatedLiteral { literal: i32 },

    #[error("variable {variable} ({key}) appears more than once in the model")]
    DuplicateAssignment { variable: i32, key: String },

    #[error("variable {variable} ({key}) has no value in the model")]
    MissingAssignment { variable: i32, key: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

pub type EncodingResult<T> = std::result::Result<T, EncodingError>;
