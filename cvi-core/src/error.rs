//! Error taxonomy for the scoring core
//!
//! Lookups surface "not found" as `Option`, and validation reports its findings
//! as a value. The variants here cover the cases where a caller must stop:
//! malformed input, numeric domain violations and classification misses.

use thiserror::Error;

/// Errors produced by scoring, aggregation, classification and storage.
#[derive(Debug, Error)]
pub enum CviError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("invalid value for parameter {parameter}: {value:?}")]
    InvalidValue { parameter: String, value: String },

    #[error("domain error: {0}")]
    DomainError(String),

    #[error("score {score} is outside every classification band")]
    OutOfRange { score: f64 },

    #[error("invalid formula configuration: {0}")]
    InvalidFormulaConfig(String),

    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CviError {
    pub fn index_not_found(id: &str) -> Self {
        CviError::NotFound {
            kind: "index",
            id: id.to_string(),
        }
    }

    pub fn formula_not_found(id: &str) -> Self {
        CviError::NotFound {
            kind: "formula",
            id: id.to_string(),
        }
    }

    pub fn parameter_not_found(id: &str) -> Self {
        CviError::NotFound {
            kind: "parameter",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CviError>;
