//! Parameter-set validation against an index's rules
//!
//! Global invariants enforced:
//! - Every rule runs; failures are collected, never short-circuited
//! - Validation never errors: an unknown index is a failed report
//! - Rules are data (a tagged enum), evaluated by one dispatcher

use crate::index::IndexDefinition;
use crate::registry::IndexRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Absolute tolerance for equal-weight checks
pub const WEIGHT_TOLERANCE: f64 = 1e-3;

pub const INDEX_NOT_FOUND: &str = "Index not found";

/// Declarative validation rule owned by an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Exactly `expected` parameters must be selected
    ParameterCount { expected: usize, message: String },
    /// Each listed parameter id must be selected
    ParameterRequired {
        parameter_ids: Vec<String>,
        message: String,
    },
    /// When weights are supplied: one per parameter, each `1/expected_count`
    WeightSum {
        expected_count: usize,
        tolerance: f64,
        message: String,
    },
    /// Carried for documentation; formula compatibility is structural
    FormulaCompatibility { message: String },
}

impl ValidationRule {
    pub fn parameter_count(expected: usize, message: &str) -> Self {
        ValidationRule::ParameterCount {
            expected,
            message: message.to_string(),
        }
    }

    pub fn equal_weights(expected_count: usize, message: &str) -> Self {
        ValidationRule::WeightSum {
            expected_count,
            tolerance: WEIGHT_TOLERANCE,
            message: message.to_string(),
        }
    }

    pub fn formula_compatibility(message: &str) -> Self {
        ValidationRule::FormulaCompatibility {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRule::ParameterCount { .. } => "parameter_count",
            ValidationRule::ParameterRequired { .. } => "parameter_required",
            ValidationRule::WeightSum { .. } => "weight_sum",
            ValidationRule::FormulaCompatibility { .. } => "formula_compatibility",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationRule::ParameterCount { message, .. }
            | ValidationRule::ParameterRequired { message, .. }
            | ValidationRule::WeightSum { message, .. }
            | ValidationRule::FormulaCompatibility { message } => message,
        }
    }

    /// True when the candidate set satisfies this rule
    pub fn passes(&self, parameter_ids: &[&str], weights: Option<&BTreeMap<String, f64>>) -> bool {
        match self {
            ValidationRule::ParameterCount { expected, .. } => parameter_ids.len() == *expected,
            ValidationRule::ParameterRequired {
                parameter_ids: required,
                ..
            } => required
                .iter()
                .all(|id| parameter_ids.contains(&id.as_str())),
            ValidationRule::WeightSum {
                expected_count,
                tolerance,
                ..
            } => match weights {
                None => true,
                Some(weights) => {
                    if weights.len() != parameter_ids.len() || *expected_count == 0 {
                        return false;
                    }
                    let expected = 1.0 / *expected_count as f64;
                    weights
                        .values()
                        .all(|w| (w - expected).abs() <= *tolerance)
                }
            },
            ValidationRule::FormulaCompatibility { .. } => true,
        }
    }
}

/// Outcome of a validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Run every rule of `index` against the candidate parameter ids
pub fn validate_parameters(
    index: &IndexDefinition,
    parameter_ids: &[&str],
    weights: Option<&BTreeMap<String, f64>>,
) -> ValidationReport {
    let errors = index
        .validation_rules
        .iter()
        .filter(|rule| !rule.passes(parameter_ids, weights))
        .map(|rule| rule.message().to_string())
        .collect();
    ValidationReport::from_errors(errors)
}

/// Validate against a registered index by id
pub fn validate(
    registry: &IndexRegistry,
    index_id: &str,
    parameter_ids: &[&str],
    weights: Option<&BTreeMap<String, f64>>,
) -> ValidationReport {
    match registry.index(index_id) {
        Some(index) => validate_parameters(index, parameter_ids, weights),
        None => ValidationReport::from_errors(vec![INDEX_NOT_FOUND.to_string()]),
    }
}
