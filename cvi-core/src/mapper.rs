//! Raw value to vulnerability score via a parameter's ranking table
//!
//! Categorical resolution order: exact key, exact criteria, substring of
//! criteria (table order), then the first entry. Numerical values take the
//! lowest-scoring entry whose bounds contain them, so a value on a shared
//! edge belongs to the lower-vulnerability bucket.

use crate::error::{CviError, Result};
use crate::parameter::{Parameter, ParameterKind};
use crate::ranking::RankingEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A measured or selected value as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Score a raw value against the parameter's ranking table
pub fn score_for(parameter: &Parameter, value: &RawValue) -> Result<f64> {
    let entry = match parameter.kind {
        ParameterKind::Categorical => categorical_entry(parameter, value),
        ParameterKind::Numerical => numerical_entry(parameter, value)?,
    };
    entry.map(|e| e.score).ok_or_else(|| CviError::InvalidValue {
        parameter: parameter.id.clone(),
        value: value.to_string(),
    })
}

fn categorical_entry<'a>(parameter: &'a Parameter, value: &RawValue) -> Option<&'a RankingEntry> {
    let table = &parameter.ranking_table;
    let needle = value.to_string().trim().to_lowercase();

    if !needle.is_empty() {
        let by_key = table.iter().find(|e| {
            e.key
                .as_deref()
                .is_some_and(|key| key.eq_ignore_ascii_case(&needle))
        });
        let by_criteria = || table.iter().find(|e| e.criteria.to_lowercase() == needle);
        let by_substring = || {
            table
                .iter()
                .find(|e| e.criteria.to_lowercase().contains(&needle))
        };
        if let Some(entry) = by_key.or_else(by_criteria).or_else(by_substring) {
            return Some(entry);
        }
    }

    table.first()
}

fn numerical_entry<'a>(
    parameter: &'a Parameter,
    value: &RawValue,
) -> Result<Option<&'a RankingEntry>> {
    let number = value
        .as_number()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CviError::InvalidValue {
            parameter: parameter.id.clone(),
            value: value.to_string(),
        })?;

    let mut ordered: Vec<&RankingEntry> = parameter.ranking_table.iter().collect();
    ordered.sort_by(|a, b| a.score.total_cmp(&b.score));

    let bounded = ordered.iter().filter(|e| e.bounds.is_some()).count();
    if bounded > 0 && bounded < ordered.len() {
        warn!(
            parameter = %parameter.id,
            bounded,
            entries = ordered.len(),
            "ranking table mixes bounded and unbounded entries; using score thresholds"
        );
    }

    let matched = if bounded == ordered.len() {
        ordered
            .iter()
            .find(|e| e.bounds.is_some_and(|b| b.contains(number)))
    } else {
        // Tables without explicit bounds use the score as an upper threshold
        ordered.iter().find(|e| number <= e.score)
    };

    Ok(matched.or(ordered.last()).copied())
}
