//! Aggregation formulas - combine weighted per-parameter scores into one value
//!
//! Global invariants enforced:
//! - Parameters are combined in map key order, so results do not depend on insertion order
//! - Min-max normalization is per call (per segment), never across the dataset
//! - A degenerate range (max == min) normalizes every value to 0
//! - Statistics over an empty set are all zero, not an error

use crate::error::{CviError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default exponent for the nonlinear power formula
pub const DEFAULT_POWER: f64 = 2.0;
/// Accepted exponent range for the nonlinear power formula (inclusive)
pub const POWER_RANGE: (f64, f64) = (1.0, 5.0);

/// Interchangeable aggregation formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormulaKind {
    GeometricMean,
    GeometricMeanNormalized,
    ArithmeticMean,
    NonlinearPower,
}

impl FormulaKind {
    pub const ALL: [FormulaKind; 4] = [
        FormulaKind::GeometricMean,
        FormulaKind::GeometricMeanNormalized,
        FormulaKind::ArithmeticMean,
        FormulaKind::NonlinearPower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaKind::GeometricMean => "geometric-mean",
            FormulaKind::GeometricMeanNormalized => "geometric-mean-normalized",
            FormulaKind::ArithmeticMean => "arithmetic-mean",
            FormulaKind::NonlinearPower => "nonlinear-power",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        FormulaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// True for formulas whose output lies in [0, 1] regardless of the input scale
    pub fn is_normalized(&self) -> bool {
        matches!(
            self,
            FormulaKind::GeometricMeanNormalized | FormulaKind::NonlinearPower
        )
    }

    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            FormulaKind::GeometricMean | FormulaKind::GeometricMeanNormalized
        )
    }
}

/// Caller-supplied formula options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaConfig {
    /// Exponent for `nonlinear-power`, ignored by the other formulas
    pub power: f64,
    /// Min-max normalize before `geometric-mean-normalized`; when off it is the plain geometric mean
    #[serde(default = "default_normalize_values")]
    pub normalize_values: bool,
}

fn default_normalize_values() -> bool {
    true
}

impl Default for FormulaConfig {
    fn default() -> Self {
        FormulaConfig {
            power: DEFAULT_POWER,
            normalize_values: default_normalize_values(),
        }
    }
}

impl FormulaConfig {
    /// The formula actually computed once these options are applied
    pub fn effective_kind(&self, kind: FormulaKind) -> FormulaKind {
        match kind {
            FormulaKind::GeometricMeanNormalized if !self.normalize_values => {
                FormulaKind::GeometricMean
            }
            other => other,
        }
    }

    /// Check the options a formula reads, collecting every problem
    pub fn problems_for(&self, kind: FormulaKind) -> Vec<String> {
        let mut problems = Vec::new();
        if kind == FormulaKind::NonlinearPower {
            let (min, max) = POWER_RANGE;
            if !self.power.is_finite() || self.power < min {
                problems.push(format!(
                    "power must be greater than or equal to {} (got {})",
                    min, self.power
                ));
            } else if self.power > max {
                problems.push(format!(
                    "power must be less than or equal to {} (got {})",
                    max, self.power
                ));
            }
        }
        problems
    }

    pub fn check(&self, kind: FormulaKind) -> Result<()> {
        let problems = self.problems_for(kind);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CviError::InvalidFormulaConfig(problems.join("; ")))
        }
    }
}

/// Combine per-parameter scores into one composite value.
///
/// Weights are looked up by parameter id; a parameter with no weight entry
/// counts with weight 1.
pub fn aggregate(
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
    formula: FormulaKind,
    config: &FormulaConfig,
) -> Result<f64> {
    config.check(formula)?;
    let terms = weighted_terms(scores, weights)?;

    match config.effective_kind(formula) {
        FormulaKind::GeometricMean => {
            if let Some((value, _)) = terms.iter().find(|(value, _)| *value <= 0.0) {
                return Err(CviError::DomainError(format!(
                    "geometric mean requires positive scores (got {})",
                    value
                )));
            }
            Ok(weighted_geometric_mean(&terms))
        }
        FormulaKind::GeometricMeanNormalized => {
            let normalized = normalize_terms(&terms);
            Ok(weighted_geometric_mean(&normalized))
        }
        FormulaKind::ArithmeticMean => Ok(weighted_arithmetic_mean(&terms)),
        FormulaKind::NonlinearPower => {
            let powered: Vec<(f64, f64)> = normalize_terms(&terms)
                .into_iter()
                .map(|(value, weight)| (value.powf(config.power), weight))
                .collect();
            Ok(weighted_arithmetic_mean(&powered))
        }
    }
}

/// Pair each score with its weight, rejecting inputs no formula can use
fn weighted_terms(
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> Result<Vec<(f64, f64)>> {
    if scores.is_empty() {
        return Err(CviError::DomainError(
            "cannot aggregate an empty score set".to_string(),
        ));
    }

    let mut terms = Vec::with_capacity(scores.len());
    for (parameter_id, &value) in scores {
        let weight = weights.get(parameter_id).copied().unwrap_or(1.0);
        if !value.is_finite() {
            return Err(CviError::DomainError(format!(
                "score for {} is not finite ({})",
                parameter_id, value
            )));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(CviError::DomainError(format!(
                "weight for {} must be a non-negative number (got {})",
                parameter_id, weight
            )));
        }
        terms.push((value, weight));
    }

    let weight_sum: f64 = terms.iter().map(|(_, weight)| weight).sum();
    if weight_sum <= 0.0 {
        return Err(CviError::DomainError(
            "weights must not sum to zero".to_string(),
        ));
    }

    Ok(terms)
}

/// Shared value when every term carries the same score
fn uniform_value(terms: &[(f64, f64)]) -> Option<f64> {
    let (first, _) = *terms.first()?;
    terms
        .iter()
        .all(|(value, _)| *value == first)
        .then_some(first)
}

/// exp(Σ wᵢ·ln(vᵢ) / Σ wᵢ); a zero value with positive weight yields 0
fn weighted_geometric_mean(terms: &[(f64, f64)]) -> f64 {
    if let Some(value) = uniform_value(terms) {
        return value;
    }
    if terms
        .iter()
        .any(|(value, weight)| *value == 0.0 && *weight > 0.0)
    {
        return 0.0;
    }

    let weight_sum: f64 = terms.iter().map(|(_, weight)| weight).sum();
    let log_sum: f64 = terms
        .iter()
        .filter(|(_, weight)| *weight > 0.0)
        .map(|(value, weight)| weight * value.ln())
        .sum();
    (log_sum / weight_sum).exp()
}

/// Σ wᵢ·vᵢ / Σ wᵢ
fn weighted_arithmetic_mean(terms: &[(f64, f64)]) -> f64 {
    if let Some(value) = uniform_value(terms) {
        return value;
    }
    let weight_sum: f64 = terms.iter().map(|(_, weight)| weight).sum();
    let weighted: f64 = terms.iter().map(|(value, weight)| value * weight).sum();
    weighted / weight_sum
}

/// Min-max normalize the values of one aggregation call into [0, 1]
fn normalize_terms(terms: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let min = terms
        .iter()
        .map(|(value, _)| *value)
        .fold(f64::INFINITY, f64::min);
    let max = terms
        .iter()
        .map(|(value, _)| *value)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    terms
        .iter()
        .map(|(value, weight)| {
            let normalized = if range == 0.0 {
                0.0
            } else {
                (value - min) / range
            };
            (normalized, *weight)
        })
        .collect()
}

/// Summary statistics over composite scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation; absent for an empty set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<f64>,
}

impl Statistics {
    fn zero() -> Self {
        Statistics {
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            standard_deviation: None,
        }
    }
}

/// Compute mean, median, min, max and population standard deviation
pub fn compute_statistics(scores: &[f64]) -> Statistics {
    if scores.is_empty() {
        return Statistics::zero();
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / count;
    let middle = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    };
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

    Statistics {
        mean,
        median,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        standard_deviation: Some(variance.sqrt()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_geometric_mean_of_equal_values_is_exact() {
        let scores = map(&[("a", 3.0), ("b", 3.0), ("c", 3.0)]);
        let weights = map(&[("a", 0.2), ("b", 0.5), ("c", 0.3)]);
        let result = aggregate(
            &scores,
            &weights,
            FormulaKind::GeometricMean,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert_eq!(result, 3.0);
    }

    #[test]
    fn test_weighted_geometric_mean() {
        // 4^(1/4) * 16^(3/4) = 2^(1/2) * 2^3 = 8 * sqrt(2)
        let scores = map(&[("a", 4.0), ("b", 16.0)]);
        let weights = map(&[("a", 1.0), ("b", 3.0)]);
        let result = aggregate(
            &scores,
            &weights,
            FormulaKind::GeometricMean,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert!(approx(result, 8.0 * 2f64.sqrt()));
    }

    #[test]
    fn test_geometric_mean_rejects_non_positive() {
        let scores = map(&[("a", 0.0), ("b", 2.0)]);
        let err = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMean,
            &FormulaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CviError::DomainError(_)));

        let scores = map(&[("a", -1.0), ("b", 2.0)]);
        assert!(aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMean,
            &FormulaConfig::default(),
        )
        .is_err());
    }

    #[test]
    fn test_arithmetic_mean_is_invariant_under_weight_scaling() {
        let scores = map(&[("a", 1.0), ("b", 4.0), ("c", 5.0)]);
        let weights = map(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let scaled = map(&[("a", 7.5), ("b", 15.0), ("c", 22.5)]);

        let base = aggregate(
            &scores,
            &weights,
            FormulaKind::ArithmeticMean,
            &FormulaConfig::default(),
        )
        .unwrap();
        let rescaled = aggregate(
            &scores,
            &scaled,
            FormulaKind::ArithmeticMean,
            &FormulaConfig::default(),
        )
        .unwrap();

        assert!(approx(base, (1.0 + 8.0 + 15.0) / 6.0));
        assert!(approx(base, rescaled));
    }

    #[test]
    fn test_missing_weight_counts_as_one() {
        let scores = map(&[("a", 2.0), ("b", 4.0)]);
        let weights = map(&[("a", 1.0)]);
        let result = aggregate(
            &scores,
            &weights,
            FormulaKind::ArithmeticMean,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert!(approx(result, 3.0));
    }

    #[test]
    fn test_zero_weight_sum_is_domain_error() {
        let scores = map(&[("a", 2.0), ("b", 4.0)]);
        let weights = map(&[("a", 0.0), ("b", 0.0)]);
        let err = aggregate(
            &scores,
            &weights,
            FormulaKind::ArithmeticMean,
            &FormulaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CviError::DomainError(_)));
    }

    #[test]
    fn test_empty_scores_is_domain_error() {
        let err = aggregate(
            &BTreeMap::new(),
            &BTreeMap::new(),
            FormulaKind::ArithmeticMean,
            &FormulaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CviError::DomainError(_)));
    }

    #[test]
    fn test_normalized_geometric_mean_degenerate_range_is_zero() {
        let scores = map(&[("a", 3.0), ("b", 3.0), ("c", 3.0)]);
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMeanNormalized,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_normalized_geometric_mean_with_minimum_is_zero() {
        // The minimum normalizes to 0, which zeroes the weighted product
        let scores = map(&[("a", 1.0), ("b", 3.0), ("c", 5.0)]);
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMeanNormalized,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_normalized_geometric_mean_ignores_zero_weight_minimum() {
        // a normalizes to 0 but carries no weight; b -> 0.5, c -> 1.0
        let scores = map(&[("a", 1.0), ("b", 3.0), ("c", 5.0)]);
        let weights = map(&[("a", 0.0), ("b", 1.0), ("c", 1.0)]);
        let result = aggregate(
            &scores,
            &weights,
            FormulaKind::GeometricMeanNormalized,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert!(approx(result, 0.5f64.sqrt()));
    }

    #[test]
    fn test_nonlinear_power_default_square() {
        // normalized: 0, 0.5, 1 -> squared: 0, 0.25, 1 -> mean 1.25 / 3
        let scores = map(&[("a", 1.0), ("b", 3.0), ("c", 5.0)]);
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::NonlinearPower,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert!(approx(result, 1.25 / 3.0));
    }

    #[test]
    fn test_nonlinear_power_custom_exponent() {
        let scores = map(&[("a", 1.0), ("b", 3.0), ("c", 5.0)]);
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::NonlinearPower,
            &FormulaConfig {
                power: 3.0,
                ..FormulaConfig::default()
            },
        )
        .unwrap();
        assert!(approx(result, 1.125 / 3.0));
    }

    #[test]
    fn test_nonlinear_power_degenerate_range_is_zero() {
        let scores = map(&[("a", 2.0), ("b", 2.0)]);
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::NonlinearPower,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_power_outside_range_is_rejected() {
        let scores = map(&[("a", 1.0), ("b", 2.0)]);
        for power in [0.5, 5.5, f64::NAN] {
            let err = aggregate(
                &scores,
                &BTreeMap::new(),
                FormulaKind::NonlinearPower,
                &FormulaConfig {
                    power,
                    ..FormulaConfig::default()
                },
            )
            .unwrap_err();
            assert!(matches!(err, CviError::InvalidFormulaConfig(_)));
        }
        // Bounds are inclusive
        assert!(FormulaConfig {
            power: 1.0,
            ..FormulaConfig::default()
        }
            .check(FormulaKind::NonlinearPower)
            .is_ok());
        assert!(FormulaConfig {
            power: 5.0,
            ..FormulaConfig::default()
        }
            .check(FormulaKind::NonlinearPower)
            .is_ok());
        // Other formulas ignore the exponent
        assert!(FormulaConfig {
            power: 9.0,
            ..FormulaConfig::default()
        }
            .check(FormulaKind::ArithmeticMean)
            .is_ok());
    }

    #[test]
    fn test_normalized_geometric_mean_without_normalization() {
        let scores = map(&[("a", 4.0), ("b", 16.0)]);
        let raw = FormulaConfig {
            normalize_values: false,
            ..FormulaConfig::default()
        };
        assert_eq!(
            raw.effective_kind(FormulaKind::GeometricMeanNormalized),
            FormulaKind::GeometricMean
        );
        let result = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMeanNormalized,
            &raw,
        )
        .unwrap();
        assert!(approx(result, 8.0));

        // Normalized by default: 4 -> 0, so the product collapses to 0
        let normalized = aggregate(
            &scores,
            &BTreeMap::new(),
            FormulaKind::GeometricMeanNormalized,
            &FormulaConfig::default(),
        )
        .unwrap();
        assert_eq!(normalized, 0.0);
    }

    #[test]
    fn test_statistics_empty_is_zero() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.standard_deviation, None);
    }

    #[test]
    fn test_statistics_even_count() {
        let stats = compute_statistics(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        // population variance = 1.25
        assert!(approx(stats.standard_deviation.unwrap(), 1.25f64.sqrt()));
    }

    #[test]
    fn test_statistics_odd_count() {
        let stats = compute_statistics(&[5.0, 1.0, 3.0]);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.mean, 3.0);
    }

    #[test]
    fn test_formula_kind_parse() {
        assert_eq!(
            FormulaKind::parse("geometric-mean"),
            Some(FormulaKind::GeometricMean)
        );
        assert_eq!(
            FormulaKind::parse(" Nonlinear-Power "),
            Some(FormulaKind::NonlinearPower)
        );
        assert_eq!(FormulaKind::parse("median"), None);
    }
}
