//! Batch scoring: registry lookup, validation, per-segment scoring and
//! aggregation, statistics and classification
//!
//! Global invariants enforced:
//! - Segments are independent; they are scored in parallel
//! - Output order equals input order
//! - Statistics run only after every segment is scored
//! - Segments missing a required value are skipped and reported, not guessed
//! - Scores outside every class band are reported as unclassified, the rest still score
//! - Malformed values and domain violations abort the run

use crate::aggregation::{compute_statistics, FormulaConfig, FormulaKind, Statistics};
use crate::classification::classify;
use crate::composite::aggregate_index;
use crate::error::{CviError, Result};
use crate::index::{FormulaDescriptor, IndexDefinition};
use crate::mapper::score_for;
use crate::registry::IndexRegistry;
use crate::segment::SegmentInput;
use crate::validation::validate_parameters;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Largest supported number of decimal places for rounding
pub const MAX_ROUND_TO: u32 = 6;

/// Options for one scoring run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub formula_config: FormulaConfig,
    /// Per-parameter weight overrides; parameters not listed keep their own weight
    pub weights: Option<BTreeMap<String, f64>>,
    /// Round reported scores to this many decimal places
    pub round_to: Option<u32>,
}

/// Score of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub segment_id: String,
    pub score: f64,
    pub per_parameter_scores: BTreeMap<String, f64>,
    /// Sub-index values for composite indices
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, f64>,
    pub class_label: String,
    pub class_color: String,
}

/// A segment left out of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSegment {
    pub segment_id: String,
    pub missing: Vec<String>,
}

/// A segment whose composite score fell outside every class band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnclassifiedSegment {
    pub segment_id: String,
    pub score: f64,
}

/// Outcome of a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub index_id: String,
    pub formula_id: String,
    pub formula: FormulaKind,
    pub results: Vec<CompositeResult>,
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSegment>,
    /// Scored but not classifiable; left out of `results` and `statistics`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unclassified: Vec<UnclassifiedSegment>,
}

enum Outcome {
    Scored(CompositeResult),
    Skipped(SkippedSegment),
    Unclassified(UnclassifiedSegment),
}

/// Runs the full scoring flow against a registry
pub struct ScoringEngine<'r> {
    registry: &'r IndexRegistry,
}

impl<'r> ScoringEngine<'r> {
    pub fn new(registry: &'r IndexRegistry) -> Self {
        ScoringEngine { registry }
    }

    /// Score every segment for `index_id`. `formula_id` defaults to the index's default formula.
    pub fn run(
        &self,
        index_id: &str,
        formula_id: Option<&str>,
        segments: &[SegmentInput],
        options: &RunOptions,
    ) -> Result<RunReport> {
        let index = self
            .registry
            .index(index_id)
            .ok_or_else(|| CviError::index_not_found(index_id))?;
        let formula = resolve_formula(index, formula_id)?;
        options.formula_config.check(formula.kind)?;
        if let Some(places) = options.round_to {
            if places > MAX_ROUND_TO {
                return Err(CviError::InvalidFormulaConfig(format!(
                    "round_to must be at most {} (got {})",
                    MAX_ROUND_TO, places
                )));
            }
        }

        let weights = effective_weights(index, options.weights.as_ref())?;
        let parameter_ids = index.parameter_ids();
        let report = validate_parameters(
            index,
            &parameter_ids,
            options.weights.as_ref().map(|_| &weights),
        );
        if !report.valid {
            return Err(CviError::ValidationFailed(report.errors));
        }

        let outcomes: Vec<Outcome> = segments
            .par_iter()
            .map(|segment| score_segment(index, formula, &weights, segment, options))
            .collect::<Result<Vec<_>>>()?;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        let mut unclassified = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(result) => results.push(result),
                Outcome::Skipped(segment) => {
                    warn!(
                        segment = %segment.segment_id,
                        missing = ?segment.missing,
                        "skipping segment with missing parameters"
                    );
                    skipped.push(segment);
                }
                Outcome::Unclassified(segment) => {
                    warn!(
                        segment = %segment.segment_id,
                        score = segment.score,
                        "score outside every class band"
                    );
                    unclassified.push(segment);
                }
            }
        }

        let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
        let mut statistics = compute_statistics(&scores);
        if let Some(places) = options.round_to {
            round_statistics(&mut statistics, places);
            for result in &mut results {
                round_result(result, places);
            }
            for segment in &mut unclassified {
                segment.score = round(segment.score, places);
            }
        }

        debug!(
            index = %index.id,
            formula = %formula.id,
            scored = results.len(),
            skipped = skipped.len(),
            unclassified = unclassified.len(),
            mean = statistics.mean,
            "scoring run complete"
        );

        Ok(RunReport {
            index_id: index.id.clone(),
            formula_id: formula.id.clone(),
            formula: formula.kind,
            results,
            statistics,
            skipped,
            unclassified,
        })
    }
}

fn resolve_formula<'a>(
    index: &'a IndexDefinition,
    formula_id: Option<&str>,
) -> Result<&'a FormulaDescriptor> {
    let id = formula_id.unwrap_or(&index.default_formula_id);
    index
        .formula(id)
        .ok_or_else(|| CviError::formula_not_found(id))
}

/// Parameter weights with overrides applied; overrides must name known parameters
fn effective_weights(
    index: &IndexDefinition,
    overrides: Option<&BTreeMap<String, f64>>,
) -> Result<BTreeMap<String, f64>> {
    let mut weights: BTreeMap<String, f64> = index
        .required_parameters
        .iter()
        .map(|p| (p.id.clone(), p.weight))
        .collect();
    if let Some(overrides) = overrides {
        for (id, weight) in overrides {
            match weights.get_mut(id) {
                Some(slot) => *slot = *weight,
                None => return Err(CviError::parameter_not_found(id)),
            }
        }
    }
    Ok(weights)
}

fn score_segment(
    index: &IndexDefinition,
    formula: &FormulaDescriptor,
    weights: &BTreeMap<String, f64>,
    segment: &SegmentInput,
    options: &RunOptions,
) -> Result<Outcome> {
    let missing: Vec<String> = index
        .required_parameters
        .iter()
        .filter(|p| p.required && !segment.has_parameter(&p.id))
        .map(|p| p.id.clone())
        .collect();
    if !missing.is_empty() {
        return Ok(Outcome::Skipped(SkippedSegment {
            segment_id: segment.id.clone(),
            missing,
        }));
    }

    let mut per_parameter_scores = BTreeMap::new();
    for parameter in &index.required_parameters {
        let score = match (
            segment.scores.get(&parameter.id),
            segment.values.get(&parameter.id),
        ) {
            (Some(score), _) => *score,
            (None, Some(value)) => score_for(parameter, value)?,
            (None, None) => continue,
        };
        per_parameter_scores.insert(parameter.id.clone(), score);
    }

    let composite = aggregate_index(
        index,
        &per_parameter_scores,
        weights,
        formula.kind,
        &options.formula_config,
    )?;
    let band = match classify(
        composite.score,
        index
            .result_classification
            .ranges_for(options.formula_config.effective_kind(formula.kind)),
    ) {
        Ok(band) => band,
        Err(CviError::OutOfRange { score }) => {
            return Ok(Outcome::Unclassified(UnclassifiedSegment {
                segment_id: segment.id.clone(),
                score,
            }))
        }
        Err(e) => return Err(e),
    };

    Ok(Outcome::Scored(CompositeResult {
        segment_id: segment.id.clone(),
        score: composite.score,
        per_parameter_scores,
        components: composite.components,
        class_label: band.label.clone(),
        class_color: band.color.clone(),
    }))
}

fn round(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn round_result(result: &mut CompositeResult, places: u32) {
    result.score = round(result.score, places);
    for value in result.components.values_mut() {
        *value = round(*value, places);
    }
}

fn round_statistics(statistics: &mut Statistics, places: u32) {
    statistics.mean = round(statistics.mean, places);
    statistics.median = round(statistics.median, places);
    statistics.min = round(statistics.min, places);
    statistics.max = round(statistics.max, places);
    statistics.standard_deviation = statistics.standard_deviation.map(|sd| round(sd, places));
}
