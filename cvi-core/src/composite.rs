//! Composite indices: score each sub-index, then average the sub-index values
//!
//! ICVI = (EVI + SVI) / 2, where EVI and SVI use the selected formula over
//! their own parameters.

use crate::aggregation::{aggregate, FormulaConfig, FormulaKind};
use crate::error::{CviError, Result};
use crate::index::IndexDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index score plus the value of each sub-index that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    /// Sub-index id to value; empty for indices without sub-indices
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, f64>,
}

/// Aggregate one segment's scores for `index`, honoring its sub-indices
pub fn aggregate_index(
    index: &IndexDefinition,
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
    formula: FormulaKind,
    config: &FormulaConfig,
) -> Result<CompositeScore> {
    if !index.is_composite() {
        return Ok(CompositeScore {
            score: aggregate(scores, weights, formula, config)?,
            components: BTreeMap::new(),
        });
    }

    let mut components = BTreeMap::new();
    for sub_index in &index.sub_indices {
        let subset: BTreeMap<String, f64> = sub_index
            .parameter_ids
            .iter()
            .filter_map(|id| scores.get(id).map(|score| (id.clone(), *score)))
            .collect();
        if subset.is_empty() {
            return Err(CviError::DomainError(format!(
                "sub-index {} has no scored parameters",
                sub_index.id
            )));
        }
        let value = aggregate(&subset, weights, formula, config)?;
        components.insert(sub_index.id.clone(), value);
    }

    let score = components.values().sum::<f64>() / components.len() as f64;
    Ok(CompositeScore { score, components })
}
