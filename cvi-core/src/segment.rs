//! Shoreline segment inputs

use crate::mapper::RawValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One parameter value for one segment, as a flat row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentParameterValue {
    pub segment_id: String,
    pub parameter_id: String,
    pub raw_value: RawValue,
    /// Score already chosen by the user; takes precedence over `raw_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerability: Option<f64>,
}

/// All values of one segment, keyed by parameter id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentInput {
    pub id: String,
    /// Raw measurements, scored through ranking tables
    #[serde(default)]
    pub values: BTreeMap<String, RawValue>,
    /// Pre-ranked vulnerability scores, used as-is
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl SegmentInput {
    pub fn new(id: impl Into<String>) -> Self {
        SegmentInput {
            id: id.into(),
            ..SegmentInput::default()
        }
    }

    pub fn with_value(mut self, parameter_id: &str, value: impl Into<RawValue>) -> Self {
        self.values.insert(parameter_id.to_string(), value.into());
        self
    }

    pub fn with_score(mut self, parameter_id: &str, score: f64) -> Self {
        self.scores.insert(parameter_id.to_string(), score);
        self
    }

    pub fn has_parameter(&self, parameter_id: &str) -> bool {
        self.scores.contains_key(parameter_id) || self.values.contains_key(parameter_id)
    }
}

/// Group flat rows by segment, keeping the order segments first appear in.
/// A repeated (segment, parameter) row replaces the earlier one.
pub fn group_values<I>(rows: I) -> Vec<SegmentInput>
where
    I: IntoIterator<Item = SegmentParameterValue>,
{
    let mut segments: Vec<SegmentInput> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let position = *positions.entry(row.segment_id.clone()).or_insert_with(|| {
            segments.push(SegmentInput::new(row.segment_id.clone()));
            segments.len() - 1
        });
        let segment = &mut segments[position];
        match row.vulnerability {
            Some(score) => {
                segment.scores.insert(row.parameter_id.clone(), score);
            }
            None => {
                segment.scores.remove(&row.parameter_id);
            }
        }
        segment.values.insert(row.parameter_id, row.raw_value);
    }

    segments
}
