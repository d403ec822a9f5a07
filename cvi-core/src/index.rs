//! Index definitions: parameters, rules, formulas and result bands of one index

use crate::aggregation::FormulaKind;
use crate::parameter::Parameter;
use crate::ranking::VulnerabilityLevel;
use crate::validation::ValidationRule;
use serde::{Deserialize, Serialize};

/// Whether an index is computed directly or from sub-indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexKind {
    TrueIndex,
    CompositeIndex,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::TrueIndex => "true-index",
            IndexKind::CompositeIndex => "composite-index",
        }
    }
}

/// One result band: `[min, max)`, the last band of a set closes at `max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBand {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub color: String,
}

impl ClassBand {
    pub fn new(min: f64, max: f64, level: VulnerabilityLevel) -> Self {
        ClassBand {
            min,
            max,
            label: level.label().to_string(),
            color: level.color().to_string(),
        }
    }
}

/// Build five bands, one per vulnerability level, from six ascending edges
pub fn five_bands(edges: [f64; 6]) -> Vec<ClassBand> {
    VulnerabilityLevel::ALL
        .iter()
        .enumerate()
        .map(|(i, level)| ClassBand::new(edges[i], edges[i + 1], *level))
        .collect()
}

/// Band sets keyed by the output scale of the formula that produced a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultClassification {
    /// Bands on the index's own score scale
    pub absolute: Vec<ClassBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometric: Option<Vec<ClassBand>>,
    /// Bands on the unit interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Vec<ClassBand>>,
}

impl ResultClassification {
    /// Band set matching a formula's output scale, falling back to absolute
    pub fn ranges_for(&self, kind: FormulaKind) -> &[ClassBand] {
        let preferred = if kind.is_normalized() {
            self.normalized.as_deref()
        } else if kind.is_geometric() {
            self.geometric.as_deref()
        } else {
            None
        };
        preferred.unwrap_or(&self.absolute)
    }
}

/// A named aggregation formula an index exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: FormulaKind,
}

impl FormulaDescriptor {
    pub fn new(id: &str, name: &str, description: &str, kind: FormulaKind) -> Self {
        FormulaDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
        }
    }
}

/// Parameter group scored on its own inside a composite index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubIndex {
    pub id: String,
    pub name: String,
    pub parameter_ids: Vec<String>,
}

/// A standardized vulnerability index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub citation: String,
    pub kind: IndexKind,
    pub default_formula_id: String,
    pub required_parameters: Vec<Parameter>,
    pub validation_rules: Vec<ValidationRule>,
    pub requires_equal_weights: bool,
    pub result_classification: ResultClassification,
    pub available_formulas: Vec<FormulaDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_indices: Vec<SubIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl IndexDefinition {
    pub fn formula(&self, id: &str) -> Option<&FormulaDescriptor> {
        self.available_formulas.iter().find(|f| f.id == id)
    }

    pub fn default_formula(&self) -> Option<&FormulaDescriptor> {
        self.formula(&self.default_formula_id)
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.required_parameters.iter().find(|p| p.id == id)
    }

    pub fn parameter_ids(&self) -> Vec<&str> {
        self.required_parameters
            .iter()
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Count enforced by the index's parameter-count rule, if it has one
    pub fn required_count(&self) -> Option<usize> {
        self.validation_rules.iter().find_map(|rule| match rule {
            ValidationRule::ParameterCount { expected, .. } => Some(*expected),
            _ => None,
        })
    }

    pub fn is_composite(&self) -> bool {
        self.kind == IndexKind::CompositeIndex && !self.sub_indices.is_empty()
    }
}
