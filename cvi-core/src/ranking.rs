//! Ranking tables: per-parameter lookup data converting raw values into scores
//!
//! Invariants enforced by `check_ranking_table`:
//! - Entries are ordered by strictly ascending score
//! - Numeric tables carry explicit bounds on every entry
//! - Numeric bounds are contiguous once sorted by lower bound (no gaps, no overlaps)

use crate::parameter::ParameterKind;
use serde::{Deserialize, Serialize};

/// Five-step vulnerability scale shared by ranking tables and result bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl VulnerabilityLevel {
    pub const ALL: [VulnerabilityLevel; 5] = [
        VulnerabilityLevel::VeryLow,
        VulnerabilityLevel::Low,
        VulnerabilityLevel::Moderate,
        VulnerabilityLevel::High,
        VulnerabilityLevel::VeryHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VulnerabilityLevel::VeryLow => "Very Low",
            VulnerabilityLevel::Low => "Low",
            VulnerabilityLevel::Moderate => "Moderate",
            VulnerabilityLevel::High => "High",
            VulnerabilityLevel::VeryHigh => "Very High",
        }
    }

    /// Diverging green-to-red palette used by maps and legends
    pub fn color(&self) -> &'static str {
        match self {
            VulnerabilityLevel::VeryLow => "#1a9850",
            VulnerabilityLevel::Low => "#91cf60",
            VulnerabilityLevel::Moderate => "#fee08b",
            VulnerabilityLevel::High => "#fc8d59",
            VulnerabilityLevel::VeryHigh => "#d73027",
        }
    }
}

/// Closed interval of raw values belonging to one numeric ranking entry.
/// `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Bounds { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// One bucket of a ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub score: f64,
    pub criteria: String,
    pub color: String,
    pub label: String,
    /// Exact-match tag for categorical inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value range for numeric inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl RankingEntry {
    /// Categorical bucket matched by `key` (exact) or by `criteria` text
    pub fn category(score: f64, level: VulnerabilityLevel, key: &str, criteria: &str) -> Self {
        RankingEntry {
            score,
            criteria: criteria.to_string(),
            color: level.color().to_string(),
            label: level.label().to_string(),
            key: Some(key.to_string()),
            bounds: None,
        }
    }

    /// Numeric bucket covering `[min, max]`
    pub fn range(
        score: f64,
        level: VulnerabilityLevel,
        min: Option<f64>,
        max: Option<f64>,
        criteria: &str,
    ) -> Self {
        RankingEntry {
            score,
            criteria: criteria.to_string(),
            color: level.color().to_string(),
            label: level.label().to_string(),
            key: None,
            bounds: Some(Bounds::new(min, max)),
        }
    }
}

/// Check a ranking table's structural invariants, returning every problem found
pub fn check_ranking_table(entries: &[RankingEntry], kind: ParameterKind) -> Vec<String> {
    let mut problems = Vec::new();

    if entries.is_empty() {
        problems.push("ranking table is empty".to_string());
        return problems;
    }

    for pair in entries.windows(2) {
        if pair[1].score <= pair[0].score {
            problems.push(format!(
                "scores must ascend: {} ({}) is followed by {} ({})",
                pair[0].score, pair[0].label, pair[1].score, pair[1].label
            ));
        }
    }

    if kind == ParameterKind::Numerical {
        problems.extend(check_numeric_bounds(entries));
    }

    problems
}

fn check_numeric_bounds(entries: &[RankingEntry]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut bounds: Vec<(&str, Bounds)> = Vec::with_capacity(entries.len());

    let bounded = entries.iter().filter(|e| e.bounds.is_some()).count();
    if bounded > 0 && bounded < entries.len() {
        problems.push(format!(
            "table mixes bounded and unbounded entries ({} of {} bounded)",
            bounded,
            entries.len()
        ));
    }

    for entry in entries {
        match entry.bounds {
            Some(b) => {
                if let (Some(min), Some(max)) = (b.min, b.max) {
                    if min > max {
                        problems.push(format!(
                            "entry '{}' has min {} above max {}",
                            entry.label, min, max
                        ));
                    }
                }
                bounds.push((entry.label.as_str(), b));
            }
            None => problems.push(format!("entry '{}' has no numeric bounds", entry.label)),
        }
    }

    if !problems.is_empty() {
        return problems;
    }

    // Open lower bound sorts first
    bounds.sort_by(|a, b| {
        let a_min = a.1.min.unwrap_or(f64::NEG_INFINITY);
        let b_min = b.1.min.unwrap_or(f64::NEG_INFINITY);
        a_min
            .partial_cmp(&b_min)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (position, pair) in bounds.windows(2).enumerate() {
        let (lower_label, lower) = pair[0];
        let (upper_label, upper) = pair[1];
        match (lower.max, upper.min) {
            (Some(max), Some(min)) if max == min => {}
            (Some(max), Some(min)) if max < min => problems.push(format!(
                "gap between '{}' (max {}) and '{}' (min {})",
                lower_label, max, upper_label, min
            )),
            (Some(max), Some(min)) => problems.push(format!(
                "overlap between '{}' (max {}) and '{}' (min {})",
                lower_label, max, upper_label, min
            )),
            (None, _) => problems.push(format!(
                "'{}' is open-ended but is not the last bucket (position {})",
                lower_label, position
            )),
            (_, None) => problems.push(format!(
                "'{}' has an open lower bound but is not the first bucket",
                upper_label
            )),
        }
    }

    problems
}
