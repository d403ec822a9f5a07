//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Segments appear in run order
//! - Map-valued fields render in key order
//! - Byte-for-byte identical output for identical reports

use crate::engine::RunReport;

/// Render a run report as a fixed-width table followed by statistics
pub fn render_text(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Index: {}  Formula: {} ({})\n\n",
        report.index_id,
        report.formula_id,
        report.formula.as_str()
    ));
    output.push_str(&format!(
        "{:<8} {:<10} {:<20} {}\n",
        "SCORE", "CLASS", "SEGMENT", "COMPONENTS"
    ));

    for result in &report.results {
        let components = if result.components.is_empty() {
            "-".to_string()
        } else {
            result
                .components
                .iter()
                .map(|(id, value)| format!("{}={:.3}", id, value))
                .collect::<Vec<_>>()
                .join(", ")
        };
        output.push_str(&format!(
            "{:<8} {:<10} {:<20} {}\n",
            format!("{:.3}", result.score),
            result.class_label,
            truncate_or_pad(&result.segment_id, 20),
            components
        ));
    }

    let stats = &report.statistics;
    output.push_str(&format!(
        "\n{} scored, {} skipped, {} unclassified\n",
        report.results.len(),
        report.skipped.len(),
        report.unclassified.len()
    ));
    output.push_str(&format!(
        "mean {:.3}  median {:.3}  min {:.3}  max {:.3}  std dev {}\n",
        stats.mean,
        stats.median,
        stats.min,
        stats.max,
        stats
            .standard_deviation
            .map(|sd| format!("{:.3}", sd))
            .unwrap_or_else(|| "-".to_string())
    ));

    for skipped in &report.skipped {
        output.push_str(&format!(
            "skipped {}: missing {}\n",
            skipped.segment_id,
            skipped.missing.join(", ")
        ));
    }
    for segment in &report.unclassified {
        output.push_str(&format!(
            "unclassified {}: score {:.3} outside every class band\n",
            segment.segment_id, segment.score
        ));
    }

    output
}

/// Render a run report as pretty-printed JSON
pub fn render_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width (in characters)
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{compute_statistics, FormulaKind};
    use crate::engine::{CompositeResult, SkippedSegment, UnclassifiedSegment};
    use std::collections::BTreeMap;

    fn sample_report() -> RunReport {
        let mut components = BTreeMap::new();
        components.insert("evi".to_string(), 0.3);
        components.insert("svi".to_string(), 0.7);
        RunReport {
            index_id: "icvi-alcantara-2024".to_string(),
            formula_id: "icvi-arithmetic".to_string(),
            formula: FormulaKind::ArithmeticMean,
            results: vec![CompositeResult {
                segment_id: "segment-with-a-rather-long-name".to_string(),
                score: 0.5,
                per_parameter_scores: BTreeMap::new(),
                components,
                class_label: "Moderate".to_string(),
                class_color: "#fee08b".to_string(),
            }],
            statistics: compute_statistics(&[0.5]),
            skipped: vec![SkippedSegment {
                segment_id: "s9".to_string(),
                missing: vec!["icvi_slope".to_string()],
            }],
            unclassified: vec![UnclassifiedSegment {
                segment_id: "s10".to_string(),
                score: 1.2,
            }],
        }
    }

    #[test]
    fn test_render_text_layout() {
        let text = render_text(&sample_report());
        assert!(text.starts_with("Index: icvi-alcantara-2024  Formula: icvi-arithmetic (arithmetic-mean)\n"));
        assert!(text.contains("0.500    Moderate   segment-with-a-ra... evi=0.300, svi=0.700\n"));
        assert!(text.contains("1 scored, 1 skipped, 1 unclassified\n"));
        assert!(text.contains("std dev 0.000"));
        assert!(text.contains("skipped s9: missing icvi_slope\n"));
        assert!(text.ends_with("unclassified s10: score 1.200 outside every class band\n"));
    }

    #[test]
    fn test_render_json_is_deterministic() {
        let report = sample_report();
        let first = render_json(&report);
        assert_eq!(first, render_json(&report));
        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["formula"], "arithmetic-mean");
        assert_eq!(value["results"][0]["components"]["svi"], 0.7);
        assert_eq!(value["statistics"]["median"], 0.5);
        assert_eq!(value["unclassified"][0]["segment_id"], "s10");
    }

    #[test]
    fn test_truncate_or_pad_counts_chars() {
        assert_eq!(truncate_or_pad("ab", 4), "ab  ");
        assert_eq!(truncate_or_pad("ñandúes-costa", 8), "ñandú...");
    }
}
