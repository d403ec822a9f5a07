//! Registry, validation and mapping behavior across the built-in indices

use cvi_core::builtin::{CVI_ID, ICVI_ID};
use cvi_core::{
    compute_statistics, score_for, validate, IndexRegistry, ParameterKind, RawValue, RunOptions,
    ScoringEngine, SegmentInput,
};
use std::collections::BTreeMap;

#[test]
fn test_builtin_parameter_counts() {
    let registry = IndexRegistry::with_builtins();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.parameters_for_index(CVI_ID).len(), 6);
    assert_eq!(registry.parameters_for_index(ICVI_ID).len(), 12);
    assert!(registry.parameters_for_index("unknown").is_empty());
}

#[test]
fn test_validate_unknown_index() {
    let registry = IndexRegistry::with_builtins();
    let report = validate(&registry, "unknown", &["a", "b"], None);
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Index not found".to_string()]);
}

#[test]
fn test_validate_full_parameter_sets() {
    let registry = IndexRegistry::with_builtins();
    for index in registry.all_indices() {
        let ids = index.parameter_ids();
        let report = validate(&registry, &index.id, &ids, None);
        assert!(report.valid, "{}: {:?}", index.id, report.errors);
        assert!(report.errors.is_empty());
    }
}

#[test]
fn test_validate_missing_parameter_reports_count() {
    let registry = IndexRegistry::with_builtins();

    let cvi = registry.index(CVI_ID).unwrap();
    let ids = cvi.parameter_ids();
    let report = validate(&registry, CVI_ID, &ids[1..], None);
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["CVI requires exactly 6 parameters".to_string()]);

    let icvi = registry.index(ICVI_ID).unwrap();
    let ids = icvi.parameter_ids();
    let report = validate(&registry, ICVI_ID, &ids[..11], None);
    assert_eq!(
        report.errors,
        vec!["ICVI requires exactly 12 parameters (6 environmental + 6 socioeconomic)".to_string()]
    );
}

#[test]
fn test_validate_unequal_icvi_weights() {
    let registry = IndexRegistry::with_builtins();
    let icvi = registry.index(ICVI_ID).unwrap();
    let ids = icvi.parameter_ids();
    let mut weights: BTreeMap<String, f64> =
        ids.iter().map(|id| (id.to_string(), 1.0 / 12.0)).collect();

    let report = validate(&registry, ICVI_ID, &ids, Some(&weights));
    assert!(report.valid, "{:?}", report.errors);

    weights.insert(ids[0].to_string(), 0.5);
    let report = validate(&registry, ICVI_ID, &ids, Some(&weights));
    assert_eq!(report.errors, vec!["ICVI requires equal weights (1/12 each)".to_string()]);
}

#[test]
fn test_validate_reports_every_failing_rule() {
    let registry = IndexRegistry::with_builtins();
    let icvi = registry.index(ICVI_ID).unwrap();
    let all_ids = icvi.parameter_ids();
    let ids = &all_ids[..11];
    let weights: BTreeMap<String, f64> = ids.iter().map(|id| (id.to_string(), 0.5)).collect();

    let report = validate(&registry, ICVI_ID, ids, Some(&weights));
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(
        report.errors,
        vec![
            "ICVI requires exactly 12 parameters (6 environmental + 6 socioeconomic)".to_string(),
            "ICVI requires equal weights (1/12 each)".to_string(),
        ]
    );
}

#[test]
fn test_unknown_index_short_circuits_rule_checks() {
    let registry = IndexRegistry::with_builtins();
    let cvi = registry.index(CVI_ID).unwrap();
    let all_ids = cvi.parameter_ids();
    let ids = &all_ids[..5];

    let known = validate(&registry, CVI_ID, ids, None);
    assert_eq!(known.errors, vec!["CVI requires exactly 6 parameters".to_string()]);

    // The same short selection against an unknown id reports only the lookup failure
    let unknown = validate(&registry, "cvi-unknown", ids, None);
    assert!(!unknown.valid);
    assert_eq!(unknown.errors, vec!["Index not found".to_string()]);
}

#[test]
fn test_statistics_of_four_values() {
    let stats = compute_statistics(&[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(stats.mean, 2.5);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 4.0);
    let sd = stats.standard_deviation.unwrap();
    assert!((sd - 1.25f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_categorical_criteria_round_trip() {
    let registry = IndexRegistry::with_builtins();
    let categorical = registry
        .all_parameters()
        .filter(|p| p.kind == ParameterKind::Categorical);

    let mut checked = 0;
    for parameter in categorical {
        for entry in &parameter.ranking_table {
            let by_criteria = score_for(parameter, &RawValue::from(entry.criteria.as_str())).unwrap();
            assert_eq!(by_criteria, entry.score, "{} / {}", parameter.id, entry.criteria);

            if let Some(key) = &entry.key {
                let by_key = score_for(parameter, &RawValue::from(key.as_str())).unwrap();
                assert_eq!(by_key, entry.score, "{} / {}", parameter.id, key);
            }
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_numeric_tables_cover_their_bounds() {
    let registry = IndexRegistry::with_builtins();
    for parameter in registry
        .all_parameters()
        .filter(|p| p.kind == ParameterKind::Numerical)
    {
        for entry in &parameter.ranking_table {
            let Some(bounds) = &entry.bounds else { continue };
            // A value strictly inside the bucket lands in it
            let inside = match (bounds.min, bounds.max) {
                (Some(min), Some(max)) => (min + max) / 2.0,
                (Some(min), None) => min + 1.0,
                (None, Some(max)) => max - 1.0,
                (None, None) => continue,
            };
            let score = score_for(parameter, &RawValue::from(inside)).unwrap();
            assert_eq!(score, entry.score, "{} at {}", parameter.id, inside);
        }
    }
}

#[test]
fn test_restating_default_weights_does_not_change_scores() {
    let registry = IndexRegistry::with_builtins();
    let engine = ScoringEngine::new(&registry);
    let cvi = registry.index(CVI_ID).unwrap();

    let segment = cvi
        .required_parameters
        .iter()
        .zip([2.0, 4.0, 3.0, 5.0, 1.0, 3.0])
        .fold(SegmentInput::new("s1"), |segment, (p, score)| {
            segment.with_score(&p.id, score)
        });

    let baseline = engine
        .run(CVI_ID, None, &[segment.clone()], &RunOptions::default())
        .unwrap();

    let weights: BTreeMap<String, f64> = cvi
        .required_parameters
        .iter()
        .map(|p| (p.id.clone(), p.weight))
        .collect();
    let options = RunOptions {
        weights: Some(weights),
        ..RunOptions::default()
    };
    let reweighted = engine.run(CVI_ID, None, &[segment], &options).unwrap();

    assert_eq!(baseline.results, reweighted.results);
    assert_eq!(baseline.statistics, reweighted.statistics);
}

#[test]
fn test_unknown_weight_override_is_rejected() {
    let registry = IndexRegistry::with_builtins();
    let engine = ScoringEngine::new(&registry);
    let mut weights = BTreeMap::new();
    weights.insert("not_a_parameter".to_string(), 1.0);
    let options = RunOptions {
        weights: Some(weights),
        ..RunOptions::default()
    };
    let err = engine.run(CVI_ID, None, &[], &options).unwrap_err();
    assert_eq!(err.to_string(), "parameter not found: not_a_parameter");
}

#[test]
fn test_standard_name_lookup_spans_indices() {
    let registry = IndexRegistry::with_builtins();
    let slope = registry.parameter_by_standard_name("coastal_slope").unwrap();
    assert_eq!(slope.index_id, CVI_ID);
    assert!(registry.parameter_by_standard_name("no_such_name").is_none());
}
