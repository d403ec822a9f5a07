//! Thieler & Hammar-Klose (1999) CVI: six physical variables on a 1-5 scale

use super::ParameterTemplate;
use crate::aggregation::FormulaKind;
use crate::index::{
    five_bands, FormulaDescriptor, IndexDefinition, IndexKind, ResultClassification,
};
use crate::parameter::standard_names;
use crate::ranking::RankingEntry;
use crate::ranking::VulnerabilityLevel as L;
use crate::validation::ValidationRule;

pub const CVI_ID: &str = "cvi-thieler-1999";

const TEMPLATE: ParameterTemplate = ParameterTemplate {
    index_id: CVI_ID,
    weight: 1.0 / 6.0,
};

pub fn cvi_index() -> IndexDefinition {
    IndexDefinition {
        id: CVI_ID.to_string(),
        name: "Coastal Vulnerability Index (CVI)".to_string(),
        short_name: "CVI".to_string(),
        description: "Physical coastal vulnerability index developed by Thieler et al. (1999) \
                      using 6 physical parameters with geometric mean calculation."
            .to_string(),
        citation: "Thieler, E. R., & Hammar-Klose, E. S. (1999). National assessment of coastal \
                   vulnerability to sea-level rise: preliminary results for the US Atlantic coast. \
                   US Geological Survey Open-File Report 99-593."
            .to_string(),
        kind: IndexKind::TrueIndex,
        default_formula_id: "cvi-geometric".to_string(),
        required_parameters: vec![
            geomorphology(),
            coastal_slope(),
            sea_level_change(),
            shoreline_change(),
            mean_tide_range(),
            mean_wave_height(),
        ],
        validation_rules: vec![
            ValidationRule::parameter_count(6, "CVI requires exactly 6 parameters"),
            ValidationRule::formula_compatibility(
                "CVI uses true geometric mean with equal weights (no explicit weights needed)",
            ),
        ],
        requires_equal_weights: true,
        result_classification: ResultClassification {
            absolute: five_bands([1.0, 1.8, 2.6, 3.4, 4.2, 5.0]),
            geometric: None,
            normalized: Some(five_bands([0.0, 0.2, 0.4, 0.6, 0.8, 1.0])),
        },
        available_formulas: vec![
            FormulaDescriptor::new(
                "cvi-geometric",
                "Geometric Mean",
                "CVI = exp(sum(w * ln(v)) / sum(w)); with equal weights this is the n-th root \
                 of the product of all six scores",
                FormulaKind::GeometricMean,
            ),
            FormulaDescriptor::new(
                "cvi-geometric-normalized",
                "Geometric Mean (Normalized)",
                "Geometric mean of scores min-max normalized within each segment",
                FormulaKind::GeometricMeanNormalized,
            ),
            FormulaDescriptor::new(
                "cvi-arithmetic",
                "Arithmetic Mean",
                "Weighted arithmetic mean of the six scores",
                FormulaKind::ArithmeticMean,
            ),
            FormulaDescriptor::new(
                "cvi-nonlinear-power",
                "Nonlinear Power",
                "Weighted mean of normalized scores raised to a power, sensitive to extremes",
                FormulaKind::NonlinearPower,
            ),
        ],
        sub_indices: Vec::new(),
        notes: vec![
            "Geometric mean over n = 6 parameters with equal weights (1/6 each).".to_string(),
            "Physical vulnerability factors only.".to_string(),
            "Normalized and nonlinear formulas report on a 0-1 scale.".to_string(),
        ],
    }
}

fn geomorphology() -> crate::parameter::Parameter {
    TEMPLATE.categorical(
        "cvi_coastal_geomorphology",
        standard_names::COASTAL_GEOMORPHOLOGY,
        "Geomorphology",
        "Coastal landform type",
        vec![
            RankingEntry::category(
                1.0,
                L::VeryLow,
                "rocky_cliffs",
                "Rocky, cliffed coasts / Fiords / Fiards",
            ),
            RankingEntry::category(
                2.0,
                L::Low,
                "medium_cliffs",
                "Medium cliffs / Indented coasts",
            ),
            RankingEntry::category(
                3.0,
                L::Moderate,
                "low_cliffs",
                "Low cliffs / Glacial drift / Alluvial plains",
            ),
            RankingEntry::category(
                4.0,
                L::High,
                "cobble_beaches",
                "Cobble beaches / Estuary / Lagoon",
            ),
            RankingEntry::category(
                5.0,
                L::VeryHigh,
                "barrier_beaches",
                "Barrier beaches / Sand beaches / Salt marsh / Mud flats / Deltas / Mangrove / Coral reefs",
            ),
        ],
    )
}

fn coastal_slope() -> crate::parameter::Parameter {
    TEMPLATE.numerical(
        "cvi_coastal_slope",
        standard_names::COASTAL_SLOPE,
        "Coastal Slope",
        "Regional coastal slope",
        "%",
        vec![
            RankingEntry::range(1.0, L::VeryLow, Some(14.7), None, ">14.7%"),
            RankingEntry::range(2.0, L::Low, Some(10.9), Some(14.7), "10.9-14.6%"),
            RankingEntry::range(3.0, L::Moderate, Some(7.2), Some(10.9), "7.2-10.8%"),
            RankingEntry::range(4.0, L::High, Some(3.6), Some(7.2), "3.6-7.1%"),
            RankingEntry::range(5.0, L::VeryHigh, None, Some(3.6), "<3.5%"),
        ],
    )
}

fn sea_level_change() -> crate::parameter::Parameter {
    TEMPLATE.numerical(
        "cvi_sea_level_change",
        standard_names::SEA_LEVEL_CHANGE,
        "Relative Sea Level Change",
        "Historical rate of relative sea level change",
        "mm/yr",
        vec![
            RankingEntry::range(1.0, L::VeryLow, None, Some(1.8), "<1.8 mm/yr"),
            RankingEntry::range(2.0, L::Low, Some(1.8), Some(2.5), "1.8-2.5 mm/yr"),
            RankingEntry::range(3.0, L::Moderate, Some(2.5), Some(3.4), "2.5-3.4 mm/yr"),
            RankingEntry::range(4.0, L::High, Some(3.4), Some(4.6), "3.4-4.6 mm/yr"),
            RankingEntry::range(5.0, L::VeryHigh, Some(4.6), None, ">4.6 mm/yr"),
        ],
    )
}

fn shoreline_change() -> crate::parameter::Parameter {
    TEMPLATE.numerical(
        "cvi_shoreline_change",
        standard_names::SHORELINE_CHANGE,
        "Shoreline Erosion/Accretion Rate",
        "Historical shoreline change rate",
        "m/yr",
        vec![
            RankingEntry::range(1.0, L::VeryLow, Some(2.0), None, ">2.0 m/yr (accretion)"),
            RankingEntry::range(2.0, L::Low, Some(1.0), Some(2.0), "1.0-2.0 m/yr (accretion)"),
            RankingEntry::range(
                3.0,
                L::Moderate,
                Some(-1.0),
                Some(1.0),
                "-1.0 to +1.0 m/yr (stable)",
            ),
            RankingEntry::range(
                4.0,
                L::High,
                Some(-2.0),
                Some(-1.0),
                "-2.0 to -1.0 m/yr (erosion)",
            ),
            RankingEntry::range(5.0, L::VeryHigh, None, Some(-2.0), "<-2.0 m/yr (erosion)"),
        ],
    )
}

fn mean_tide_range() -> crate::parameter::Parameter {
    TEMPLATE.numerical(
        "cvi_mean_tide_range",
        standard_names::MEAN_TIDE_RANGE,
        "Mean Tide Range",
        "Mean tidal range",
        "m",
        vec![
            RankingEntry::range(1.0, L::VeryLow, Some(6.0), None, ">6.0 m"),
            RankingEntry::range(2.0, L::Low, Some(4.0), Some(6.0), "4.1-6.0 m"),
            RankingEntry::range(3.0, L::Moderate, Some(2.0), Some(4.0), "2.1-4.0 m"),
            RankingEntry::range(4.0, L::High, Some(1.0), Some(2.0), "1.1-2.0 m"),
            RankingEntry::range(5.0, L::VeryHigh, Some(0.0), Some(1.0), "0.0-1.0 m"),
        ],
    )
}

fn mean_wave_height() -> crate::parameter::Parameter {
    TEMPLATE.numerical(
        "cvi_mean_wave_height",
        standard_names::MEAN_WAVE_HEIGHT,
        "Mean Wave Height",
        "Mean significant wave height",
        "m",
        vec![
            RankingEntry::range(1.0, L::VeryLow, Some(0.0), Some(0.55), "<0.55 m"),
            RankingEntry::range(2.0, L::Low, Some(0.55), Some(0.85), "0.55-0.85 m"),
            RankingEntry::range(3.0, L::Moderate, Some(0.85), Some(1.05), "0.85-1.05 m"),
            RankingEntry::range(4.0, L::High, Some(1.05), Some(1.25), "1.05-1.25 m"),
            RankingEntry::range(5.0, L::VeryHigh, Some(1.25), None, ">1.25 m"),
        ],
    )
}
