//! Alcántara-Carrió et al. (2024) ICVI: mean of an environmental (EVI) and a
//! socioeconomic (SVI) sub-index, six parameters each, scored 0.1-0.9

use super::ParameterTemplate;
use crate::aggregation::FormulaKind;
use crate::index::{
    five_bands, FormulaDescriptor, IndexDefinition, IndexKind, ResultClassification, SubIndex,
};
use crate::parameter::{standard_names, Parameter};
use crate::ranking::RankingEntry;
use crate::ranking::VulnerabilityLevel as L;
use crate::validation::ValidationRule;

pub const ICVI_ID: &str = "icvi-alcantara-2024";
pub const EVI_ID: &str = "evi";
pub const SVI_ID: &str = "svi";

const TEMPLATE: ParameterTemplate = ParameterTemplate {
    index_id: ICVI_ID,
    weight: 1.0 / 12.0,
};

pub fn icvi_index() -> IndexDefinition {
    let environmental = vec![
        geomorphological_features(),
        slope(),
        shoreline_migration(),
        ecosystem_type(),
        conservation_measures(),
        species_interest(),
    ];
    let socioeconomic = vec![
        land_use(),
        building_coast_ratio(),
        population_density(),
        economic_activity(),
        economic_value(),
        heritage(),
    ];

    let sub_indices = vec![
        SubIndex {
            id: EVI_ID.to_string(),
            name: "Environmental Vulnerability Index (EVI)".to_string(),
            parameter_ids: environmental.iter().map(|p| p.id.clone()).collect(),
        },
        SubIndex {
            id: SVI_ID.to_string(),
            name: "Socioeconomic Vulnerability Index (SVI)".to_string(),
            parameter_ids: socioeconomic.iter().map(|p| p.id.clone()).collect(),
        },
    ];

    IndexDefinition {
        id: ICVI_ID.to_string(),
        name: "Integrated Coastal Vulnerability Index (ICVI)".to_string(),
        short_name: "ICVI".to_string(),
        description: "Composite index combining Environmental Vulnerability Index (EVI) and \
                      Socioeconomic Vulnerability Index (SVI) developed by Alcántara-Carrió et al. (2024)."
            .to_string(),
        citation: "Alcántara-Carrió, J., García Echavarría, L. M., & Jaramillo-Vélez, A. (2024). \
                   Is the coastal vulnerability index a suitable index? Review and proposal of \
                   alternative indices for coastal vulnerability to sea level rise. \
                   Geo-Marine Letters, 44(1), 8. https://doi.org/10.1007/s00367-024-00770-9"
            .to_string(),
        kind: IndexKind::CompositeIndex,
        default_formula_id: "icvi-arithmetic".to_string(),
        required_parameters: environmental.into_iter().chain(socioeconomic).collect(),
        validation_rules: vec![
            ValidationRule::parameter_count(
                12,
                "ICVI requires exactly 12 parameters (6 environmental + 6 socioeconomic)",
            ),
            ValidationRule::equal_weights(12, "ICVI requires equal weights (1/12 each)"),
            ValidationRule::formula_compatibility("ICVI must use composite formula"),
        ],
        requires_equal_weights: true,
        result_classification: ResultClassification {
            absolute: five_bands([0.0, 0.2, 0.4, 0.6, 0.8, 1.0]),
            geometric: Some(five_bands([0.1, 0.26, 0.42, 0.58, 0.74, 0.9])),
            normalized: None,
        },
        available_formulas: vec![
            FormulaDescriptor::new(
                "icvi-arithmetic",
                "Arithmetic Mean",
                "EVI and SVI as arithmetic means of their parameters, ICVI = (EVI + SVI) / 2",
                FormulaKind::ArithmeticMean,
            ),
            FormulaDescriptor::new(
                "icvi-geometric",
                "Geometric Mean",
                "EVI and SVI as geometric means of their parameters, ICVI = (EVI + SVI) / 2",
                FormulaKind::GeometricMean,
            ),
        ],
        sub_indices,
        notes: vec![
            "Two calculation methods: arithmetic mean (global application) and geometric mean."
                .to_string(),
            "Parameter categories follow Roukounis & Tsihrintzis (2022).".to_string(),
        ],
    }
}

fn geomorphological_features() -> Parameter {
    TEMPLATE.categorical(
        "icvi_geomorphological_features",
        standard_names::COASTAL_GEOMORPHOLOGY,
        "Geomorphological Features",
        "Coastal geomorphological characteristics",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "high_cliffs", "High cliffs, Cliff of coherent rocks"),
            RankingEntry::category(
                0.3,
                L::Low,
                "medium_cliffs",
                "Medium cliffs, Cliff of medium resistance rocks",
            ),
            RankingEntry::category(
                0.5,
                L::Moderate,
                "low_cliffs",
                "Low cliffs, Cliff on sedimentary formations, Cliff with high erodibility",
            ),
            RankingEntry::category(
                0.7,
                L::High,
                "extensive_beaches",
                "Extensive beaches attached to low-elevation coastal sedimentary plains",
            ),
            RankingEntry::category(
                0.9,
                L::VeryHigh,
                "barrier_beaches",
                "Beaches attached to barrier island formations, tombolos, coastal arrows, deltas, \
                 Sectors in front of tidal or fluvial-tidal marshes",
            ),
        ],
    )
}

fn slope() -> Parameter {
    TEMPLATE.numerical(
        "icvi_slope",
        standard_names::COASTAL_SLOPE,
        "Slope",
        "Coastal slope percentage",
        "%",
        vec![
            RankingEntry::range(0.1, L::VeryLow, Some(8.0), None, "> 8%"),
            RankingEntry::range(0.3, L::Low, Some(4.0), Some(8.0), "4-8%"),
            RankingEntry::range(0.5, L::Moderate, Some(2.0), Some(4.0), "2-4%"),
            RankingEntry::range(0.7, L::High, Some(1.0), Some(2.0), "1-2%"),
            RankingEntry::range(0.9, L::VeryHigh, Some(0.0), Some(1.0), "0-1%"),
        ],
    )
}

fn shoreline_migration() -> Parameter {
    TEMPLATE.numerical(
        "icvi_shoreline_migration",
        standard_names::SHORELINE_CHANGE,
        "Shoreline Migration Rate",
        "Rate of shoreline migration",
        "m/yr",
        vec![
            RankingEntry::range(0.1, L::VeryLow, Some(2.0), None, "> +2.0 m/yr"),
            RankingEntry::range(0.3, L::Low, Some(1.0), Some(2.0), "+1.0 to +2.0 m/yr"),
            RankingEntry::range(0.5, L::Moderate, Some(-1.0), Some(1.0), "-1.0 to +1.0 m/yr"),
            RankingEntry::range(0.7, L::High, Some(-2.0), Some(-1.0), "-2.0 to -1.0 m/yr"),
            RankingEntry::range(0.9, L::VeryHigh, None, Some(-2.0), "≤ -2.0 m/yr"),
        ],
    )
}

fn ecosystem_type() -> Parameter {
    TEMPLATE.categorical(
        "icvi_ecosystem_type",
        standard_names::ECOSYSTEM_TYPE,
        "Ecosystem Type",
        "Type of coastal ecosystem",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "no_vegetation", "Without vegetation"),
            RankingEntry::category(
                0.3,
                L::Low,
                "plain_and_cliffs",
                "Coastal plain and coastal cliffs",
            ),
            RankingEntry::category(
                0.5,
                L::Moderate,
                "shrubs_grasslands",
                "Shrub vegetation, stubble, grasslands",
            ),
            RankingEntry::category(0.7, L::High, "forests", "Forests"),
            RankingEntry::category(
                0.9,
                L::VeryHigh,
                "strategic_ecosystems",
                "Strategic ecosystems: coastal lagoons, mangroves, coral reefs",
            ),
        ],
    )
}

fn conservation_measures() -> Parameter {
    TEMPLATE.categorical(
        "icvi_conservation_measures",
        standard_names::ENVIRONMENTAL_CONSERVANCY,
        "Environmental Conservancy Measures",
        "Level of environmental protection measures",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "none", "None"),
            RankingEntry::category(
                0.3,
                L::Low,
                "reserve_zone",
                "Reserve zone for agrarian, fishing or hunting activities",
            ),
            RankingEntry::category(
                0.5,
                L::Moderate,
                "conservation_parks",
                "Regional or local conservation parks",
            ),
            RankingEntry::category(0.7, L::High, "biosphere_reserve", "Biosphere reserve areas"),
            RankingEntry::category(0.9, L::VeryHigh, "national_parks", "National Parks, RAMSAR sites"),
        ],
    )
}

fn species_interest() -> Parameter {
    TEMPLATE.categorical(
        "icvi_species_interest",
        standard_names::INTEREST_SPECIES,
        "Presence of Interest Species",
        "Presence of species of conservation interest",
        vec![
            RankingEntry::category(
                0.1,
                L::VeryLow,
                "invasive_colonized",
                "Ecosystems colonized by invasive species",
            ),
            RankingEntry::category(
                0.3,
                L::Low,
                "invasive_normal_growth",
                "Ecosystems with invasive species with a normal population growth",
            ),
            RankingEntry::category(
                0.5,
                L::Moderate,
                "high_value_species",
                "Ecosystems with normal population growth and high-value species",
            ),
            RankingEntry::category(
                0.7,
                L::High,
                "threatened_species",
                "Ecosystems with endemism and threatened species (VU, EN, CR) with active conservation programs",
            ),
            RankingEntry::category(
                0.9,
                L::VeryHigh,
                "high_endemism",
                "Ecosystems with high quantity of endemism and high-value species",
            ),
        ],
    )
}

fn land_use() -> Parameter {
    TEMPLATE.categorical(
        "icvi_land_use",
        standard_names::LAND_USE,
        "Use of Territory",
        "Type of land use in coastal areas",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "natural", "Natural areas, without buildings"),
            RankingEntry::category(0.3, L::Low, "rural", "Rural areas"),
            RankingEntry::category(
                0.5,
                L::Moderate,
                "semi_urban",
                "Semi-urban areas with scattered buildings",
            ),
            RankingEntry::category(0.7, L::High, "urban", "Urban areas"),
            RankingEntry::category(0.9, L::VeryHigh, "industrial", "Industrial areas"),
        ],
    )
}

fn building_coast_ratio() -> Parameter {
    TEMPLATE.numerical(
        "icvi_building_coast_ratio",
        standard_names::BUILDING_COAST_RATIO,
        "Building Coast Ratio",
        "Ratio of built structures along the coast",
        "ratio",
        vec![
            RankingEntry::range(0.1, L::VeryLow, Some(0.0), Some(0.0), "0"),
            RankingEntry::range(0.3, L::Low, Some(0.0), Some(0.1), "0.0001-0.1"),
            RankingEntry::range(0.5, L::Moderate, Some(0.1), Some(0.5), "0.1-0.5"),
            RankingEntry::range(0.7, L::High, Some(0.5), Some(1.0), "0.5-1.0"),
            RankingEntry::range(0.9, L::VeryHigh, Some(1.0), None, "> 1.0"),
        ],
    )
}

fn population_density() -> Parameter {
    TEMPLATE.numerical(
        "icvi_population_density",
        standard_names::POPULATION_DENSITY,
        "Population Density",
        "Population density in coastal areas",
        "pop/ha",
        vec![
            RankingEntry::range(0.1, L::VeryLow, Some(0.0), Some(20.0), "≤ 20 pop/ha"),
            RankingEntry::range(0.3, L::Low, Some(20.0), Some(50.0), "20-50 pop/ha"),
            RankingEntry::range(0.5, L::Moderate, Some(50.0), Some(80.0), "50-80 pop/ha"),
            RankingEntry::range(0.7, L::High, Some(80.0), Some(170.0), "80-170 pop/ha"),
            RankingEntry::range(0.9, L::VeryHigh, Some(170.0), None, "> 170 pop/ha"),
        ],
    )
}

fn economic_activity() -> Parameter {
    TEMPLATE.categorical(
        "icvi_economic_activity",
        standard_names::ECONOMIC_ACTIVITY,
        "Socio-economic Activity",
        "Level of socio-economic activity",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "none", "None"),
            RankingEntry::category(0.3, L::Low, "low", "Low"),
            RankingEntry::category(0.5, L::Moderate, "moderate", "Moderate"),
            RankingEntry::category(0.7, L::High, "high", "High"),
            RankingEntry::category(0.9, L::VeryHigh, "very_high", "Very high"),
        ],
    )
}

fn economic_value() -> Parameter {
    TEMPLATE.numerical(
        "icvi_economic_value",
        standard_names::ECONOMIC_VALUE,
        "Economic Value",
        "Economic value of coastal areas",
        "€",
        vec![
            RankingEntry::range(0.1, L::VeryLow, Some(0.0), Some(1.0e5), "0 - 10⁵ €"),
            RankingEntry::range(0.3, L::Low, Some(1.0e5), Some(3.5e5), "10⁵ - 3.5×10⁵ €"),
            RankingEntry::range(0.5, L::Moderate, Some(3.5e5), Some(6.5e5), "3.5×10⁵ - 6.5×10⁵ €"),
            RankingEntry::range(0.7, L::High, Some(6.5e5), Some(1.0e6), "6.5×10⁵ - 10⁶ €"),
            RankingEntry::range(0.9, L::VeryHigh, Some(1.0e6), None, "> 10⁶ €"),
        ],
    )
}

fn heritage() -> Parameter {
    TEMPLATE.categorical(
        "icvi_heritage",
        standard_names::SOCIOCULTURAL_HERITAGE,
        "Archeologic and Historic Heritage",
        "Presence of archaeological and historic heritage",
        vec![
            RankingEntry::category(0.1, L::VeryLow, "none", "None"),
            RankingEntry::category(0.3, L::Low, "local", "Local relevance"),
            RankingEntry::category(0.5, L::Moderate, "regional", "Regional relevance"),
            RankingEntry::category(0.7, L::High, "national", "National relevance"),
            RankingEntry::category(0.9, L::VeryHigh, "world_heritage", "World Heritage"),
        ],
    )
}
