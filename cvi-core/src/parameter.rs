//! Index-specific parameters and their semantic categories

use crate::ranking::RankingEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How raw values for a parameter are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Numerical,
    Categorical,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Numerical => "numerical",
            ParameterKind::Categorical => "categorical",
        }
    }
}

/// A parameter as defined by one index. Immutable once its index is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    /// Cross-index key, see [`standard_names`]
    pub standard_name: String,
    pub index_id: String,
    pub display_name: String,
    pub description: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub weight: f64,
    pub required: bool,
    pub ranking_table: Vec<RankingEntry>,
}

impl Parameter {
    pub fn category(&self) -> ParameterCategory {
        category_for(&self.standard_name)
    }

    /// Lowest and highest score in the ranking table
    pub fn score_range(&self) -> Option<(f64, f64)> {
        let first = self.ranking_table.first()?;
        let last = self.ranking_table.last()?;
        Some((first.score, last.score))
    }
}

/// Stable cross-index parameter names
pub mod standard_names {
    pub const COASTAL_GEOMORPHOLOGY: &str = "coastal_geomorphology";
    pub const COASTAL_SLOPE: &str = "coastal_slope";
    pub const ROCK_TYPE: &str = "rock_type";
    pub const SEA_LEVEL_CHANGE: &str = "sea_level_change";
    pub const SHORELINE_CHANGE: &str = "shoreline_change";
    pub const MEAN_TIDE_RANGE: &str = "mean_tide_range";
    pub const MEAN_WAVE_HEIGHT: &str = "mean_wave_height";
    pub const BARRIER_TYPE: &str = "barrier_type";
    pub const SHORELINE_EXPOSURE: &str = "shoreline_exposure";
    pub const NATURAL_PROTECTION: &str = "natural_protection";
    pub const ECOSYSTEM_TYPE: &str = "ecosystem_type";
    pub const ENVIRONMENTAL_CONSERVANCY: &str = "environmental_conservancy";
    pub const INTEREST_SPECIES: &str = "interest_species";
    pub const LAND_USE: &str = "land_use";
    pub const BUILDING_COAST_RATIO: &str = "building_coast_ratio";
    pub const ECONOMIC_ACTIVITY: &str = "economic_activity";
    pub const ECONOMIC_VALUE: &str = "economic_value";
    pub const SOCIOCULTURAL_HERITAGE: &str = "sociocultural_heritage";
    pub const POPULATION_DENSITY: &str = "population_density";
    pub const INFRASTRUCTURE_DENSITY: &str = "infrastructure_density";
    pub const CULTURAL_HERITAGE: &str = "cultural_heritage";
    pub const USE_OF_TERRITORY: &str = "use_of_territory";
    pub const BEACH_WIDTH: &str = "beach_width";
    pub const DUNE_WIDTH: &str = "dune_width";
    pub const VEGETATION_DISTANCE: &str = "vegetation_distance";
    pub const DISTANCE_BUILT_STRUCTURES: &str = "distance_built_structures";
    pub const SEA_DEFENCES: &str = "sea_defences";
    pub const COMMERCIAL_PROPERTIES: &str = "commercial_properties";
    pub const RESIDENTIAL_PROPERTIES: &str = "residential_properties";
    pub const MEDIAN_GRAIN_SIZE: &str = "median_grain_size";
    pub const COASTAL_GEOTECHNICAL_MAP: &str = "coastal_geotechnical_map";
    pub const POSIDONIA_OCEANICA: &str = "posidonia_oceanica";
}

/// Semantic grouping of parameters, keyed by standard name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    Physical,
    Hydroclimate,
    Environmental,
    Socioeconomic,
    Shoreline,
    Infrastructure,
    PhysicalGeological,
}

impl ParameterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterCategory::Physical => "physical",
            ParameterCategory::Hydroclimate => "hydroclimate",
            ParameterCategory::Environmental => "environmental",
            ParameterCategory::Socioeconomic => "socioeconomic",
            ParameterCategory::Shoreline => "shoreline",
            ParameterCategory::Infrastructure => "infrastructure",
            ParameterCategory::PhysicalGeological => "physical_geological",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParameterCategory::Physical => "Physical",
            ParameterCategory::Hydroclimate => "Hydroclimate",
            ParameterCategory::Environmental => "Environmental",
            ParameterCategory::Socioeconomic => "Socioeconomic",
            ParameterCategory::Shoreline => "Shoreline",
            ParameterCategory::Infrastructure => "Infrastructure",
            ParameterCategory::PhysicalGeological => "Physical/Geological",
        }
    }
}

/// Map a standard name to its category. Unmapped names are physical.
pub fn category_for(standard_name: &str) -> ParameterCategory {
    use self::standard_names::*;

    match standard_name {
        COASTAL_GEOMORPHOLOGY | COASTAL_SLOPE | ROCK_TYPE | BEACH_WIDTH | DUNE_WIDTH => {
            ParameterCategory::Physical
        }
        MEDIAN_GRAIN_SIZE | COASTAL_GEOTECHNICAL_MAP => ParameterCategory::PhysicalGeological,
        SEA_LEVEL_CHANGE | MEAN_TIDE_RANGE | MEAN_WAVE_HEIGHT => ParameterCategory::Hydroclimate,
        SHORELINE_CHANGE | BARRIER_TYPE | SHORELINE_EXPOSURE | SEA_DEFENCES => {
            ParameterCategory::Shoreline
        }
        NATURAL_PROTECTION
        | ECOSYSTEM_TYPE
        | ENVIRONMENTAL_CONSERVANCY
        | INTEREST_SPECIES
        | VEGETATION_DISTANCE
        | POSIDONIA_OCEANICA => ParameterCategory::Environmental,
        POPULATION_DENSITY
        | ECONOMIC_VALUE
        | LAND_USE
        | BUILDING_COAST_RATIO
        | SOCIOCULTURAL_HERITAGE
        | CULTURAL_HERITAGE
        | USE_OF_TERRITORY
        | COMMERCIAL_PROPERTIES
        | RESIDENTIAL_PROPERTIES => ParameterCategory::Socioeconomic,
        INFRASTRUCTURE_DENSITY | DISTANCE_BUILT_STRUCTURES => ParameterCategory::Infrastructure,
        _ => ParameterCategory::Physical,
    }
}

/// Count standard names per category label, sorted by label
pub fn category_counts<'a, I>(standard_names: I) -> BTreeMap<&'static str, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = BTreeMap::new();
    for name in standard_names {
        *counts.entry(category_for(name).label()).or_insert(0) += 1;
    }
    counts
}
