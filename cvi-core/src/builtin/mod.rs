//! Built-in index definitions loaded into every default registry

mod cvi;
mod icvi;

pub use cvi::{cvi_index, CVI_ID};
pub use icvi::{icvi_index, EVI_ID, ICVI_ID, SVI_ID};

use crate::parameter::{Parameter, ParameterKind};
use crate::ranking::RankingEntry;

/// Every built-in index, in registration order
pub fn builtin_indices() -> Vec<crate::index::IndexDefinition> {
    vec![cvi_index(), icvi_index()]
}

/// Shared fields of the parameters one index defines
struct ParameterTemplate {
    index_id: &'static str,
    weight: f64,
}

impl ParameterTemplate {
    fn categorical(
        &self,
        id: &str,
        standard_name: &str,
        display_name: &str,
        description: &str,
        ranking_table: Vec<RankingEntry>,
    ) -> Parameter {
        let mut parameter =
            self.build(id, standard_name, display_name, description, None, ranking_table);
        parameter.kind = ParameterKind::Categorical;
        parameter
    }

    fn numerical(
        &self,
        id: &str,
        standard_name: &str,
        display_name: &str,
        description: &str,
        unit: &str,
        ranking_table: Vec<RankingEntry>,
    ) -> Parameter {
        self.build(
            id,
            standard_name,
            display_name,
            description,
            Some(unit),
            ranking_table,
        )
    }

    fn build(
        &self,
        id: &str,
        standard_name: &str,
        display_name: &str,
        description: &str,
        unit: Option<&str>,
        ranking_table: Vec<RankingEntry>,
    ) -> Parameter {
        Parameter {
            id: id.to_string(),
            standard_name: standard_name.to_string(),
            index_id: self.index_id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            kind: ParameterKind::Numerical,
            unit: unit.map(str::to_string),
            weight: self.weight,
            required: true,
            ranking_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::check_ranking_table;

    #[test]
    fn test_builtin_ranking_tables_are_well_formed() {
        for index in builtin_indices() {
            for parameter in &index.required_parameters {
                let problems = check_ranking_table(&parameter.ranking_table, parameter.kind);
                assert!(
                    problems.is_empty(),
                    "{} / {}: {:?}",
                    index.id,
                    parameter.id,
                    problems
                );
            }
        }
    }

    #[test]
    fn test_builtin_parameter_counts_match_rules() {
        for index in builtin_indices() {
            assert_eq!(
                Some(index.required_parameters.len()),
                index.required_count(),
                "{}",
                index.id
            );
        }
    }

    #[test]
    fn test_builtin_parameters_point_back_to_their_index() {
        for index in builtin_indices() {
            for parameter in &index.required_parameters {
                assert_eq!(parameter.index_id, index.id);
            }
        }
    }

    #[test]
    fn test_builtin_default_formulas_exist() {
        for index in builtin_indices() {
            assert!(index.default_formula().is_some(), "{}", index.id);
        }
    }

    #[test]
    fn test_builtin_sub_indices_cover_every_parameter_once() {
        let icvi = icvi_index();
        let mut covered: Vec<&str> = icvi
            .sub_indices
            .iter()
            .flat_map(|s| s.parameter_ids.iter().map(String::as_str))
            .collect();
        covered.sort_unstable();
        let mut expected = icvi.parameter_ids();
        expected.sort_unstable();
        assert_eq!(covered, expected);
    }
}
