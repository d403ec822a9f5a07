//! Index registry - owns every index definition, keyed by id
//!
//! Global invariants enforced:
//! - Listing order is registration order
//! - Re-registering an id replaces the definition in place (last write wins)
//! - Lookups never fail; unknown ids yield `None` or an empty list
//! - No removal
//!
//! The registry is a plain value. Readers share it by reference; `register`
//! takes `&mut self`, so writers are serialized by the borrow checker (or by a
//! lock the host wraps around it).

use crate::builtin::builtin_indices;
use crate::index::IndexDefinition;
use crate::parameter::Parameter;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct IndexRegistry {
    indices: Vec<IndexDefinition>,
    positions: HashMap<String, usize>,
}

impl IndexRegistry {
    /// An empty registry with no built-in indices
    pub fn new() -> Self {
        IndexRegistry {
            indices: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// A registry preloaded with the built-in CVI and ICVI definitions
    pub fn with_builtins() -> Self {
        let mut registry = IndexRegistry::new();
        for index in builtin_indices() {
            registry.register(index);
        }
        registry
    }

    pub fn register(&mut self, index: IndexDefinition) {
        match self.positions.get(&index.id) {
            Some(&position) => {
                warn!(index = %index.id, "replacing registered index definition");
                self.indices[position] = index;
            }
            None => {
                debug!(
                    index = %index.id,
                    parameters = index.required_parameters.len(),
                    "registered index"
                );
                self.positions.insert(index.id.clone(), self.indices.len());
                self.indices.push(index);
            }
        }
    }

    pub fn all_indices(&self) -> &[IndexDefinition] {
        &self.indices
    }

    pub fn index(&self, id: &str) -> Option<&IndexDefinition> {
        self.positions.get(id).map(|&position| &self.indices[position])
    }

    pub fn has_index(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Parameters of one index; empty when the id is unknown
    pub fn parameters_for_index(&self, id: &str) -> &[Parameter] {
        self.index(id)
            .map(|index| index.required_parameters.as_slice())
            .unwrap_or(&[])
    }

    /// First parameter with this standard name, scanning indices in registration order
    pub fn parameter_by_standard_name(&self, standard_name: &str) -> Option<&Parameter> {
        self.all_parameters()
            .find(|parameter| parameter.standard_name == standard_name)
    }

    /// Every parameter of every index, in registration order
    pub fn all_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.indices
            .iter()
            .flat_map(|index| index.required_parameters.iter())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        IndexRegistry::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{cvi_index, icvi_index, CVI_ID, ICVI_ID};

    #[test]
    fn test_builtins_are_registered_in_order() {
        let registry = IndexRegistry::with_builtins();
        let ids: Vec<&str> = registry.all_indices().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![CVI_ID, ICVI_ID]);
        assert!(registry.has_index(CVI_ID));
        assert!(!registry.has_index("nope"));
    }

    #[test]
    fn test_unknown_index_yields_empty_results() {
        let registry = IndexRegistry::with_builtins();
        assert!(registry.index("nope").is_none());
        assert!(registry.parameters_for_index("nope").is_empty());
    }

    #[test]
    fn test_register_overwrites_in_place() {
        let mut registry = IndexRegistry::with_builtins();
        let mut replacement = cvi_index();
        replacement.name = "Replaced".to_string();
        registry.register(replacement);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all_indices()[0].name, "Replaced");
        assert_eq!(registry.index(CVI_ID).unwrap().name, "Replaced");
    }

    #[test]
    fn test_register_appends_new_ids() {
        let mut registry = IndexRegistry::new();
        assert!(registry.is_empty());
        registry.register(icvi_index());
        let mut custom = cvi_index();
        custom.id = "custom".to_string();
        registry.register(custom);

        let ids: Vec<&str> = registry.all_indices().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![ICVI_ID, "custom"]);
    }

    #[test]
    fn test_standard_name_lookup_is_first_wins() {
        let registry = IndexRegistry::with_builtins();
        // Both CVI and ICVI define a coastal_slope parameter
        let parameter = registry.parameter_by_standard_name("coastal_slope").unwrap();
        assert_eq!(parameter.index_id, CVI_ID);
        let parameter = registry.parameter_by_standard_name("land_use").unwrap();
        assert_eq!(parameter.index_id, ICVI_ID);
        assert!(registry.parameter_by_standard_name("unknown").is_none());
    }

    #[test]
    fn test_all_parameters_spans_indices() {
        let registry = IndexRegistry::with_builtins();
        assert_eq!(registry.all_parameters().count(), 18);
        assert_eq!(
            registry.all_parameters().next().unwrap().id,
            "cvi_coastal_geomorphology"
        );
    }
}
