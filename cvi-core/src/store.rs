//! Persistence collaborator: JSON blobs under string keys
//!
//! The core only needs `get`/`put`. Two stores ship here: an in-memory map and
//! a directory holding one `<key>.json` file per key.

use crate::error::{CviError, Result};
use crate::index::{FormulaDescriptor, IndexDefinition, IndexKind, ResultClassification};
use crate::parameter::{Parameter, ParameterCategory, ParameterKind};
use crate::ranking::RankingEntry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_INDEX_KEY: &str = "current-index";
pub const CURRENT_PARAMETERS_KEY: &str = "current-parameters";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&mut self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// One pretty-printed JSON file per key inside `dir`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CviError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(&value)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// The index chosen for the current session, with its selected formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSelection {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub citation: String,
    pub kind: IndexKind,
    pub formula_id: String,
    pub parameter_count: usize,
    pub available_formulas: Vec<FormulaDescriptor>,
    pub result_classification: ResultClassification,
}

impl IndexSelection {
    /// `formula_id` of `None` selects the index default
    pub fn new(index: &IndexDefinition, formula_id: Option<&str>) -> Self {
        IndexSelection {
            id: index.id.clone(),
            name: index.name.clone(),
            short_name: index.short_name.clone(),
            description: index.description.clone(),
            citation: index.citation.clone(),
            kind: index.kind,
            formula_id: formula_id
                .unwrap_or(&index.default_formula_id)
                .to_string(),
            parameter_count: index.required_parameters.len(),
            available_formulas: index.available_formulas.clone(),
            result_classification: index.result_classification.clone(),
        }
    }
}

/// A selected parameter as persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredParameter {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ParameterKind,
    pub weight: f64,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub ranking_table: Vec<RankingEntry>,
    pub category: ParameterCategory,
    pub standard_name: String,
    pub index_id: String,
}

fn enabled_default() -> bool {
    true
}

impl StoredParameter {
    pub fn from_parameter(parameter: &Parameter) -> Self {
        StoredParameter {
            id: parameter.id.clone(),
            name: parameter.display_name.clone(),
            description: parameter.description.clone(),
            kind: parameter.kind,
            weight: parameter.weight,
            enabled: true,
            unit: parameter.unit.clone(),
            ranking_table: parameter.ranking_table.clone(),
            category: parameter.category(),
            standard_name: parameter.standard_name.clone(),
            index_id: parameter.index_id.clone(),
        }
    }
}

fn put_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    store.put(key, serde_json::to_value(value)?)
}

fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Persist the index selection and its parameters under the session keys
pub fn save_session<S>(
    store: &mut S,
    index: &IndexDefinition,
    formula_id: Option<&str>,
) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    let selection = IndexSelection::new(index, formula_id);
    let parameters: Vec<StoredParameter> = index
        .required_parameters
        .iter()
        .map(StoredParameter::from_parameter)
        .collect();
    put_json(store, CURRENT_INDEX_KEY, &selection)?;
    put_json(store, CURRENT_PARAMETERS_KEY, &parameters)
}

pub fn load_selection<S>(store: &S) -> Result<Option<IndexSelection>>
where
    S: KeyValueStore + ?Sized,
{
    get_json(store, CURRENT_INDEX_KEY)
}

pub fn load_parameters<S>(store: &S) -> Result<Vec<StoredParameter>>
where
    S: KeyValueStore + ?Sized,
{
    Ok(get_json(store, CURRENT_PARAMETERS_KEY)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{cvi_index, icvi_index};
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        store.put("k", serde_json::json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_file_store_writes_one_file_per_key() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path().join("session"));
        store.put(CURRENT_INDEX_KEY, serde_json::json!("x")).unwrap();
        assert!(temp.path().join("session/current-index.json").exists());
        assert_eq!(
            store.get(CURRENT_INDEX_KEY).unwrap(),
            Some(serde_json::json!("x"))
        );
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path());
        assert!(matches!(
            store.put("../escape", serde_json::json!(1)),
            Err(CviError::InvalidKey(_))
        ));
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_file_store_reports_corrupt_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("current-index.json"), "{not json").unwrap();
        let store = JsonFileStore::new(temp.path());
        assert!(matches!(
            store.get(CURRENT_INDEX_KEY),
            Err(CviError::Json(_))
        ));
    }

    #[test]
    fn test_file_store_keeps_io_source() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("current-index.json")).unwrap();
        let store = JsonFileStore::new(temp.path());
        let err = store.get(CURRENT_INDEX_KEY).unwrap_err();
        assert!(matches!(err, CviError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_session_round_trip() {
        let mut store = MemoryStore::new();
        let icvi = icvi_index();
        save_session(&mut store, &icvi, Some("icvi-geometric")).unwrap();

        let selection = load_selection(&store).unwrap().unwrap();
        assert_eq!(selection.id, icvi.id);
        assert_eq!(selection.formula_id, "icvi-geometric");
        assert_eq!(selection.parameter_count, 12);

        let parameters = load_parameters(&store).unwrap();
        assert_eq!(parameters.len(), 12);
        assert!(parameters.iter().all(|p| p.enabled));
        assert_eq!(parameters[0].name, "Geomorphological Features");
    }

    #[test]
    fn test_selection_defaults_to_index_formula() {
        let selection = IndexSelection::new(&cvi_index(), None);
        assert_eq!(selection.formula_id, "cvi-geometric");
    }

    #[test]
    fn test_stored_parameter_fills_defaults() {
        let cvi = cvi_index();
        let stored = StoredParameter::from_parameter(&cvi.required_parameters[0]);
        assert_eq!(stored.category, ParameterCategory::Physical);
        assert_eq!(stored.unit, None);
        let stored = StoredParameter::from_parameter(&cvi.required_parameters[2]);
        assert_eq!(stored.category, ParameterCategory::Hydroclimate);
        assert_eq!(stored.unit.as_deref(), Some("mm/yr"));
    }

    #[test]
    fn test_stored_parameter_enabled_defaults_to_true() {
        let cvi = cvi_index();
        let mut value =
            serde_json::to_value(StoredParameter::from_parameter(&cvi.required_parameters[1]))
                .unwrap();
        value.as_object_mut().unwrap().remove("enabled");
        let stored: StoredParameter = serde_json::from_value(value).unwrap();
        assert!(stored.enabled);
    }

    #[test]
    fn test_empty_store_has_no_session() {
        let store = MemoryStore::new();
        assert_eq!(load_selection(&store).unwrap(), None);
        assert!(load_parameters(&store).unwrap().is_empty());
    }
}
