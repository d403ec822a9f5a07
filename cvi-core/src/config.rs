//! Configuration file support
//!
//! Loads scoring defaults from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.cvirc.json` in the project directory
//! 3. `cvi.config.json` in the project directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::aggregation::{FormulaConfig, DEFAULT_POWER, POWER_RANGE};
use crate::builtin::CVI_ID;
use crate::engine::{RunOptions, MAX_ROUND_TO};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const MAX_WEIGHT: f64 = 10.0;

/// Configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CviConfig {
    /// Index id to score against (default: cvi-thieler-1999)
    #[serde(default)]
    pub index: Option<String>,

    /// Formula id (default: the index's default formula)
    #[serde(default)]
    pub formula: Option<String>,

    /// Exponent for nonlinear-power formulas (default: 2.0)
    #[serde(default)]
    pub power: Option<f64>,

    /// Normalize values for geometric-mean-normalized (default: true)
    #[serde(default)]
    pub normalize_values: Option<bool>,

    /// Per-parameter weight overrides, keyed by parameter id
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,

    /// Decimal places for reported scores
    #[serde(default)]
    pub round_to: Option<u32>,

    /// Directory for the JSON session store
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

/// Configuration with defaults filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub index_id: String,
    pub formula_id: Option<String>,
    pub formula_config: FormulaConfig,
    pub weights: Option<BTreeMap<String, f64>>,
    pub round_to: Option<u32>,
    pub store_dir: Option<PathBuf>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl CviConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = &self.index {
            if index.trim().is_empty() {
                anyhow::bail!("index must not be empty");
            }
        }
        if let Some(formula) = &self.formula {
            if formula.trim().is_empty() {
                anyhow::bail!("formula must not be empty");
            }
        }

        if let Some(power) = self.power {
            let (min, max) = POWER_RANGE;
            if !(min..=max).contains(&power) {
                anyhow::bail!("power must be between {} and {} (got {})", min, max, power);
            }
        }

        if let Some(weights) = &self.weights {
            for (id, weight) in weights {
                if !weight.is_finite() || *weight < 0.0 {
                    anyhow::bail!("weights.{} must be non-negative (got {})", id, weight);
                }
                if *weight > MAX_WEIGHT {
                    anyhow::bail!(
                        "weights.{} must be at most {} (got {})",
                        id,
                        MAX_WEIGHT,
                        weight
                    );
                }
            }
            if !weights.is_empty() && weights.values().all(|w| *w == 0.0) {
                anyhow::bail!("weights must not all be zero");
            }
        }

        if let Some(places) = self.round_to {
            if places > MAX_ROUND_TO {
                anyhow::bail!("round_to must be at most {} (got {})", MAX_ROUND_TO, places);
            }
        }

        Ok(())
    }

    /// Resolve config into the form the engine consumes
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        Ok(ResolvedConfig {
            index_id: self.index.clone().unwrap_or_else(|| CVI_ID.to_string()),
            formula_id: self.formula.clone(),
            formula_config: FormulaConfig {
                power: self.power.unwrap_or(DEFAULT_POWER),
                normalize_values: self.normalize_values.unwrap_or(true),
            },
            weights: self.weights.clone(),
            round_to: self.round_to,
            store_dir: self.store_dir.clone(),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        CviConfig::default().resolve()
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            formula_config: self.formula_config,
            weights: self.weights.clone(),
            round_to: self.round_to,
        }
    }
}

/// Discover and load a config file from the project directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(CviConfig, PathBuf)>> {
    for name in [".cvirc.json", "cvi.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<CviConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: CviConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project directory.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = match config_path {
        Some(path) => (load_config_file(path)?, Some(path.to_path_buf())),
        None => match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (CviConfig::default(), None),
        },
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
