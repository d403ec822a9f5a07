//! CVI CLI - coastal vulnerability index scoring

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Diagnostics go to stderr, results to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use cvi_core::config::{self, ResolvedConfig};
use cvi_core::store::{save_session, JsonFileStore};
use cvi_core::{
    group_values, render_json, render_text, score_for, validate, IndexDefinition, IndexRegistry,
    RawValue, ScoringEngine, SegmentInput, SegmentParameterValue,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CVI_LOG";
const DEFAULT_STORE_DIR: &str = ".cvi";

#[derive(Parser)]
#[command(name = "cvi")]
#[command(about = "Coastal vulnerability index scoring (CVI, ICVI)")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Log debug events to stderr (overrides CVI_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered indices
    Indices {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Show an index definition: parameters, ranking tables, formulas and bands
    Show {
        /// Index id
        index: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Check a parameter selection against an index's rules
    Validate {
        /// Index id
        index: String,

        /// Selected parameter ids (default: every parameter of the index)
        #[arg(long, value_delimiter = ',')]
        parameters: Option<Vec<String>>,

        /// JSON file mapping parameter id to weight
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// Score one raw value for one parameter
    Rank {
        /// Index id
        index: String,

        /// Parameter id
        parameter: String,

        /// Raw value (number or category)
        value: String,
    },
    /// Score shoreline segments from a JSON file
    Score {
        /// Segments file: an array of segments or of flat parameter rows
        input: PathBuf,

        /// Index id (overrides config file)
        #[arg(long)]
        index: Option<String>,

        /// Formula id (overrides config file)
        #[arg(long)]
        formula: Option<String>,

        /// Exponent for nonlinear-power (overrides config file)
        #[arg(long)]
        power: Option<f64>,

        /// Decimal places for reported scores (overrides config file)
        #[arg(long)]
        round_to: Option<u32>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the index selection to the session store
        #[arg(long)]
        save: bool,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scoring anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Accepted shapes of a segments file
#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentsFile {
    Segments(Vec<SegmentInput>),
    Rows(Vec<SegmentParameterValue>),
}

impl SegmentsFile {
    fn into_segments(self) -> Vec<SegmentInput> {
        match self {
            SegmentsFile::Segments(segments) => segments,
            SegmentsFile::Rows(rows) => group_values(rows),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let registry = IndexRegistry::with_builtins();

    match cli.command {
        Commands::Indices { format } => match format {
            OutputFormat::Text => print!("{}", render_index_list(&registry)),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(registry.all_indices())?)
            }
        },
        Commands::Show { index, format } => {
            let definition = find_index(&registry, &index)?;
            match format {
                OutputFormat::Text => print!("{}", render_index_detail(definition)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(definition)?),
            }
        }
        Commands::Validate {
            index,
            parameters,
            weights,
        } => {
            let selected: Vec<String> = match parameters {
                Some(ids) => ids,
                None => registry
                    .parameters_for_index(&index)
                    .iter()
                    .map(|p| p.id.clone())
                    .collect(),
            };
            let weights = weights.as_deref().map(load_weights).transpose()?;
            let ids: Vec<&str> = selected.iter().map(String::as_str).collect();
            let report = validate(&registry, &index, &ids, weights.as_ref());

            if report.valid {
                println!("Parameter selection valid for {}", index);
            } else {
                eprintln!("Parameter selection invalid for {}:", index);
                for error in &report.errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(1);
            }
        }
        Commands::Rank {
            index,
            parameter,
            value,
        } => {
            let definition = find_index(&registry, &index)?;
            let param = definition
                .parameter(&parameter)
                .with_context(|| format!("parameter {} not found in {}", parameter, index))?;
            let score = score_for(param, &RawValue::Text(value.clone()))?;
            let label = param
                .ranking_table
                .iter()
                .find(|entry| entry.score == score)
                .map(|entry| entry.label.as_str())
                .unwrap_or("-");
            println!("{} = {} -> {} ({})", parameter, value, score, label);
        }
        Commands::Score {
            input,
            index,
            formula,
            power,
            round_to,
            format,
            config: config_path,
            save,
        } => {
            let project_root = std::env::current_dir()?;
            let mut resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;
            apply_overrides(&mut resolved, index, formula, power, round_to);
            debug!(config = ?resolved.config_path, index = %resolved.index_id, "resolved configuration");

            let segments = load_segments(&input)?;
            let engine = ScoringEngine::new(&registry);
            let report = engine
                .run(
                    &resolved.index_id,
                    resolved.formula_id.as_deref(),
                    &segments,
                    &resolved.run_options(),
                )
                .with_context(|| format!("failed to score {}", input.display()))?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }

            if save {
                let dir = resolved
                    .store_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
                let definition = find_index(&registry, &report.index_id)?;
                let mut store = JsonFileStore::new(&dir);
                save_session(&mut store, definition, Some(&report.formula_id))
                    .with_context(|| format!("failed to save session to {}", dir.display()))?;
                eprintln!("Session saved to {}", dir.display());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print!("{}", render_config(&resolved));
            }
        },
    }

    Ok(())
}

/// Install the stderr subscriber. `--verbose` wins over `CVI_LOG`, which wins over `warn`.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        match std::env::var(LOG_ENV) {
            Ok(value) => EnvFilter::try_new(&value)
                .with_context(|| format!("invalid {} filter: {}", LOG_ENV, value))?,
            Err(_) => EnvFilter::new("warn"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}

fn find_index<'r>(registry: &'r IndexRegistry, id: &str) -> anyhow::Result<&'r IndexDefinition> {
    match registry.index(id) {
        Some(index) => Ok(index),
        None => {
            let known: Vec<&str> = registry.all_indices().iter().map(|i| i.id.as_str()).collect();
            anyhow::bail!("unknown index: {} (known: {})", id, known.join(", "))
        }
    }
}

fn apply_overrides(
    resolved: &mut ResolvedConfig,
    index: Option<String>,
    formula: Option<String>,
    power: Option<f64>,
    round_to: Option<u32>,
) {
    if let Some(index) = index {
        // A different index makes the configured formula meaningless
        if index != resolved.index_id {
            resolved.formula_id = None;
        }
        resolved.index_id = index;
    }
    if formula.is_some() {
        resolved.formula_id = formula;
    }
    if let Some(power) = power {
        resolved.formula_config.power = power;
    }
    if round_to.is_some() {
        resolved.round_to = round_to;
    }
}

fn load_segments(path: &Path) -> anyhow::Result<Vec<SegmentInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read segments file: {}", path.display()))?;
    let file: SegmentsFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse segments file: {}", path.display()))?;
    Ok(file.into_segments())
}

fn load_weights(path: &Path) -> anyhow::Result<BTreeMap<String, f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read weights file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse weights file: {}", path.display()))
}

fn render_index_list(registry: &IndexRegistry) -> String {
    let mut output = format!(
        "{:<22} {:<6} {:<16} {:<7} {}\n",
        "ID", "NAME", "KIND", "PARAMS", "DEFAULT FORMULA"
    );
    for index in registry.all_indices() {
        output.push_str(&format!(
            "{:<22} {:<6} {:<16} {:<7} {}\n",
            index.id,
            index.short_name,
            index.kind.as_str(),
            index.required_parameters.len(),
            index.default_formula_id
        ));
    }
    output
}

fn render_index_detail(index: &IndexDefinition) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} [{}]\n", index.name, index.id));
    output.push_str(&format!("{}\n", index.description));
    output.push_str(&format!("Citation: {}\n", index.citation));

    let names: Vec<&str> = index
        .required_parameters
        .iter()
        .map(|p| p.standard_name.as_str())
        .collect();
    let counts = cvi_core::parameter::category_counts(names);
    let summary: Vec<String> = counts
        .iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect();
    output.push_str(&format!(
        "\nParameters ({}: {})\n",
        index.required_parameters.len(),
        summary.join(", ")
    ));
    for parameter in &index.required_parameters {
        output.push_str(&format!(
            "  {} - {} [{}{}] weight {:.4}\n",
            parameter.id,
            parameter.display_name,
            parameter.kind.as_str(),
            parameter
                .unit
                .as_deref()
                .map(|u| format!(", {}", u))
                .unwrap_or_default(),
            parameter.weight
        ));
        for entry in &parameter.ranking_table {
            output.push_str(&format!(
                "      {:<4} {:<10} {}\n",
                entry.score, entry.label, entry.criteria
            ));
        }
    }

    if !index.sub_indices.is_empty() {
        output.push_str("\nSub-indices\n");
        for sub_index in &index.sub_indices {
            output.push_str(&format!(
                "  {} - {} ({} parameters)\n",
                sub_index.id,
                sub_index.name,
                sub_index.parameter_ids.len()
            ));
        }
    }

    output.push_str("\nFormulas\n");
    for formula in &index.available_formulas {
        let marker = if formula.id == index.default_formula_id {
            " (default)"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {} - {} [{}]{}\n",
            formula.id,
            formula.name,
            formula.kind.as_str(),
            marker
        ));
    }

    output.push_str("\nClasses\n");
    let classification = &index.result_classification;
    let band_sets = [
        ("absolute", Some(&classification.absolute)),
        ("geometric", classification.geometric.as_ref()),
        ("normalized", classification.normalized.as_ref()),
    ];
    for (scale, bands) in band_sets {
        if let Some(bands) = bands {
            let rendered: Vec<String> = bands
                .iter()
                .map(|b| format!("{} {}-{}", b.label, b.min, b.max))
                .collect();
            output.push_str(&format!("  {}: {}\n", scale, rendered.join(" | ")));
        }
    }

    for note in &index.notes {
        output.push_str(&format!("* {}\n", note));
    }
    output
}

fn render_config(resolved: &ResolvedConfig) -> String {
    let mut output = String::from("Configuration:\n");
    match &resolved.config_path {
        Some(p) => output.push_str(&format!("  Source: {}\n", p.display())),
        None => output.push_str("  Source: defaults (no config file found)\n"),
    }
    output.push_str(&format!("\nIndex: {}\n", resolved.index_id));
    output.push_str(&format!(
        "Formula: {}\n",
        resolved.formula_id.as_deref().unwrap_or("index default")
    ));
    output.push_str(&format!("Power: {}\n", resolved.formula_config.power));
    output.push_str(&format!(
        "Normalize values: {}\n",
        resolved.formula_config.normalize_values
    ));
    output.push_str(&format!(
        "Round to: {}\n",
        resolved
            .round_to
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    output.push_str(&format!(
        "Store dir: {}\n",
        resolved
            .store_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| DEFAULT_STORE_DIR.to_string())
    ));
    output.push_str("\nWeights:\n");
    match &resolved.weights {
        Some(weights) if !weights.is_empty() => {
            for (id, weight) in weights {
                output.push_str(&format!("  {}: {}\n", id, weight));
            }
        }
        _ => output.push_str("  index defaults\n"),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_file_accepts_both_shapes() {
        let segments: SegmentsFile =
            serde_json::from_str(r#"[{"id": "s1", "scores": {"a": 1}}]"#).unwrap();
        assert_eq!(segments.into_segments()[0].id, "s1");

        let rows: SegmentsFile = serde_json::from_str(
            r#"[{"segment_id": "s1", "parameter_id": "a", "raw_value": 2.5},
                {"segment_id": "s1", "parameter_id": "b", "raw_value": "rural"}]"#,
        )
        .unwrap();
        let segments = rows.into_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].values.len(), 2);
    }

    #[test]
    fn test_index_override_clears_configured_formula() {
        let mut resolved = ResolvedConfig::defaults().unwrap();
        resolved.formula_id = Some("cvi-arithmetic".to_string());
        apply_overrides(
            &mut resolved,
            Some("icvi-alcantara-2024".to_string()),
            None,
            None,
            Some(2),
        );
        assert_eq!(resolved.index_id, "icvi-alcantara-2024");
        assert_eq!(resolved.formula_id, None);
        assert_eq!(resolved.round_to, Some(2));
    }

    #[test]
    fn test_index_list_has_one_row_per_index() {
        let registry = IndexRegistry::with_builtins();
        let text = render_index_list(&registry);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("cvi-thieler-1999"));
        assert!(text.contains("composite-index"));
    }

    #[test]
    fn test_index_detail_lists_sub_indices_and_bands() {
        let registry = IndexRegistry::with_builtins();
        let icvi = registry.index("icvi-alcantara-2024").unwrap();
        let text = render_index_detail(icvi);
        assert!(text.contains("Sub-indices"));
        assert!(text.contains("geometric: Very Low 0.1-0.26"));
        assert!(text.contains("icvi-arithmetic - Arithmetic Mean [arithmetic-mean] (default)"));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
